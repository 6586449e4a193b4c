mod types;
mod config;
mod host;
mod log;
mod minifier;
mod size;
mod task;

use clap::Parser;
use color_print::*;

#[derive(clap::Parser)]
#[command(version, about, long_about = None, args_conflicts_with_subcommands = true, disable_help_subcommand = true, flatten_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Option<Command>,

	#[clap(flatten)]
	args: host::Args,
}

#[derive(clap::Subcommand, Clone)]
enum Command {
	#[command(hide = true)]
	Run(host::Args),
	/// List configured targets and their file groups
	List(host::ListArgs),
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	let command = cli.command.unwrap_or_else(|| Command::Run(cli.args));

	let result = match command {
		Command::Run(args) => host::run(args).await,
		Command::List(args) => host::list(args).await,
	};

	if let Err(err) = result {
		ceprintln!("<r!><s>Error:</></> {:#}", err);
		std::process::exit(1); // general error
	}
}
