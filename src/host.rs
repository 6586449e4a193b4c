use crate::config::{self, Config, Target};
use crate::log::{pluralize, Console, Log};
use crate::minifier::{JsMinifier, Minifier};
use crate::task::{self, MinifyTask};
use std::path::PathBuf;
use anyhow::{bail, Result};
use color_print::*;

#[derive(clap::Args, Clone, Debug)]
pub struct Args {
	/// Targets to run, in order (all configured targets when omitted)
	targets: Vec<String>,

	/// Task file describing targets and options
	#[arg(short, long, default_value = config::DEFAULT_FILE)]
	config: PathBuf,

	/// Print state transitions and full error chains
	#[arg(short, long)]
	verbose: bool,

	/// Keep running the remaining targets after one fails
	#[arg(short, long)]
	force: bool,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ListArgs {
	/// Task file describing targets and options
	#[arg(short, long, default_value = config::DEFAULT_FILE)]
	config: PathBuf,
}

pub async fn run(args: Args) -> Result<()> {
	let config = Config::load(&args.config).await?;
	let targets = config.targets(&args.targets)?;
	let mut log = Console::new(args.verbose);

	run_targets(&JsMinifier, &mut log, &targets, args.force).await
}

/// Run targets in order. A failed target stops the rest unless `force` is set.
/// An IO failure always stops the rest.
pub async fn run_targets<M: Minifier, L: Log>(minifier: &M, log: &mut L, targets: &[Target], force: bool) -> Result<()> {
	let mut failed = 0;

	for target in targets {
		log.writeln(&cformat!("\n<u>Running \"minjs:{}\" task</>", target.name));

		let (done, rx) = task::completion();
		let mut task = MinifyTask::new(minifier, &mut *log, target.options.clone());
		let (result, signal) = tokio::join!(task.run(&target.files, done), rx);

		let stats = result?;
		let state = task.state();

		log.verbose(&format!("Target \"{}\" {} ({} created)", target.name, state, stats.created));

		if matches!(signal, Ok(true)) {
			continue;
		}

		failed += 1;

		if !force {
			bail!("Task \"minjs:{}\" failed. Use --force to continue.", target.name);
		}

		log.warn(&format!("Task \"minjs:{}\" failed. Used --force, continuing.", target.name));
	}

	if failed > 0 {
		bail!("{} {} failed.", failed, pluralize(failed, "target/targets"));
	}

	Ok(())
}

pub async fn list(args: ListArgs) -> Result<()> {
	let config = Config::load(&args.config).await?;

	for target in config.targets(&[])? {
		cprintln!("<s>{}</>", target.name);

		for group in &target.files {
			let src = group.src.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ");
			cprintln!("  <c>{}</> <k!>←</> {}", group.dest.display(), src);
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::log::{Level, Recorder};
	use crate::minifier::Scripted;
	use crate::types::*;
	use anyhow::anyhow;
	use std::fs;
	use tempfile::TempDir;

	fn target(name: &str, dir: &TempDir, src: &str) -> Target {
		Target {
			name: name.to_string(),
			options: MinifyOptions::default(),
			files: vec![FileGroup::new([dir.path().join(src)], dir.path().join(format!("{}.min.js", name)))],
		}
	}

	/// Fails any group built from `bad.js`.
	fn rejecting_bad() -> Scripted {
		Scripted::new(|sources| {
			if sources.keys().any(|p| p.ends_with("bad.js")) {
				Err(anyhow!("minifier crashed"))
			} else {
				Ok(MinifyResult {
					code: "var a;".into(),
					..Default::default()
				})
			}
		})
	}

	fn fixture() -> TempDir {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("good.js"), "var a = 1;").unwrap();
		fs::write(dir.path().join("bad.js"), "var b = 2;").unwrap();
		dir
	}

	#[tokio::test]
	async fn targets_run_in_order() {
		let dir = fixture();
		fs::write(dir.path().join("other.js"), "var c = 3;").unwrap();
		let minifier = rejecting_bad();
		let targets = [target("one", &dir, "good.js"), target("two", &dir, "other.js")];
		let mut log = Recorder::new();

		run_targets(&minifier, &mut log, &targets, false).await.unwrap();

		assert_eq!(minifier.calls(), [vec![dir.path().join("good.js")], vec![dir.path().join("other.js")]]);

		let headers: Vec<_> = log.at(Level::Write).into_iter().filter(|m| m.contains("Running")).collect();
		assert_eq!(headers.len(), 2);
		assert!(headers[0].contains("minjs:one"));
		assert!(headers[1].contains("minjs:two"));
		assert!(dir.path().join("two.min.js").exists());
	}

	#[tokio::test]
	async fn failed_target_stops_the_rest() {
		let dir = fixture();
		let minifier = rejecting_bad();
		let targets = [target("broken", &dir, "bad.js"), target("after", &dir, "good.js")];
		let mut log = Recorder::new();

		let err = run_targets(&minifier, &mut log, &targets, false).await.unwrap_err();

		assert_eq!(err.to_string(), "Task \"minjs:broken\" failed. Use --force to continue.");
		assert_eq!(minifier.calls().len(), 1);
		assert!(!dir.path().join("after.min.js").exists());
	}

	#[tokio::test]
	async fn force_continues_and_counts_failures() {
		let dir = fixture();
		let minifier = rejecting_bad();
		let targets = [
			target("broken", &dir, "bad.js"),
			target("after", &dir, "good.js"),
			target("again", &dir, "bad.js"),
		];
		let mut log = Recorder::new();

		let err = run_targets(&minifier, &mut log, &targets, true).await.unwrap_err();

		assert_eq!(err.to_string(), "2 targets failed.");
		assert_eq!(minifier.calls().len(), 3);
		assert!(dir.path().join("after.min.js").exists());
		assert!(log.at(Level::Warn).iter().any(|m| m.contains("Used --force, continuing.")));
	}

	#[tokio::test]
	async fn single_forced_failure_is_singular() {
		let dir = fixture();
		let targets = [target("broken", &dir, "bad.js")];

		let err = run_targets(&rejecting_bad(), &mut Recorder::new(), &targets, true).await.unwrap_err();

		assert_eq!(err.to_string(), "1 target failed.");
	}

	#[tokio::test]
	async fn io_error_stops_even_with_force() {
		let dir = fixture();
		let minifier = rejecting_bad();
		let targets = [target("missing", &dir, "nope.js"), target("after", &dir, "good.js")];
		let mut log = Recorder::new();

		let err = run_targets(&minifier, &mut log, &targets, true).await.unwrap_err();

		assert!(err.to_string().contains("nope.js"));
		assert!(minifier.calls().is_empty());
		assert!(!dir.path().join("after.min.js").exists());
	}
}
