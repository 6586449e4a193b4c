use crate::log::{pluralize, Log};
use crate::minifier::Minifier;
use crate::size::maxmin;
use crate::types::*;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use color_print::*;
use tokio::sync::oneshot;

/// Completion signal for one task run. Dropping it without calling
/// [`Done::signal`] tells the host the run ended abnormally.
pub struct Done(oneshot::Sender<bool>);

impl Done {
	pub fn signal(self, success: bool) {
		// the host may have stopped listening; nothing left to tell it then
		let _ = self.0.send(success);
	}
}

pub fn completion() -> (Done, oneshot::Receiver<bool>) {
	let (tx, rx) = oneshot::channel();
	(Done(tx), rx)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Outcome {
	Created,
	Skipped,
	Failed,
}

/// Minifies file groups one after another, writing each group's output
/// before the next group starts.
pub struct MinifyTask<'a, M, L> {
	minifier: &'a M,
	log: &'a mut L,
	options: MinifyOptions,
	stats: RunStats,
	state: RunState,
}

impl<'a, M: Minifier, L: Log> MinifyTask<'a, M, L> {
	pub fn new(minifier: &'a M, log: &'a mut L, options: MinifyOptions) -> Self {
		Self {
			minifier,
			log,
			options,
			stats: RunStats::default(),
			state: RunState::Pending,
		}
	}

	pub fn state(&self) -> RunState {
		self.state
	}

	/// Process every group in order, stopping at the first minifier failure.
	///
	/// Minifier failures are reported through `done`. IO failures are returned
	/// as errors and `done` is dropped unsignalled.
	pub async fn run(&mut self, files: &[FileGroup], done: Done) -> Result<RunStats> {
		for (i, group) in files.iter().enumerate() {
			self.transition(RunState::ProcessingGroup(i));

			let outcome = match self.process(group).await {
				Ok(outcome) => outcome,
				Err(err) => {
					self.transition(RunState::Failed);
					return Err(err);
				}
			};

			if outcome == Outcome::Failed {
				self.transition(RunState::Failed);
				done.signal(false);
				return Ok(self.stats);
			}
		}

		let created = self.stats.created;

		if created > 0 {
			self.log.ok(&format!("{} {} created.", created, pluralize(created, "file/files")));
		}

		self.transition(RunState::Completed);
		done.signal(true);

		Ok(self.stats)
	}

	async fn process(&mut self, group: &FileGroup) -> Result<Outcome> {
		let dest = group.dest.display();

		if group.src.is_empty() {
			self.log.warn(&cformat!("Source files not found for <r>{}</>", dest));
			return Ok(Outcome::Skipped);
		}

		let sources = read_sources(&group.src).await?;

		let result = match self.minifier.minify(&sources, &self.options).await {
			Ok(result) => result,
			Err(err) => {
				self.log.error(&cformat!("Minification failed for <c>{}</>:", dest));
				self.log.error(&err.to_string());
				self.log.verbose(&format!("{:?}", err));
				return Ok(Outcome::Failed);
			}
		};

		if let Some(error) = &result.error {
			self.log.error(&cformat!("Minification failed for <c>{}</>:", dest));
			self.log.error(&error.to_string());
			return Ok(Outcome::Failed);
		}

		if !result.warnings.is_empty() {
			self.log.warn(&result.warnings.join("\n"));
		}

		write_file(&group.dest, &result.code).await?;

		let map_path = self.options.map_path(&group.dest);
		let mut map_written = None;

		if let Some(map_path) = map_path {
			match &result.map {
				Some(map) => {
					write_file(&map_path, map).await?;
					map_written = Some(map_path);
				}
				None => {
					self.log.warn(&cformat!("Minifier produced no source map for <c>{}</>", dest));
				}
			}
		}

		let before = sources.values().map(String::len).sum();
		self.log.writeln(&cformat!(">> File <c>{}</> created. {}", dest, maxmin(before, result.code.len())));

		if let Some(map_path) = map_written {
			self.log.writeln(&cformat!(">> Source map <c>{}</> created.", map_path.display()));
		}

		self.stats.created += 1;

		Ok(Outcome::Created)
	}

	fn transition(&mut self, state: RunState) {
		self.state = state;
		self.log.verbose(&format!("Run {}", state));
	}
}

async fn read_sources(paths: &[PathBuf]) -> Result<SourceMap> {
	let mut sources = SourceMap::with_capacity(paths.len());

	for path in paths {
		let content = tokio::fs::read_to_string(path)
			.await
			.with_context(|| format!("Unable to read \"{}\" file", path.display()))?;

		sources.insert(path.clone(), content);
	}

	Ok(sources)
}

async fn write_file(path: &Path, content: &str) -> Result<()> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		tokio::fs::create_dir_all(parent)
			.await
			.with_context(|| format!("Unable to create \"{}\" directory", parent.display()))?;
	}

	tokio::fs::write(path, content)
		.await
		.with_context(|| format!("Unable to write \"{}\" file", path.display()))
}
