use crate::types::*;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

pub const DEFAULT_FILE: &str = "minjs.toml";

/// Subcommand names; a target with one of these names could never be selected.
const RESERVED: &[&str] = &["list", "run"];

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
	#[serde(default)]
	options: toml::Table,

	#[serde(default)]
	targets: IndexMap<String, TargetConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetConfig {
	#[serde(default)]
	options: toml::Table,

	#[serde(default)]
	files: Vec<FileGroup>,

	#[serde(default, deserialize_with = "one_or_many")]
	src: Vec<PathBuf>,

	dest: Option<PathBuf>,
}

/// A target resolved against its config: merged options and file groups
/// with paths relative to the config file's directory.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
	pub name: String,
	pub options: MinifyOptions,
	pub files: Vec<FileGroup>,
}

#[derive(Debug)]
pub struct Config {
	base: PathBuf,
	file: ConfigFile,
}

impl Config {
	pub async fn load(path: &Path) -> Result<Self> {
		let text = tokio::fs::read_to_string(path)
			.await
			.with_context(|| format!("Unable to read config \"{}\"", path.display()))?;

		let base = path.parent().unwrap_or(Path::new(""));

		Self::parse(&text, base).with_context(|| format!("Invalid config \"{}\"", path.display()))
	}

	pub fn parse(text: &str, base: &Path) -> Result<Self> {
		let file: ConfigFile = toml::from_str(text)?;

		if let Some(name) = file.targets.keys().find(|name| RESERVED.contains(&name.as_str())) {
			bail!("Target name \"{}\" is reserved. Rename the target.", name);
		}

		Ok(Self {
			base: base.to_path_buf(),
			file,
		})
	}

	pub fn target_names(&self) -> impl Iterator<Item = &str> {
		self.file.targets.keys().map(String::as_str)
	}

	/// Resolve the named targets, or every target when `names` is empty.
	pub fn targets(&self, names: &[String]) -> Result<Vec<Target>> {
		if self.file.targets.is_empty() {
			bail!("No targets configured.");
		}

		if names.is_empty() {
			return self.file.targets.keys().map(|name| self.target(name)).collect();
		}

		names.iter().map(|name| self.target(name)).collect()
	}

	fn target(&self, name: &str) -> Result<Target> {
		let target = self.file.targets.get(name).ok_or_else(|| {
			anyhow!(
				"Target \"{}\" not found. Available targets: {}",
				name,
				self.target_names().collect::<Vec<_>>().join(", "),
			)
		})?;

		// target options win over task options, key by key
		let mut merged = self.file.options.clone();
		merged.extend(target.options.clone());

		let mut options: MinifyOptions = toml::Value::Table(merged)
			.try_into()
			.with_context(|| format!("Invalid options for target \"{}\"", name))?;

		if let Some(map) = options.source_map.as_mut() {
			map.filename = map.filename.take().map(|f| self.base.join(f));
		}

		let mut files = Vec::with_capacity(target.files.len() + 1);

		match &target.dest {
			Some(dest) => files.push(FileGroup::new(target.src.iter().cloned(), dest.clone())),
			None if !target.src.is_empty() => bail!("Target \"{}\" has `src` but no `dest`", name),
			None => {}
		}

		files.extend(target.files.iter().cloned());

		if files.is_empty() {
			bail!("Target \"{}\" has no files configured", name);
		}

		Ok(Target {
			name: name.to_string(),
			options,
			files: files.into_iter().map(|group| group.relative_to(&self.base)).collect(),
		})
	}
}
