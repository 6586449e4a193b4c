use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// Source contents of one file group, keyed by path in encounter order.
pub type SourceMap = IndexMap<PathBuf, String>;

/// One or more source files minified into a single destination.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct FileGroup {
	#[serde(default, deserialize_with = "one_or_many")]
	pub src: Vec<PathBuf>,
	pub dest: PathBuf,
}

impl FileGroup {
	pub fn new<I, P>(src: I, dest: impl Into<PathBuf>) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		Self {
			src: src.into_iter().map(Into::into).collect(),
			dest: dest.into(),
		}
	}

	pub(crate) fn relative_to(self, base: &Path) -> Self {
		Self {
			src: self.src.into_iter().map(|p| base.join(p)).collect(),
			dest: base.join(self.dest),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MinifyOptions {
	/// `None` when no source map is requested.
	#[serde(default, alias = "sourceMap", deserialize_with = "source_map_setting")]
	pub source_map: Option<SourceMapOptions>,

	/// Treat sources as ES modules, allowing top-level names to be mangled.
	#[serde(default)]
	pub module: bool,

	/// Everything else, handed to the minifier untouched.
	#[serde(flatten)]
	pub passthrough: toml::Table,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct SourceMapOptions {
	pub filename: Option<PathBuf>,
	pub url: Option<String>,
}

impl MinifyOptions {
	/// Where the map for `dest` goes: the configured filename, or `<dest>.map`.
	pub fn map_path(&self, dest: &Path) -> Option<PathBuf> {
		let options = self.source_map.as_ref()?;

		Some(match &options.filename {
			Some(filename) => filename.clone(),
			None => {
				let mut path = dest.as_os_str().to_owned();
				path.push(".map");
				PathBuf::from(path)
			}
		})
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MinifyError {
	pub message: String,
	pub filename: Option<PathBuf>,
}

impl Display for MinifyError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.filename {
			Some(filename) => write!(f, "{} in {}", self.message, filename.display()),
			None => write!(f, "{}", self.message),
		}
	}
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MinifyResult {
	pub code: String,
	pub map: Option<String>,
	pub error: Option<MinifyError>,
	pub warnings: Vec<String>,
}

impl MinifyResult {
	pub fn failed(error: MinifyError) -> Self {
		Self {
			error: Some(error),
			..Default::default()
		}
	}
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
	pub created: usize,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum RunState {
	#[default]
	Pending,
	ProcessingGroup(usize),
	Failed,
	Completed,
}

impl Display for RunState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Pending => write!(f, "pending"),
			Self::ProcessingGroup(i) => write!(f, "processing group #{}", i + 1),
			Self::Failed => write!(f, "failed"),
			Self::Completed => write!(f, "completed"),
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	One(PathBuf),
	Many(Vec<PathBuf>),
}

pub(crate) fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<PathBuf>, D::Error> {
	Ok(match OneOrMany::deserialize(deserializer)? {
		OneOrMany::One(path) => vec![path],
		OneOrMany::Many(paths) => paths,
	})
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceMapSetting {
	Enabled(bool),
	Options(SourceMapOptions),
}

fn source_map_setting<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SourceMapOptions>, D::Error> {
	Ok(match SourceMapSetting::deserialize(deserializer)? {
		SourceMapSetting::Enabled(true) => Some(SourceMapOptions::default()),
		SourceMapSetting::Enabled(false) => None,
		SourceMapSetting::Options(options) => Some(options),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn options(text: &str) -> MinifyOptions {
		toml::from_str(text).unwrap()
	}

	#[test]
	fn source_map_defaults_to_dest_with_suffix() {
		let options = options("source_map = true");
		assert_eq!(options.map_path(Path::new("dist/a.min.js")), Some(PathBuf::from("dist/a.min.js.map")));
	}

	#[test]
	fn source_map_filename_overrides_suffix() {
		let options = options("sourceMap = { filename = \"maps/out.map\" }");
		assert_eq!(options.map_path(Path::new("dist/a.min.js")), Some(PathBuf::from("maps/out.map")));
	}

	#[test]
	fn no_map_unless_requested() {
		assert_eq!(options("").map_path(Path::new("a.js")), None);
		assert_eq!(options("source_map = false").map_path(Path::new("a.js")), None);
	}

	#[test]
	fn unknown_options_pass_through() {
		let options = options("module = true\ncompress = { passes = 2 }\necma = 2020");
		assert!(options.module);
		assert_eq!(options.passthrough.len(), 2);
		assert_eq!(options.passthrough["ecma"].as_integer(), Some(2020));
	}

	#[test]
	fn src_accepts_single_path() {
		let group: FileGroup = toml::from_str("src = \"a.js\"\ndest = \"a.min.js\"").unwrap();
		assert_eq!(group, FileGroup::new(["a.js"], "a.min.js"));
	}

	#[test]
	fn minify_error_names_file() {
		let error = MinifyError {
			message: "Unexpected token".into(),
			filename: Some("x.js".into()),
		};
		assert_eq!(error.to_string(), "Unexpected token in x.js");
	}
}
