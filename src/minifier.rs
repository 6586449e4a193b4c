mod js;

use crate::types::*;
use anyhow::Result;
#[cfg(test)]
use std::path::PathBuf;
#[cfg(test)]
use std::sync::Mutex;

pub use js::JsMinifier;

/// The minification backend the task hands each file group to.
///
/// An `Err` means the backend itself broke down. Problems with the input,
/// such as a syntax error, come back as `Ok` with `MinifyResult::error` set.
#[allow(async_fn_in_trait)]
pub trait Minifier {
	async fn minify(&self, sources: &SourceMap, options: &MinifyOptions) -> Result<MinifyResult>;
}

#[cfg(test)]
type Respond = Box<dyn Fn(&SourceMap) -> Result<MinifyResult> + Send + Sync>;

/// In-memory minifier that records which groups it was asked to minify.
#[cfg(test)]
pub struct Scripted {
	calls: Mutex<Vec<Vec<PathBuf>>>,
	respond: Respond,
}

#[cfg(test)]
impl Scripted {
	pub fn new(respond: impl Fn(&SourceMap) -> Result<MinifyResult> + Send + Sync + 'static) -> Self {
		Self {
			calls: Mutex::new(Vec::new()),
			respond: Box::new(respond),
		}
	}

	pub fn code(code: &str) -> Self {
		let code = code.to_string();

		Self::new(move |_| Ok(MinifyResult {
			code: code.clone(),
			map: Some("{\"version\":3}".into()),
			..Default::default()
		}))
	}

	pub fn calls(&self) -> Vec<Vec<PathBuf>> {
		self.calls.lock().unwrap().clone()
	}
}

#[cfg(test)]
impl Minifier for Scripted {
	async fn minify(&self, sources: &SourceMap, _options: &MinifyOptions) -> Result<MinifyResult> {
		self.calls.lock().unwrap().push(sources.keys().cloned().collect());
		(self.respond)(sources)
	}
}
