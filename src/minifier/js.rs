use super::*;
use anyhow::anyhow;
use better_minify_js::{minify, Session, TopLevelMode};
use oxc_sourcemap::SourceMapBuilder;
use std::path::PathBuf;

/// Minifier backed by `better-minify-js`, with file-level source maps.
#[derive(Copy, Clone, Debug, Default)]
pub struct JsMinifier;

impl Minifier for JsMinifier {
	async fn minify(&self, sources: &SourceMap, options: &MinifyOptions) -> Result<MinifyResult> {
		let sources = sources.clone();
		let options = options.clone();

		// a panic inside the minifier surfaces here as a JoinError
		tokio::task::spawn_blocking(move || minify_sources(&sources, &options))
			.await
			.map_err(|err| anyhow!("Minifier stopped unexpectedly: {}", err))
	}
}

/// Sources are joined into one program before minifying, so every file shares
/// a single top-level scope and mangled names never collide across files.
fn minify_sources(sources: &SourceMap, options: &MinifyOptions) -> MinifyResult {
	let warnings = options.passthrough
		.keys()
		.map(|key| format!("Ignoring unsupported option `{}`", key))
		.collect();

	let session = Session::new();
	let program = concat(sources);
	let mut output = Vec::new();

	if let Err(err) = minify(&session, top_level_mode(options.module), program.as_bytes(), &mut output) {
		return MinifyResult::failed(MinifyError {
			message: format!("{:?}", err),
			filename: offending_source(&session, options.module, sources),
		});
	}

	let mut code = match String::from_utf8(output) {
		Ok(code) => code,
		Err(err) => {
			return MinifyResult::failed(MinifyError {
				message: format!("Minified output is not valid UTF-8: {}", err),
				filename: None,
			});
		}
	};

	let map = options.source_map.as_ref().map(|map_options| {
		let mut builder = SourceMapBuilder::default();

		if let Some(file) = map_options.filename.as_deref().and_then(|f| f.file_stem()) {
			builder.set_file(&file.to_string_lossy());
		}

		let ids: Vec<u32> = sources
			.iter()
			.map(|(path, content)| builder.add_source_and_content(&path.to_string_lossy(), content))
			.collect();

		// output positions inside the merged program are opaque; anchor its start
		if let Some(&first) = ids.first() {
			builder.add_token(0, 0, 0, 0, Some(first), None);
		}

		builder.into_sourcemap().to_json_string()
	});

	if let Some(url) = options.source_map.as_ref().and_then(|o| o.url.as_deref()) {
		code.push_str("\n//# sourceMappingURL=");
		code.push_str(url);
	}

	MinifyResult {
		code,
		map,
		error: None,
		warnings,
	}
}

fn top_level_mode(module: bool) -> TopLevelMode {
	if module {
		TopLevelMode::Module
	} else {
		TopLevelMode::Global
	}
}

/// Each file ends its own statement list, even without a trailing `;` or
/// with a trailing line comment.
fn concat(sources: &SourceMap) -> String {
	sources.values().map(String::as_str).collect::<Vec<_>>().join("\n;\n")
}

/// Find the first source that fails on its own, to name it in the error.
fn offending_source(session: &Session, module: bool, sources: &SourceMap) -> Option<PathBuf> {
	sources
		.iter()
		.find(|(_, content)| minify(session, top_level_mode(module), content.as_bytes(), &mut Vec::new()).is_err())
		.map(|(path, _)| path.clone())
}
