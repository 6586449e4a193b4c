use color_print::*;

#[derive(Copy, Clone, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Level {
	Write,
	Ok,
	Warn,
	Error,
	Verbose,
}

/// Leveled message sink used by the minify task.
pub trait Log {
	fn log(&mut self, level: Level, message: &str);

	fn writeln(&mut self, message: &str) {
		self.log(Level::Write, message);
	}

	fn ok(&mut self, message: &str) {
		self.log(Level::Ok, message);
	}

	fn warn(&mut self, message: &str) {
		self.log(Level::Warn, message);
	}

	fn error(&mut self, message: &str) {
		self.log(Level::Error, message);
	}

	fn verbose(&mut self, message: &str) {
		self.log(Level::Verbose, message);
	}
}

/// Terminal output. Warnings and errors go to stderr.
pub struct Console {
	verbose: bool,
}

impl Console {
	pub fn new(verbose: bool) -> Self {
		Self { verbose }
	}
}

impl Log for Console {
	fn log(&mut self, level: Level, message: &str) {
		match level {
			Level::Write => println!("{}", message),
			Level::Ok => cprintln!("<g>>></> {}", message),
			Level::Warn => ceprintln!("<y>>></> {}", message),
			Level::Error => ceprintln!("<r!>>></> {}", message),
			Level::Verbose => {
				if self.verbose {
					cprintln!("<k!>{}: {}</>", level, message);
				}
			}
		}
	}
}

/// Picks the singular or plural half of a `"singular/plural"` pair.
pub fn pluralize(count: usize, forms: &str) -> &str {
	let (singular, plural) = forms.split_once('/').unwrap_or((forms, forms));

	if count == 1 {
		singular
	} else {
		plural
	}
}

#[cfg(test)]
pub struct Recorder {
	pub entries: Vec<(Level, String)>,
}

#[cfg(test)]
impl Recorder {
	pub fn new() -> Self {
		Self { entries: Vec::new() }
	}

	pub fn at(&self, level: Level) -> Vec<&str> {
		self.entries
			.iter()
			.filter(|(l, _)| *l == level)
			.map(|(_, m)| m.as_str())
			.collect()
	}
}

#[cfg(test)]
impl Log for Recorder {
	fn log(&mut self, level: Level, message: &str) {
		self.entries.push((level, message.to_string()));
	}
}
