use crate::mode::Mode;

pub const COMMAND_PREFIX: char = '/';

/// The closed set of user-facing commands. Matching is exhaustive; an
/// unrecognized name is surfaced as [`Parsed::Unknown`], never ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
	Reset,
	SetMode(Mode),
	Search { query: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Parsed {
	Command(Command),
	Unknown { name: String },
}

pub fn is_command(text: &str) -> bool {
	text.starts_with(COMMAND_PREFIX)
}

/// Splits `(command, args)` on the first whitespace and matches the name
/// case-insensitively. Returns `None` when the text is not prefixed.
pub fn parse(text: &str) -> Option<Parsed> {
	let text = text.strip_prefix(COMMAND_PREFIX)?;
	let (name, args) = match text.split_once(char::is_whitespace) {
		Some((name, args)) => (name, args.trim()),
		None => (text, ""),
	};

	let parsed = match name.to_ascii_lowercase().as_str() {
		"reset" => Parsed::Command(Command::Reset),
		"fast" => Parsed::Command(Command::SetMode(Mode::Fast)),
		"premium" => Parsed::Command(Command::SetMode(Mode::Premium)),
		"search" => Parsed::Command(Command::Search { query: args.to_string() }),
		_ => Parsed::Unknown { name: name.to_string() },
	};

	Some(parsed)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn matches_names_case_insensitively() {
		assert_eq!(parse("/RESET"), Some(Parsed::Command(Command::Reset)));
		assert_eq!(parse("/Premium"), Some(Parsed::Command(Command::SetMode(Mode::Premium))));
	}

	#[test]
	fn splits_search_args_on_first_whitespace() {
		assert_eq!(
			parse("/search tokyo weather tomorrow"),
			Some(Parsed::Command(Command::Search { query: "tokyo weather tomorrow".to_string() })),
		);
		assert_eq!(parse("/search"), Some(Parsed::Command(Command::Search { query: String::new() })));
	}

	#[test]
	fn surfaces_unknown_names() {
		assert_eq!(parse("/frobnicate now"), Some(Parsed::Unknown { name: "frobnicate".to_string() }));
		assert_eq!(parse("plain text"), None);
	}
}
