use serde::{Deserialize, Serialize};

/// Response tier for conversational replies. Defaults to the fast tier; the
/// premium tier is gated by a per-day quota.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
	#[default]
	Fast,
	Premium,
}

impl Mode {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Fast => "fast",
			Self::Premium => "premium",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"fast" => Some(Self::Fast),
			"premium" => Some(Self::Premium),
			_ => None,
		}
	}

	pub fn icon(&self) -> &'static str {
		match self {
			Self::Fast => "\u{26A1}",
			Self::Premium => "\u{1F916}",
		}
	}
}
