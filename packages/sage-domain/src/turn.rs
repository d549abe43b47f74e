use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	User,
	Assistant,
}

/// One message in a conversation. Immutable once appended to history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
	pub role: Role,
	pub text: String,
}

impl Turn {
	pub fn user(text: impl Into<String>) -> Self {
		Self { role: Role::User, text: text.into() }
	}

	pub fn assistant(text: impl Into<String>) -> Self {
		Self { role: Role::Assistant, text: text.into() }
	}
}
