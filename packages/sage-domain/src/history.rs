use crate::turn::Turn;

/// Truncates a turn log to the most recent `max` turns, preserving order.
/// A sliding window: older turns fall off, nothing is rejected.
pub fn window(mut turns: Vec<Turn>, max: u32) -> Vec<Turn> {
	let max = max as usize;

	if turns.len() > max {
		turns.drain(..turns.len() - max);
	}

	turns
}

/// Most recent user turn, used as disambiguating context for short queries.
pub fn last_user_text(turns: &[Turn]) -> Option<&str> {
	turns
		.iter()
		.rev()
		.find(|turn| turn.role == crate::turn::Role::User)
		.map(|turn| turn.text.as_str())
}
