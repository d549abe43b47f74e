/// Queries longer than this are assumed to carry their own context.
const MAX_BARE_QUERY_CHARS: usize = 16;

/// Whether a raw `/search` query is too short and context-free to stand on
/// its own. Such queries get the most recent user turn folded in before the
/// web search runs.
pub fn needs_context(query: &str) -> bool {
	let query = query.trim();

	if query.chars().count() > MAX_BARE_QUERY_CHARS {
		return false;
	}

	!query.contains(char::is_whitespace)
}

/// Best-effort cleanup of a model-refined query. Falls back to the raw query
/// when the model returned something unusable.
pub fn clamp_refined(raw: &str, refined: &str, max_chars: usize) -> String {
	let candidate = refined.lines().next().unwrap_or("").trim();

	if candidate.is_empty() {
		return raw.to_string();
	}

	truncate_chars(candidate, max_chars)
}

/// Char-boundary-safe truncation used to bound evidence and prompt sizes.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}

	text.chars().take(max_chars).collect()
}
