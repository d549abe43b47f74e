use std::time::Duration;

use color_eyre::Result;
use regex::Regex;
use reqwest::Client;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; sage/0.1)";

/// Chrome and boilerplate containers stripped wholesale before tag removal.
const DROPPED_BLOCKS: [&str; 6] = ["script", "style", "header", "footer", "nav", "aside"];

pub async fn extract(cfg: &sage_config::FetchConfig, url: &str) -> Result<String> {
	let client = Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.user_agent(cfg.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
		.build()?;
	let res = client.get(url).send().await?;
	let html = res.error_for_status()?.text().await?;

	strip_html(&html)
}

fn strip_html(html: &str) -> Result<String> {
	let mut text = html.to_string();

	for block in DROPPED_BLOCKS {
		let pattern = Regex::new(&format!(r"(?is)<{block}\b[^>]*>.*?</{block}>"))?;

		text = pattern.replace_all(&text, " ").into_owned();
	}

	let tags = Regex::new(r"(?s)<[^>]+>")?;

	text = tags.replace_all(&text, "\n").into_owned();
	text = decode_entities(&text);

	let blank_lines = Regex::new(r"\n\s*\n")?;
	let collapsed = blank_lines.replace_all(&text, "\n");
	let lines: Vec<&str> =
		collapsed.lines().map(str::trim).filter(|line| !line.is_empty()).collect();

	Ok(lines.join("\n"))
}

fn decode_entities(text: &str) -> String {
	text.replace("&nbsp;", " ")
		.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&quot;", "\"")
		.replace("&#39;", "'")
		.replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn drops_script_and_style_blocks() {
		let html = "<html><head><style>body { color: red; }</style>\
			<script>alert(1);</script></head>\
			<body><p>Visible text.</p></body></html>";
		let text = strip_html(html).expect("strip failed");
		assert_eq!(text, "Visible text.");
	}

	#[test]
	fn drops_navigation_chrome() {
		let html = "<nav><a href=\"/\">Home</a></nav><main>Article body.</main>\
			<footer>Copyright.</footer>";
		let text = strip_html(html).expect("strip failed");
		assert_eq!(text, "Article body.");
	}

	#[test]
	fn decodes_common_entities_and_collapses_blank_lines() {
		let html = "<p>Fish &amp; chips</p>\n\n\n<p>&quot;quoted&quot;</p>";
		let text = strip_html(html).expect("strip failed");
		assert_eq!(text, "Fish & chips\n\"quoted\"");
	}
}
