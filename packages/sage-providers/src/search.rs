use std::time::Duration;

use color_eyre::Result;
use reqwest::Client;
use serde_json::Value;

const RESULT_COUNT: u32 = 3;

#[derive(Clone, Debug)]
pub struct SearchHit {
	pub title: String,
	pub url: String,
}

pub async fn query(cfg: &sage_config::SearchConfig, text: &str) -> Result<Vec<SearchHit>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/customsearch/v1", cfg.api_base);
	let res = client
		.get(&url)
		.query(&[
			("key", cfg.api_key.as_str()),
			("cx", cfg.engine_id.as_str()),
			("q", text),
			("num", &RESULT_COUNT.to_string()),
		])
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(parse_results(json))
}

/// A response without items is an empty result set, not an error.
fn parse_results(json: Value) -> Vec<SearchHit> {
	let Some(items) = json.get("items").and_then(|v| v.as_array()) else {
		return Vec::new();
	};

	items
		.iter()
		.filter_map(|item| {
			let url = item.get("link").and_then(|v| v.as_str())?;
			let title = item.get("title").and_then(|v| v.as_str()).unwrap_or(url);

			Some(SearchHit { title: title.to_string(), url: url.to_string() })
		})
		.collect()
}
