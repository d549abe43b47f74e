use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::{Client, header::AUTHORIZATION};
use serde_json::Value;

/// Platform cap on message objects per reply call.
const MAX_SEGMENTS: usize = 5;

fn client(cfg: &sage_config::Chat) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

fn bearer(cfg: &sage_config::Chat) -> String {
	format!("Bearer {}", cfg.channel_token)
}

/// Sends one reply tied to a single-use reply token. Multiple segments go
/// out as one atomic send.
pub async fn reply(cfg: &sage_config::Chat, reply_token: &str, segments: &[String]) -> Result<()> {
	if segments.is_empty() || segments.len() > MAX_SEGMENTS {
		return Err(eyre::eyre!("Reply must carry between 1 and {MAX_SEGMENTS} segments."));
	}

	let messages: Vec<Value> = segments
		.iter()
		.map(|text| serde_json::json!({ "type": "text", "text": text }))
		.collect();
	let body = serde_json::json!({ "replyToken": reply_token, "messages": messages });
	let url = format!("{}/v2/bot/message/reply", cfg.api_base);

	client(cfg)?
		.post(&url)
		.header(AUTHORIZATION, bearer(cfg))
		.json(&body)
		.send()
		.await?
		.error_for_status()?;

	Ok(())
}

/// Pushes a message addressed by user id, independent of any reply token.
pub async fn push(cfg: &sage_config::Chat, user_id: &str, text: &str) -> Result<()> {
	let body = serde_json::json!({
		"to": user_id,
		"messages": [ { "type": "text", "text": text } ],
	});
	let url = format!("{}/v2/bot/message/push", cfg.api_base);

	client(cfg)?
		.post(&url)
		.header(AUTHORIZATION, bearer(cfg))
		.json(&body)
		.send()
		.await?
		.error_for_status()?;

	Ok(())
}

/// Downloads the binary content of a user-sent message (images).
pub async fn fetch_content(cfg: &sage_config::Chat, message_id: &str) -> Result<Vec<u8>> {
	let url = format!("{}/v2/bot/message/{message_id}/content", cfg.api_base);
	let bytes = client(cfg)?
		.get(&url)
		.header(AUTHORIZATION, bearer(cfg))
		.send()
		.await?
		.error_for_status()?
		.bytes()
		.await?;

	Ok(bytes.to_vec())
}
