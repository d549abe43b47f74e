use std::time::Duration;

use base64::Engine;
use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use sage_domain::turn::{Role, Turn};

/// Typed result of one model call. Whether the model reached for an external
/// tool is computed here, from the response structure, so core logic never
/// inspects raw provider payloads.
#[derive(Clone, Debug)]
pub struct GeneratorReply {
	pub text: String,
	pub used_external_tool: bool,
}

pub async fn complete(
	cfg: &sage_config::GeneratorConfig,
	turns: &[Turn],
) -> Result<GeneratorReply> {
	let messages: Vec<Value> = turns
		.iter()
		.map(|turn| {
			serde_json::json!({
				"role": role_name(turn.role),
				"content": turn.text,
			})
		})
		.collect();

	request(cfg, messages).await
}

/// Describes an image with the vision-capable fast model. The image travels
/// inline as a base64 data URL.
pub async fn describe_image(
	cfg: &sage_config::GeneratorConfig,
	prompt: &str,
	image: &[u8],
) -> Result<GeneratorReply> {
	let encoded = base64::engine::general_purpose::STANDARD.encode(image);
	let messages = vec![serde_json::json!({
		"role": "user",
		"content": [
			{ "type": "text", "text": prompt },
			{
				"type": "image_url",
				"image_url": { "url": format!("data:image/jpeg;base64,{encoded}") },
			},
		],
	})];

	request(cfg, messages).await
}

async fn request(cfg: &sage_config::GeneratorConfig, messages: Vec<Value>) -> Result<GeneratorReply> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion(json)
}

fn role_name(role: Role) -> &'static str {
	match role {
		Role::User => "user",
		Role::Assistant => "assistant",
	}
}

fn parse_completion(json: Value) -> Result<GeneratorReply> {
	let message = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.ok_or_else(|| eyre::eyre!("Completion response is missing a message."))?;
	let text = message
		.get("content")
		.and_then(|c| c.as_str())
		.unwrap_or("")
		.trim()
		.to_string();
	let used_external_tool = message
		.get("tool_calls")
		.and_then(|v| v.as_array())
		.map(|calls| !calls.is_empty())
		.unwrap_or(false);

	if text.is_empty() && !used_external_tool {
		return Err(eyre::eyre!("Completion response has empty content."));
	}

	Ok(GeneratorReply { text, used_external_tool })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "Hello there." } }
			]
		});
		let reply = parse_completion(json).expect("parse failed");
		assert_eq!(reply.text, "Hello there.");
		assert!(!reply.used_external_tool);
	}

	#[test]
	fn flags_tool_calls() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "Looked it up.", "tool_calls": [ { "id": "t1" } ] } }
			]
		});
		let reply = parse_completion(json).expect("parse failed");
		assert!(reply.used_external_tool);
	}

	#[test]
	fn rejects_empty_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "   " } }
			]
		});
		assert!(parse_completion(json).is_err());
	}
}
