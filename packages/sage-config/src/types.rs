use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub chat: Chat,
	pub providers: Providers,
	pub limits: Limits,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Messaging platform client settings. The reply/push endpoints hang off `api_base`.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
	pub api_base: String,
	pub channel_token: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub fast: GeneratorConfig,
	pub premium: GeneratorConfig,
	pub search: SearchConfig,
	pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
	pub api_base: String,
	pub api_key: String,
	pub engine_id: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
	pub user_agent: Option<String>,
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Limits {
	pub max_history: u32,
	pub premium_daily_limit: u32,
	#[serde(default = "default_search_top_k")]
	pub search_top_k: u32,
	#[serde(default = "default_page_char_budget")]
	pub page_char_budget: u32,
	pub queue_capacity: u32,
	pub workers: u32,
	#[serde(default = "default_utc_offset_hours")]
	pub utc_offset_hours: i8,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	pub admin_secret: String,
}

fn default_search_top_k() -> u32 {
	2
}

fn default_page_char_budget() -> u32 {
	7_000
}

fn default_utc_offset_hours() -> i8 {
	9
}
