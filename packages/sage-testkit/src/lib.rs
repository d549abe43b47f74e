//! In-memory fakes for exercising the chat service without network or
//! database access, plus throwaway Postgres databases for the store tests
//! that do need one. Every fake records what it was asked so tests can
//! assert on interactions, not just outcomes.

mod error;
mod pg;

pub use error::{Error, Result};
pub use pg::{TestDatabase, env_dsn};

use std::{
	collections::{HashMap, VecDeque},
	sync::{Arc, Mutex, MutexGuard},
};

use color_eyre::eyre::eyre;

use sage_config::{
	Chat, Config, FetchConfig, GeneratorConfig, Limits, Postgres, Providers as ProviderConfigs,
	SearchConfig, Security, Service, Storage,
};
use sage_domain::turn::Turn;
use sage_providers::{generator::GeneratorReply, search::SearchHit};
use sage_service::{
	BoxFuture, ChatService, Fetcher, Generator, JobQueue, JobReceiver, Messenger, Providers,
	Searcher,
};
use sage_storage::{Store, memory::MemoryStore};

pub const TEST_ADMIN_SECRET: &str = "test-admin-secret";

pub fn test_config() -> Config {
	let generator = |provider_id: &str, model: &str| GeneratorConfig {
		provider_id: provider_id.to_string(),
		api_base: "http://127.0.0.1:0".to_string(),
		api_key: "test-key".to_string(),
		path: "/v1/chat/completions".to_string(),
		model: model.to_string(),
		temperature: 0.7,
		timeout_ms: 1_000,
		default_headers: serde_json::Map::new(),
	};

	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			admin_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		storage: Storage {
			postgres: Postgres { dsn: "postgres://localhost/unused".to_string(), pool_max_conns: 1 },
		},
		chat: Chat {
			api_base: "http://127.0.0.1:0".to_string(),
			channel_token: "test-channel-token".to_string(),
			timeout_ms: 1_000,
		},
		providers: ProviderConfigs {
			fast: generator("fast", "fast-model"),
			premium: generator("premium", "premium-model"),
			search: SearchConfig {
				api_base: "http://127.0.0.1:0".to_string(),
				api_key: "test-key".to_string(),
				engine_id: "test-engine".to_string(),
				timeout_ms: 1_000,
			},
			fetch: FetchConfig { user_agent: None, timeout_ms: 1_000 },
		},
		limits: Limits {
			max_history: 6,
			premium_daily_limit: 2,
			search_top_k: 2,
			page_char_budget: 7_000,
			queue_capacity: 4,
			workers: 1,
			utc_offset_hours: 9,
		},
		security: Security {
			bind_localhost_only: true,
			admin_secret: TEST_ADMIN_SECRET.to_string(),
		},
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

#[derive(Clone, Debug)]
enum Scripted {
	Reply { text: String, used_external_tool: bool },
	Failure(String),
}

/// Scripted generator. Replies are consumed front to back; once the script is
/// exhausted it echoes the last user turn.
#[derive(Default)]
pub struct FakeGenerator {
	script: Mutex<VecDeque<Scripted>>,
	calls: Mutex<Vec<String>>,
}

impl FakeGenerator {
	pub fn push_reply(&self, text: impl Into<String>) {
		lock(&self.script)
			.push_back(Scripted::Reply { text: text.into(), used_external_tool: false });
	}

	pub fn push_tool_reply(&self, text: impl Into<String>) {
		lock(&self.script)
			.push_back(Scripted::Reply { text: text.into(), used_external_tool: true });
	}

	pub fn push_failure(&self, message: impl Into<String>) {
		lock(&self.script).push_back(Scripted::Failure(message.into()));
	}

	/// Last user text of each `complete`/`describe_image` call, in order.
	pub fn calls(&self) -> Vec<String> {
		lock(&self.calls).clone()
	}

	fn next(&self, call: String) -> color_eyre::Result<GeneratorReply> {
		lock(&self.calls).push(call.clone());

		match lock(&self.script).pop_front() {
			Some(Scripted::Reply { text, used_external_tool }) =>
				Ok(GeneratorReply { text, used_external_tool }),
			Some(Scripted::Failure(message)) => Err(eyre!(message)),
			None => Ok(GeneratorReply { text: format!("echo: {call}"), used_external_tool: false }),
		}
	}
}

impl Generator for FakeGenerator {
	fn complete<'a>(
		&'a self,
		_cfg: &'a GeneratorConfig,
		turns: &'a [Turn],
	) -> BoxFuture<'a, color_eyre::Result<GeneratorReply>> {
		Box::pin(async move {
			let call = turns.last().map(|turn| turn.text.clone()).unwrap_or_default();

			self.next(call)
		})
	}

	fn describe_image<'a>(
		&'a self,
		_cfg: &'a GeneratorConfig,
		prompt: &'a str,
		_image: &'a [u8],
	) -> BoxFuture<'a, color_eyre::Result<GeneratorReply>> {
		Box::pin(async move { self.next(prompt.to_string()) })
	}
}

#[derive(Default)]
pub struct FakeSearcher {
	hits: Mutex<Vec<SearchHit>>,
	fail: Mutex<bool>,
	queries: Mutex<Vec<String>>,
}

impl FakeSearcher {
	pub fn set_hits(&self, hits: Vec<(&str, &str)>) {
		*lock(&self.hits) = hits
			.into_iter()
			.map(|(title, url)| SearchHit { title: title.to_string(), url: url.to_string() })
			.collect();
	}

	pub fn fail_next(&self) {
		*lock(&self.fail) = true;
	}

	pub fn queries(&self) -> Vec<String> {
		lock(&self.queries).clone()
	}
}

impl Searcher for FakeSearcher {
	fn query<'a>(
		&'a self,
		_cfg: &'a SearchConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>> {
		Box::pin(async move {
			lock(&self.queries).push(text.to_string());

			if std::mem::take(&mut *lock(&self.fail)) {
				return Err(eyre!("search backend unavailable"));
			}

			Ok(lock(&self.hits).clone())
		})
	}
}

#[derive(Clone, Debug)]
enum Page {
	Text(String),
	Failure(String),
}

/// Per-URL page fixtures. Unknown URLs fail, matching a dead link.
#[derive(Default)]
pub struct FakeFetcher {
	pages: Mutex<HashMap<String, Page>>,
}

impl FakeFetcher {
	pub fn set_page(&self, url: &str, text: &str) {
		lock(&self.pages).insert(url.to_string(), Page::Text(text.to_string()));
	}

	pub fn set_failure(&self, url: &str, message: &str) {
		lock(&self.pages).insert(url.to_string(), Page::Failure(message.to_string()));
	}
}

impl Fetcher for FakeFetcher {
	fn extract<'a>(
		&'a self,
		_cfg: &'a FetchConfig,
		url: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move {
			match lock(&self.pages).get(url).cloned() {
				Some(Page::Text(text)) => Ok(text),
				Some(Page::Failure(message)) => Err(eyre!(message)),
				None => Err(eyre!("no fixture for {url}")),
			}
		})
	}
}

/// Captures everything sent outward. `fetch_content` serves a fixed byte blob.
#[derive(Default)]
pub struct RecordingMessenger {
	replies: Mutex<Vec<(String, Vec<String>)>>,
	pushes: Mutex<Vec<(String, String)>>,
	content: Mutex<Vec<u8>>,
}

impl RecordingMessenger {
	pub fn set_content(&self, bytes: Vec<u8>) {
		*lock(&self.content) = bytes;
	}

	/// `(reply_token, segments)` pairs in send order.
	pub fn replies(&self) -> Vec<(String, Vec<String>)> {
		lock(&self.replies).clone()
	}

	/// `(user_id, text)` pairs in send order.
	pub fn pushes(&self) -> Vec<(String, String)> {
		lock(&self.pushes).clone()
	}
}

impl Messenger for RecordingMessenger {
	fn reply<'a>(
		&'a self,
		_cfg: &'a Chat,
		reply_token: &'a str,
		segments: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			lock(&self.replies).push((reply_token.to_string(), segments.to_vec()));

			Ok(())
		})
	}

	fn push<'a>(
		&'a self,
		_cfg: &'a Chat,
		user_id: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			lock(&self.pushes).push((user_id.to_string(), text.to_string()));

			Ok(())
		})
	}

	fn fetch_content<'a>(
		&'a self,
		_cfg: &'a Chat,
		_message_id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<u8>>> {
		Box::pin(async move { Ok(lock(&self.content).clone()) })
	}
}

/// A fully wired service over `MemoryStore` and the fakes above. Jobs queued
/// through the service land on `receiver`; tests drain it themselves so
/// worker timing stays deterministic.
pub struct Harness {
	pub service: Arc<ChatService>,
	pub receiver: JobReceiver,
	pub store: Arc<MemoryStore>,
	pub generator: Arc<FakeGenerator>,
	pub searcher: Arc<FakeSearcher>,
	pub fetcher: Arc<FakeFetcher>,
	pub messenger: Arc<RecordingMessenger>,
}

impl Harness {
	pub fn new() -> Self {
		Self::with_config(test_config())
	}

	pub fn with_config(cfg: Config) -> Self {
		let store = Arc::new(MemoryStore::default());
		let generator = Arc::new(FakeGenerator::default());
		let searcher = Arc::new(FakeSearcher::default());
		let fetcher = Arc::new(FakeFetcher::default());
		let messenger = Arc::new(RecordingMessenger::default());
		let (jobs, receiver) = JobQueue::bounded(cfg.limits.queue_capacity as usize);
		let service = Arc::new(ChatService {
			cfg,
			store: store.clone(),
			providers: Providers {
				generator: generator.clone(),
				searcher: searcher.clone(),
				fetcher: fetcher.clone(),
				messenger: messenger.clone(),
			},
			jobs,
		});

		Self { service, receiver, store, generator, searcher, fetcher, messenger }
	}

	/// Marks a user authenticated without going through code redemption.
	pub async fn authenticate(&self, user_id: &str) {
		let code = format!("seed-{user_id}");

		if self.store.insert_code(&code).await.is_ok() {
			let _ = self.store.redeem_code(user_id, &code).await;
		}
	}
}

impl Default for Harness {
	fn default() -> Self {
		Self::new()
	}
}
