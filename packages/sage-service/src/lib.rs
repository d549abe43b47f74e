pub mod admin;
pub mod dispatch;
pub mod jobs;
pub mod search;
pub mod turn;

mod error;

pub use error::{Error, Result};
pub use search::{JobQueue, JobReceiver, JobStatus, SearchJob};

use std::sync::Arc;

use serde::Deserialize;

use sage_config::{Chat, Config, FetchConfig, GeneratorConfig, SearchConfig};
use sage_providers::{generator::GeneratorReply, search::SearchHit};
use sage_storage::Store;

pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Generative model call. The adapter reports tool usage explicitly so core
/// logic never inspects raw response internals.
pub trait Generator
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a GeneratorConfig,
		turns: &'a [sage_domain::turn::Turn],
	) -> BoxFuture<'a, color_eyre::Result<GeneratorReply>>;

	fn describe_image<'a>(
		&'a self,
		cfg: &'a GeneratorConfig,
		prompt: &'a str,
		image: &'a [u8],
	) -> BoxFuture<'a, color_eyre::Result<GeneratorReply>>;
}

pub trait Searcher
where
	Self: Send + Sync,
{
	fn query<'a>(
		&'a self,
		cfg: &'a SearchConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>>;
}

pub trait Fetcher
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		cfg: &'a FetchConfig,
		url: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

/// Outbound platform surface. `reply` is tied to a single-use token; `push`
/// is addressed by user id and independent of any request.
pub trait Messenger
where
	Self: Send + Sync,
{
	fn reply<'a>(
		&'a self,
		cfg: &'a Chat,
		reply_token: &'a str,
		segments: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn push<'a>(
		&'a self,
		cfg: &'a Chat,
		user_id: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn fetch_content<'a>(
		&'a self,
		cfg: &'a Chat,
		message_id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<u8>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub generator: Arc<dyn Generator>,
	pub searcher: Arc<dyn Searcher>,
	pub fetcher: Arc<dyn Fetcher>,
	pub messenger: Arc<dyn Messenger>,
}

pub struct ChatService {
	pub cfg: Config,
	pub store: Arc<dyn Store>,
	pub providers: Providers,
	pub jobs: JobQueue,
}

#[derive(Clone, Debug, Deserialize)]
pub struct InboundEvent {
	pub user_id: String,
	pub reply_token: String,
	#[serde(flatten)]
	pub kind: EventKind,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
	Text { text: String },
	Image { message_id: String },
}

/// One reply operation per inbound event; segments go out as one atomic send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
	pub segments: Vec<String>,
}

impl Reply {
	pub fn one(text: impl Into<String>) -> Self {
		Self { segments: vec![text.into()] }
	}
}
