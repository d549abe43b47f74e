//! Production provider wiring. Each adapter forwards to the HTTP clients in
//! `sage-providers`; core logic only ever sees the service traits.

use sage_config::{Chat, FetchConfig, GeneratorConfig, SearchConfig};
use sage_domain::turn::Turn;
use sage_providers::{fetch, generator, generator::GeneratorReply, messenger, search, search::SearchHit};
use sage_service::{BoxFuture, Fetcher, Generator, Messenger, Searcher};

pub struct LiveGenerator;

impl Generator for LiveGenerator {
	fn complete<'a>(
		&'a self,
		cfg: &'a GeneratorConfig,
		turns: &'a [Turn],
	) -> BoxFuture<'a, color_eyre::Result<GeneratorReply>> {
		Box::pin(generator::complete(cfg, turns))
	}

	fn describe_image<'a>(
		&'a self,
		cfg: &'a GeneratorConfig,
		prompt: &'a str,
		image: &'a [u8],
	) -> BoxFuture<'a, color_eyre::Result<GeneratorReply>> {
		Box::pin(generator::describe_image(cfg, prompt, image))
	}
}

pub struct LiveSearcher;

impl Searcher for LiveSearcher {
	fn query<'a>(
		&'a self,
		cfg: &'a SearchConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>> {
		Box::pin(search::query(cfg, text))
	}
}

pub struct LiveFetcher;

impl Fetcher for LiveFetcher {
	fn extract<'a>(
		&'a self,
		cfg: &'a FetchConfig,
		url: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(fetch::extract(cfg, url))
	}
}

pub struct LiveMessenger;

impl Messenger for LiveMessenger {
	fn reply<'a>(
		&'a self,
		cfg: &'a Chat,
		reply_token: &'a str,
		segments: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(messenger::reply(cfg, reply_token, segments))
	}

	fn push<'a>(
		&'a self,
		cfg: &'a Chat,
		user_id: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(messenger::push(cfg, user_id, text))
	}

	fn fetch_content<'a>(
		&'a self,
		cfg: &'a Chat,
		message_id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<u8>>> {
		Box::pin(messenger::fetch_content(cfg, message_id))
	}
}
