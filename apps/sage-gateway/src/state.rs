use std::sync::Arc;

use sage_service::{ChatService, JobQueue, Providers, jobs};
use sage_storage::db::Db;

use crate::live::{LiveFetcher, LiveGenerator, LiveMessenger, LiveSearcher};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ChatService>,
}
impl AppState {
	pub async fn new(config: sage_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let workers = config.limits.workers as usize;
		let (queue, receiver) = JobQueue::bounded(config.limits.queue_capacity as usize);
		let service = Arc::new(ChatService {
			cfg: config,
			store: Arc::new(db),
			providers: Providers {
				generator: Arc::new(LiveGenerator),
				searcher: Arc::new(LiveSearcher),
				fetcher: Arc::new(LiveFetcher),
				messenger: Arc::new(LiveMessenger),
			},
			jobs: queue,
		});

		jobs::run_workers(service.clone(), receiver, workers);

		Ok(Self { service })
	}

	/// Wires an already built service, used by tests running against fakes.
	pub fn with_service(service: Arc<ChatService>) -> Self {
		Self { service }
	}
}
