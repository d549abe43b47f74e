use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::{ChatService, Reply, Result};
use sage_domain::{history, refine, turn::Turn};

const SEARCH_USAGE_TEXT: &str = "Usage: /search <keywords>";
const QUEUE_BUSY_TEXT: &str =
	"The search queue is full right now. Please try again in a moment.";
const MAX_REFINED_CHARS: usize = 128;

/// A queued background search. `refined_query` is what the workers actually
/// run; `raw_query` is kept for logging.
#[derive(Clone, Debug)]
pub struct SearchJob {
	pub user_id: String,
	pub raw_query: String,
	pub refined_query: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
	Queued,
	Running,
	Succeeded,
	Failed,
}

/// Bounded handle for enqueueing search jobs. Enqueueing never waits; a full
/// queue is reported to the caller instead.
#[derive(Clone)]
pub struct JobQueue {
	tx: mpsc::Sender<SearchJob>,
}

pub type JobReceiver = Arc<Mutex<mpsc::Receiver<SearchJob>>>;

impl JobQueue {
	pub fn bounded(capacity: usize) -> (Self, JobReceiver) {
		let (tx, rx) = mpsc::channel(capacity);

		(Self { tx }, Arc::new(Mutex::new(rx)))
	}

	pub fn try_enqueue(&self, job: SearchJob) -> bool {
		match self.tx.try_send(job) {
			Ok(()) => true,
			Err(mpsc::error::TrySendError::Full(job)) => {
				tracing::warn!(user_id = %job.user_id, "Search queue is full.");

				false
			},
			Err(mpsc::error::TrySendError::Closed(job)) => {
				tracing::error!(user_id = %job.user_id, "Search queue is closed.");

				false
			},
		}
	}
}

impl ChatService {
	pub(crate) async fn handle_search(&self, user_id: &str, query: &str) -> Result<Reply> {
		let query = query.trim();

		if query.is_empty() {
			return Ok(Reply::one(SEARCH_USAGE_TEXT));
		}

		let refined = self.refine_query(user_id, query).await;
		let job = SearchJob {
			user_id: user_id.to_string(),
			raw_query: query.to_string(),
			refined_query: refined.clone(),
		};

		if !self.jobs.try_enqueue(job) {
			return Ok(Reply::one(QUEUE_BUSY_TEXT));
		}

		tracing::info!(user_id = %user_id, query = %refined, "Search job queued.");

		Ok(Reply::one(format!(
			"\u{1F50E} Searching for \"{refined}\". I will send the results when they are ready."
		)))
	}

	/// Best-effort query refinement. Short bare queries are folded together
	/// with the latest conversation context through the fast model; any
	/// failure along the way falls back to the raw query unchanged.
	async fn refine_query(&self, user_id: &str, raw: &str) -> String {
		if !refine::needs_context(raw) {
			return raw.to_string();
		}

		let turns = match self.store.load_history(user_id, self.cfg.limits.max_history).await {
			Ok(turns) => turns,
			Err(err) => {
				tracing::warn!(error = %err, user_id = %user_id, "History load for refinement failed.");

				return raw.to_string();
			},
		};
		let Some(context) = history::last_user_text(&turns) else {
			return raw.to_string();
		};
		let prompt = format!(
			"Rewrite the search keywords below into one standalone web search query, \
			using the previous message only to resolve what the keywords refer to. \
			Reply with the query alone.\n\n\
			Previous message: {context}\n\
			Keywords: {raw}"
		);
		let turns = [Turn::user(prompt)];

		match self.providers.generator.complete(&self.cfg.providers.fast, &turns).await {
			Ok(completion) => refine::clamp_refined(raw, &completion.text, MAX_REFINED_CHARS),
			Err(err) => {
				tracing::warn!(error = %err, user_id = %user_id, "Query refinement failed.");

				raw.to_string()
			},
		}
	}
}
