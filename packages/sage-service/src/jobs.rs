use std::sync::Arc;

use crate::{ChatService, JobReceiver, JobStatus, SearchJob};
use sage_domain::refine;

const NO_RESULTS_TEXT: &str = "\u{1F310} I could not find anything for that search.";
const NO_EVIDENCE_TEXT: &str =
	"\u{1F310} I found results but could not read any of the pages. Please try different keywords.";
const JOB_FAILURE_TEXT: &str = "\u{1F310} Sorry, the search failed. Please try again later.";

/// Spawns the worker pool. Workers share one receiver and run until the queue
/// side is dropped.
pub fn run_workers(service: Arc<ChatService>, receiver: JobReceiver, workers: usize) {
	for worker in 0..workers {
		let service = service.clone();
		let receiver = receiver.clone();

		tokio::spawn(async move {
			while process_one(&service, &receiver).await {}

			tracing::info!(worker, "Search queue closed, worker exiting.");
		});
	}
}

/// Receives and runs a single job. Returns `false` once the queue is closed.
pub async fn process_one(service: &ChatService, receiver: &JobReceiver) -> bool {
	let job = { receiver.lock().await.recv().await };
	let Some(job) = job else {
		return false;
	};

	execute_job(service, job).await;

	true
}

/// Terminal boundary for one job: exactly one push reaches the user, whether
/// the job succeeds or fails.
async fn execute_job(service: &ChatService, job: SearchJob) {
	tracing::info!(user_id = %job.user_id, query = %job.refined_query, status = ?JobStatus::Running, "Search job started.");

	match run_search(service, &job).await {
		Ok(()) =>
			tracing::info!(user_id = %job.user_id, status = ?JobStatus::Succeeded, "Search job finished."),
		Err(err) => {
			tracing::error!(error = %err, user_id = %job.user_id, status = ?JobStatus::Failed, "Search job failed.");

			if let Err(err) =
				service.providers.messenger.push(&service.cfg.chat, &job.user_id, JOB_FAILURE_TEXT).await
			{
				tracing::error!(error = %err, user_id = %job.user_id, "Failure notice delivery failed.");
			}
		},
	}
}

/// Every `Ok` path here has already delivered its one terminal push.
async fn run_search(service: &ChatService, job: &SearchJob) -> color_eyre::Result<()> {
	let hits =
		service.providers.searcher.query(&service.cfg.providers.search, &job.refined_query).await?;

	if hits.is_empty() {
		service.providers.messenger.push(&service.cfg.chat, &job.user_id, NO_RESULTS_TEXT).await?;

		return Ok(());
	}

	let top_k = service.cfg.limits.search_top_k as usize;
	let budget = service.cfg.limits.page_char_budget as usize;
	let mut evidence = Vec::new();
	let mut sources = Vec::new();

	for hit in hits.iter().take(top_k) {
		match service.providers.fetcher.extract(&service.cfg.providers.fetch, &hit.url).await {
			Ok(text) if !text.trim().is_empty() => {
				let text = refine::truncate_chars(&text, budget);

				evidence.push(format!("--- Source: {} ---\n{text}", hit.url));
				sources.push(hit.url.clone());
			},
			Ok(_) => tracing::warn!(url = %hit.url, "Page yielded no readable text."),
			// A single unreadable page never fails the job.
			Err(err) => tracing::warn!(error = %err, url = %hit.url, "Page fetch failed."),
		}
	}

	if evidence.is_empty() {
		service.providers.messenger.push(&service.cfg.chat, &job.user_id, NO_EVIDENCE_TEXT).await?;

		return Ok(());
	}

	let summary = summarize(service, &job.refined_query, &evidence).await?;
	let text = format!(
		"\u{1F310} {summary}\n\nSources:\n{}",
		sources.iter().map(|url| format!("- {url}")).collect::<Vec<_>>().join("\n"),
	);

	service.providers.messenger.push(&service.cfg.chat, &job.user_id, &text).await?;

	Ok(())
}

async fn summarize(
	service: &ChatService,
	query: &str,
	evidence: &[String],
) -> color_eyre::Result<String> {
	let prompt = format!(
		"Answer the question \"{query}\" from the page excerpts below. \
		Give the answer first, then the supporting details, in plain language.\n\n{}",
		evidence.join("\n\n"),
	);
	let turns = [sage_domain::turn::Turn::user(prompt)];
	let completion =
		service.providers.generator.complete(&service.cfg.providers.fast, &turns).await?;

	Ok(completion.text)
}
