use std::sync::Arc;

use time::macros::date;

use sage_domain::turn::Turn;
use sage_storage::{Store, memory::MemoryStore};

const MAX_HISTORY: u32 = 6;

#[tokio::test]
async fn history_window_holds_after_every_append() {
	let store = MemoryStore::new();

	for idx in 0..20 {
		store
			.append_history("u1", &[Turn::user(format!("m{idx}"))], MAX_HISTORY)
			.await
			.expect("Append failed.");

		let turns = store.load_history("u1", MAX_HISTORY).await.expect("Load failed.");

		assert!(turns.len() as u32 <= MAX_HISTORY);
	}

	let turns = store.load_history("u1", MAX_HISTORY).await.expect("Load failed.");
	let texts: Vec<_> = turns.iter().map(|turn| turn.text.as_str()).collect();

	assert_eq!(texts, vec!["m14", "m15", "m16", "m17", "m18", "m19"]);
}

#[tokio::test]
async fn reset_then_load_yields_empty() {
	let store = MemoryStore::new();

	store
		.append_history("u1", &[Turn::user("hi"), Turn::assistant("hello")], MAX_HISTORY)
		.await
		.expect("Append failed.");
	store.reset_history("u1").await.expect("Reset failed.");

	let turns = store.load_history("u1", MAX_HISTORY).await.expect("Load failed.");

	assert!(turns.is_empty());
}

#[tokio::test]
async fn quota_succeeds_exactly_limit_times() {
	let store = MemoryStore::new();
	let today = date!(2024 - 05 - 01);
	let limit = 5;

	for _ in 0..limit {
		assert!(store.try_consume_quota("u1", today, limit).await.expect("Consume failed."));
	}

	assert!(!store.try_consume_quota("u1", today, limit).await.expect("Consume failed."));
	assert_eq!(store.quota_used("u1", today).await.expect("Read failed."), limit);
}

#[tokio::test]
async fn concurrent_quota_never_exceeds_the_limit() {
	let store = Arc::new(MemoryStore::new());
	let today = date!(2024 - 05 - 01);
	let limit = 5;
	let mut handles = Vec::new();

	for _ in 0..32 {
		let store = store.clone();

		handles.push(tokio::spawn(async move {
			store.try_consume_quota("u1", today, limit).await.expect("Consume failed.")
		}));
	}

	let mut successes = 0;

	for handle in handles {
		if handle.await.expect("Task panicked.") {
			successes += 1;
		}
	}

	assert_eq!(successes, limit);
	assert_eq!(store.quota_used("u1", today).await.expect("Read failed."), limit);
}

#[tokio::test]
async fn quota_is_tracked_per_day() {
	let store = MemoryStore::new();
	let limit = 1;

	assert!(store
		.try_consume_quota("u1", date!(2024 - 05 - 01), limit)
		.await
		.expect("Consume failed."));
	assert!(!store
		.try_consume_quota("u1", date!(2024 - 05 - 01), limit)
		.await
		.expect("Consume failed."));
	assert!(store
		.try_consume_quota("u1", date!(2024 - 05 - 02), limit)
		.await
		.expect("Consume failed."));
}

#[tokio::test]
async fn code_redeems_exactly_once_sequentially() {
	let store = MemoryStore::new();

	store.insert_code("ABC123").await.expect("Insert failed.");

	assert!(store.redeem_code("u1", "ABC123").await.expect("Redeem failed."));
	assert!(store.is_authenticated("u1").await.expect("Read failed."));
	assert!(!store.redeem_code("u2", "ABC123").await.expect("Redeem failed."));
	assert!(!store.is_authenticated("u2").await.expect("Read failed."));
}

#[tokio::test]
async fn code_redeems_exactly_once_under_concurrency() {
	let store = Arc::new(MemoryStore::new());

	store.insert_code("ABC123").await.expect("Insert failed.");

	let mut handles = Vec::new();

	for idx in 0..16 {
		let store = store.clone();

		handles.push(tokio::spawn(async move {
			let user = format!("u{idx}");

			store.redeem_code(&user, "ABC123").await.expect("Redeem failed.")
		}));
	}

	let mut successes = 0;

	for handle in handles {
		if handle.await.expect("Task panicked.") {
			successes += 1;
		}
	}

	assert_eq!(successes, 1);
}

#[tokio::test]
async fn unknown_code_leaves_state_unchanged() {
	let store = MemoryStore::new();

	assert!(!store.redeem_code("u1", "nope").await.expect("Redeem failed."));
	assert!(!store.is_authenticated("u1").await.expect("Read failed."));
}
