use std::{
	collections::{HashMap, HashSet},
	sync::Mutex,
};

use time::Date;

use crate::{BoxFuture, Result, Store};
use sage_domain::{history, mode::Mode, turn::Turn};

/// In-process store for tests and single-node development. One mutex guards
/// all state, which makes quota consumption and code redemption naturally
/// atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
	state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
	histories: HashMap<String, Vec<Turn>>,
	modes: HashMap<String, Mode>,
	authenticated: HashSet<String>,
	codes: HashSet<String>,
	quota: HashMap<(String, Date), u32>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}

impl Store for MemoryStore {
	fn load_history<'a>(&'a self, user_id: &'a str, max: u32) -> BoxFuture<'a, Result<Vec<Turn>>> {
		Box::pin(async move {
			let state = self.lock();
			let turns = state.histories.get(user_id).cloned().unwrap_or_default();

			Ok(history::window(turns, max))
		})
	}

	fn append_history<'a>(
		&'a self,
		user_id: &'a str,
		turns: &'a [Turn],
		max: u32,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut state = self.lock();
			let entry = state.histories.entry(user_id.to_string()).or_default();

			entry.extend_from_slice(turns);

			let windowed = history::window(std::mem::take(entry), max);

			*entry = windowed;

			Ok(())
		})
	}

	fn reset_history<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.lock().histories.remove(user_id);

			Ok(())
		})
	}

	fn mode<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Mode>> {
		Box::pin(async move { Ok(self.lock().modes.get(user_id).copied().unwrap_or_default()) })
	}

	fn set_mode<'a>(&'a self, user_id: &'a str, mode: Mode) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.lock().modes.insert(user_id.to_string(), mode);

			Ok(())
		})
	}

	fn try_consume_quota<'a>(
		&'a self,
		user_id: &'a str,
		date: Date,
		limit: u32,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			let mut state = self.lock();
			let used = state.quota.entry((user_id.to_string(), date)).or_insert(0);

			if *used >= limit {
				return Ok(false);
			}

			*used += 1;

			Ok(true)
		})
	}

	fn quota_used<'a>(&'a self, user_id: &'a str, date: Date) -> BoxFuture<'a, Result<u32>> {
		Box::pin(async move {
			Ok(self.lock().quota.get(&(user_id.to_string(), date)).copied().unwrap_or(0))
		})
	}

	fn is_authenticated<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move { Ok(self.lock().authenticated.contains(user_id)) })
	}

	fn redeem_code<'a>(&'a self, user_id: &'a str, code: &'a str) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			let mut state = self.lock();

			if !state.codes.remove(code) {
				return Ok(false);
			}

			state.authenticated.insert(user_id.to_string());

			Ok(true)
		})
	}

	fn insert_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.lock().codes.insert(code.to_string());

			Ok(())
		})
	}
}
