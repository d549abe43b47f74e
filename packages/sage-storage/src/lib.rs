pub mod db;
pub mod memory;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn Future<Output = T> + Send + 'a>>;

use time::Date;

use sage_domain::{mode::Mode, turn::Turn};

/// Per-user persistent state: bounded history, mode, daily premium quota,
/// and one-time auth codes. Quota consumption and code redemption are
/// atomic; history appends are last-write-wins per user (concurrent writers
/// for one user are not expected, see the service docs).
pub trait Store
where
	Self: Send + Sync,
{
	/// At most the last `max` turns, oldest first.
	fn load_history<'a>(&'a self, user_id: &'a str, max: u32) -> BoxFuture<'a, Result<Vec<Turn>>>;

	/// Appends to the tail, then truncates to the last `max` before persisting.
	fn append_history<'a>(
		&'a self,
		user_id: &'a str,
		turns: &'a [Turn],
		max: u32,
	) -> BoxFuture<'a, Result<()>>;

	fn reset_history<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<()>>;

	fn mode<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Mode>>;

	fn set_mode<'a>(&'a self, user_id: &'a str, mode: Mode) -> BoxFuture<'a, Result<()>>;

	/// Atomic read-modify-write: increments and returns `true` only while the
	/// counter for `(user, date)` is below `limit`. Two concurrent calls at
	/// `limit - 1` never both succeed.
	fn try_consume_quota<'a>(
		&'a self,
		user_id: &'a str,
		date: Date,
		limit: u32,
	) -> BoxFuture<'a, Result<bool>>;

	fn quota_used<'a>(&'a self, user_id: &'a str, date: Date) -> BoxFuture<'a, Result<u32>>;

	fn is_authenticated<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<bool>>;

	/// Consumes the code and marks the user authenticated. Succeeds at most
	/// once per code value across concurrent callers; a bad or already-used
	/// code returns `false` and leaves all state unchanged.
	fn redeem_code<'a>(&'a self, user_id: &'a str, code: &'a str) -> BoxFuture<'a, Result<bool>>;

	fn insert_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<()>>;
}
