use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use time::Date;

use crate::{BoxFuture, Result, Store, schema};
use sage_domain::{history, mode::Mode, turn::Turn};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &sage_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let mut tx = self.pool.begin().await?;

		for statement in schema::render_schema().split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}

	async fn load_history_inner(&self, user_id: &str, max: u32) -> Result<Vec<Turn>> {
		let row = sqlx::query("SELECT turns FROM chat_history WHERE user_id = $1")
			.bind(user_id)
			.fetch_optional(&self.pool)
			.await?;
		let Some(row) = row else {
			return Ok(Vec::new());
		};
		let raw: serde_json::Value = row.try_get("turns")?;
		let turns: Vec<Turn> = serde_json::from_value(raw)?;

		Ok(history::window(turns, max))
	}

	async fn append_history_inner(&self, user_id: &str, turns: &[Turn], max: u32) -> Result<()> {
		let mut all = self.load_history_inner(user_id, max).await?;

		all.extend_from_slice(turns);

		let all = history::window(all, max);
		let encoded = serde_json::to_value(&all)?;

		sqlx::query(
			"\
INSERT INTO chat_history (user_id, turns, updated_at)
VALUES ($1, $2, now())
ON CONFLICT (user_id) DO UPDATE
SET turns = EXCLUDED.turns, updated_at = now()",
		)
		.bind(user_id)
		.bind(encoded)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	async fn try_consume_quota_inner(&self, user_id: &str, date: Date, limit: u32) -> Result<bool> {
		// A single upsert keeps the read-modify-write atomic: the increment
		// only applies while the current counter is below the limit.
		let result = sqlx::query(
			"\
INSERT INTO premium_usage (user_id, usage_date, used)
VALUES ($1, $2, 1)
ON CONFLICT (user_id, usage_date) DO UPDATE
SET used = premium_usage.used + 1
WHERE premium_usage.used < $3",
		)
		.bind(user_id)
		.bind(date)
		.bind(limit as i32)
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() == 1)
	}

	async fn redeem_code_inner(&self, user_id: &str, code: &str) -> Result<bool> {
		let mut tx = self.pool.begin().await?;
		// DELETE claims the code; exactly one concurrent redeemer observes an
		// affected row.
		let deleted = sqlx::query("DELETE FROM auth_codes WHERE code = $1")
			.bind(code)
			.execute(&mut *tx)
			.await?;

		if deleted.rows_affected() != 1 {
			return Ok(false);
		}

		sqlx::query(
			"\
INSERT INTO chat_users (user_id, authenticated)
VALUES ($1, TRUE)
ON CONFLICT (user_id) DO UPDATE
SET authenticated = TRUE",
		)
		.bind(user_id)
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;

		Ok(true)
	}
}

impl Store for Db {
	fn load_history<'a>(&'a self, user_id: &'a str, max: u32) -> BoxFuture<'a, Result<Vec<Turn>>> {
		Box::pin(self.load_history_inner(user_id, max))
	}

	fn append_history<'a>(
		&'a self,
		user_id: &'a str,
		turns: &'a [Turn],
		max: u32,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.append_history_inner(user_id, turns, max))
	}

	fn reset_history<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query("DELETE FROM chat_history WHERE user_id = $1")
				.bind(user_id)
				.execute(&self.pool)
				.await?;

			Ok(())
		})
	}

	fn mode<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Mode>> {
		Box::pin(async move {
			let raw: Option<Option<String>> =
				sqlx::query_scalar("SELECT mode FROM chat_users WHERE user_id = $1")
					.bind(user_id)
					.fetch_optional(&self.pool)
					.await?;

			Ok(raw.flatten().as_deref().and_then(Mode::parse).unwrap_or_default())
		})
	}

	fn set_mode<'a>(&'a self, user_id: &'a str, mode: Mode) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO chat_users (user_id, mode)
VALUES ($1, $2)
ON CONFLICT (user_id) DO UPDATE
SET mode = EXCLUDED.mode",
			)
			.bind(user_id)
			.bind(mode.as_str())
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn try_consume_quota<'a>(
		&'a self,
		user_id: &'a str,
		date: Date,
		limit: u32,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(self.try_consume_quota_inner(user_id, date, limit))
	}

	fn quota_used<'a>(&'a self, user_id: &'a str, date: Date) -> BoxFuture<'a, Result<u32>> {
		Box::pin(async move {
			let used: Option<i32> = sqlx::query_scalar(
				"SELECT used FROM premium_usage WHERE user_id = $1 AND usage_date = $2",
			)
			.bind(user_id)
			.bind(date)
			.fetch_optional(&self.pool)
			.await?;

			Ok(used.unwrap_or(0).max(0) as u32)
		})
	}

	fn is_authenticated<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			let authenticated: Option<bool> =
				sqlx::query_scalar("SELECT authenticated FROM chat_users WHERE user_id = $1")
					.bind(user_id)
					.fetch_optional(&self.pool)
					.await?;

			Ok(authenticated.unwrap_or(false))
		})
	}

	fn redeem_code<'a>(&'a self, user_id: &'a str, code: &'a str) -> BoxFuture<'a, Result<bool>> {
		Box::pin(self.redeem_code_inner(user_id, code))
	}

	fn insert_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query("INSERT INTO auth_codes (code) VALUES ($1) ON CONFLICT (code) DO NOTHING")
				.bind(code)
				.execute(&self.pool)
				.await?;

			Ok(())
		})
	}
}
