pub fn render_schema() -> &'static str {
	"\
CREATE TABLE IF NOT EXISTS chat_users (
	user_id       TEXT PRIMARY KEY,
	authenticated BOOLEAN NOT NULL DEFAULT FALSE,
	mode          TEXT,
	created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS chat_history (
	user_id    TEXT PRIMARY KEY,
	turns      JSONB NOT NULL,
	updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS premium_usage (
	user_id    TEXT NOT NULL,
	usage_date DATE NOT NULL,
	used       INTEGER NOT NULL DEFAULT 0,
	PRIMARY KEY (user_id, usage_date)
);

CREATE TABLE IF NOT EXISTS auth_codes (
	code       TEXT PRIMARY KEY,
	created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)"
}
