use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use sage_config::Config;

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("sage_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse test config.")
}

#[test]
fn sample_config_is_valid() {
	let cfg = base_config();

	assert!(sage_config::validate(&cfg).is_ok());
}

#[test]
fn admin_secret_must_be_non_empty() {
	let payload = SAMPLE_CONFIG_TOML.replace("admin_secret        = \"sekrit\"", "admin_secret        = \"  \"");
	let path = write_temp_config(payload);
	let result = sage_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected admin_secret validation error.");

	assert!(
		err.to_string().contains("security.admin_secret must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn premium_daily_limit_must_be_positive() {
	let mut cfg = base_config();

	cfg.limits.premium_daily_limit = 0;

	let err = sage_config::validate(&cfg).expect_err("Expected premium limit validation error.");

	assert!(
		err.to_string().contains("limits.premium_daily_limit must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn max_history_must_be_positive() {
	let mut cfg = base_config();

	cfg.limits.max_history = 0;

	let err = sage_config::validate(&cfg).expect_err("Expected max_history validation error.");

	assert!(
		err.to_string().contains("limits.max_history must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn queue_capacity_and_workers_must_be_positive() {
	let mut cfg = base_config();

	cfg.limits.queue_capacity = 0;

	assert!(sage_config::validate(&cfg).is_err());

	cfg = base_config();
	cfg.limits.workers = 0;

	let err = sage_config::validate(&cfg).expect_err("Expected workers validation error.");

	assert!(
		err.to_string().contains("limits.workers must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn utc_offset_must_be_in_range() {
	let mut cfg = base_config();

	cfg.limits.utc_offset_hours = 24;

	let err = sage_config::validate(&cfg).expect_err("Expected utc_offset validation error.");

	assert!(
		err.to_string().contains("limits.utc_offset_hours must be in the range -23 to 23."),
		"Unexpected error: {err}"
	);
}

#[test]
fn provider_api_keys_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.providers.premium.api_key = " ".to_string();

	let err = sage_config::validate(&cfg).expect_err("Expected provider api_key validation error.");

	assert!(
		err.to_string().contains("Provider premium api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn blank_fetch_user_agent_is_normalized_away() {
	let payload = SAMPLE_CONFIG_TOML.replace(
		"user_agent = \"sage-test/0.1\"",
		"user_agent = \"   \"",
	);
	let path = write_temp_config(payload);
	let cfg = sage_config::load(&path).expect("Expected config to load.");

	fs::remove_file(&path).expect("Failed to remove test config.");

	assert!(cfg.providers.fetch.user_agent.is_none());
}

#[test]
fn sage_example_toml_is_valid() {
	let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

	path.push("../../sage.example.toml");

	sage_config::load(&path).expect("Expected sage.example.toml to be a valid config.");
}
