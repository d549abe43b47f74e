mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Chat, Config, FetchConfig, GeneratorConfig, Limits, Postgres, Providers, SearchConfig,
	Security, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
		("service.log_level", &cfg.service.log_level),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
		("chat.api_base", &cfg.chat.api_base),
		("chat.channel_token", &cfg.chat.channel_token),
		("providers.search.api_base", &cfg.providers.search.api_base),
		("providers.search.engine_id", &cfg.providers.search.engine_id),
		("security.admin_secret", &cfg.security.admin_secret),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	for (label, provider) in
		[("fast", &cfg.providers.fast), ("premium", &cfg.providers.premium)]
	{
		if provider.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
		if provider.model.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} model must be non-empty."),
			});
		}
		if provider.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}

	if cfg.providers.search.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.search.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.search.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.search.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.fetch.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.fetch.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.chat.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "chat.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.limits.max_history == 0 {
		return Err(Error::Validation {
			message: "limits.max_history must be greater than zero.".to_string(),
		});
	}
	if cfg.limits.premium_daily_limit == 0 {
		return Err(Error::Validation {
			message: "limits.premium_daily_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.limits.search_top_k == 0 {
		return Err(Error::Validation {
			message: "limits.search_top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.limits.page_char_budget == 0 {
		return Err(Error::Validation {
			message: "limits.page_char_budget must be greater than zero.".to_string(),
		});
	}
	if cfg.limits.queue_capacity == 0 {
		return Err(Error::Validation {
			message: "limits.queue_capacity must be greater than zero.".to_string(),
		});
	}
	if cfg.limits.workers == 0 {
		return Err(Error::Validation {
			message: "limits.workers must be greater than zero.".to_string(),
		});
	}
	if !(-23..=23).contains(&cfg.limits.utc_offset_hours) {
		return Err(Error::Validation {
			message: "limits.utc_offset_hours must be in the range -23 to 23.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.providers
		.fetch
		.user_agent
		.as_deref()
		.map(|agent| agent.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.fetch.user_agent = None;
	}
}
