use uuid::Uuid;

use crate::{ChatService, Error, Result};

const CODE_LEN: usize = 8;

impl ChatService {
	/// Mints one single-use access code. The caller must present the exact
	/// admin secret from the configuration.
	pub async fn mint_code(&self, secret: &str) -> Result<String> {
		if secret != self.cfg.security.admin_secret {
			return Err(Error::Unauthorized { message: "Bad admin secret.".into() });
		}

		let code: String = Uuid::new_v4().simple().to_string().chars().take(CODE_LEN).collect();

		self.store.insert_code(&code).await?;

		// The code itself is a credential and stays out of the logs.
		tracing::info!("Access code minted.");

		Ok(code)
	}
}
