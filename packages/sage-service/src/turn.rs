use time::OffsetDateTime;

use crate::{ChatService, Reply, Result};
use sage_config::GeneratorConfig;
use sage_domain::{calendar, mode::Mode, turn::Turn};

const MODEL_FAILURE_TEXT: &str =
	"Sorry, I could not produce a reply. Try /reset if the problem persists.";
const IMAGE_FAILURE_TEXT: &str = "Sorry, I could not process that image.";
const IMAGE_AUTH_TEXT: &str = "Please enter your access code first.";
const IMAGE_PROMPT: &str =
	"Describe this image in plain language, covering everything visible in it.";

impl ChatService {
	/// One conversational exchange: resolve the tier, consume quota when the
	/// user is on premium, run the model over the bounded history, and
	/// persist both turns only when the call succeeded.
	pub(crate) async fn converse(&self, user_id: &str, text: &str) -> Result<Reply> {
		let tier = self.resolve_tier(user_id).await?;
		let max = self.cfg.limits.max_history;
		let mut turns = self.store.load_history(user_id, max).await?;

		turns.push(Turn::user(text));

		let completion =
			match self.providers.generator.complete(self.generator_cfg(tier), &turns).await {
				Ok(completion) => completion,
				Err(err) => {
					// Nothing from this failed turn is persisted.
					tracing::error!(error = %err, user_id = %user_id, tier = tier.as_str(), "Model call failed.");

					return Ok(Reply::one(MODEL_FAILURE_TEXT));
				},
			};

		if completion.used_external_tool {
			tracing::debug!(user_id = %user_id, "Model consulted an external tool.");
		}

		let appended = [Turn::user(text), Turn::assistant(completion.text.clone())];

		self.store.append_history(user_id, &appended, max).await?;

		Ok(Reply::one(format!("{} {}", tier.icon(), completion.text)))
	}

	/// The premium slot is consumed before the call is dispatched and is not
	/// refunded on failure. When the quota is exhausted the stored mode stays
	/// premium; only this turn falls back to the fast tier, with an
	/// out-of-band notice.
	async fn resolve_tier(&self, user_id: &str) -> Result<Mode> {
		if self.store.mode(user_id).await? != Mode::Premium {
			return Ok(Mode::Fast);
		}

		let limit = self.cfg.limits.premium_daily_limit;
		let today =
			calendar::local_date(OffsetDateTime::now_utc(), self.cfg.limits.utc_offset_hours);

		if self.store.try_consume_quota(user_id, today, limit).await? {
			return Ok(Mode::Premium);
		}

		let notice = format!(
			"You have reached the daily premium limit ({limit}/day). Answering with the fast tier."
		);

		if let Err(err) = self.providers.messenger.push(&self.cfg.chat, user_id, &notice).await {
			tracing::warn!(error = %err, user_id = %user_id, "Quota notice delivery failed.");
		}

		Ok(Mode::Fast)
	}

	pub(crate) async fn handle_image(&self, user_id: &str, message_id: &str) -> Result<Reply> {
		if !self.store.is_authenticated(user_id).await? {
			return Ok(Reply::one(IMAGE_AUTH_TEXT));
		}

		let described = async {
			let image =
				self.providers.messenger.fetch_content(&self.cfg.chat, message_id).await?;

			self.providers
				.generator
				.describe_image(&self.cfg.providers.fast, IMAGE_PROMPT, &image)
				.await
		}
		.await;

		match described {
			Ok(completion) =>
				Ok(Reply::one(format!("\u{1F5BC} Here is what I can see.\n\n{}", completion.text))),
			Err(err) => {
				tracing::error!(error = %err, user_id = %user_id, "Image handling failed.");

				Ok(Reply::one(IMAGE_FAILURE_TEXT))
			},
		}
	}

	pub(crate) fn generator_cfg(&self, tier: Mode) -> &GeneratorConfig {
		match tier {
			Mode::Fast => &self.cfg.providers.fast,
			Mode::Premium => &self.cfg.providers.premium,
		}
	}
}
