use crate::{ChatService, EventKind, InboundEvent, Reply, Result};
use sage_domain::{
	command::{self, Command, Parsed},
	mode::Mode,
};

pub const GENERIC_ERROR_TEXT: &str =
	"Sorry, something went wrong. Try /reset to clear the conversation.";
const RETRY_CODE_TEXT: &str = "Please enter your access code.";
const WELCOME_TEXT: &str = "You are all set. Ask me anything.";
const RESET_DONE_TEXT: &str = "Conversation history cleared.";

impl ChatService {
	/// Outermost boundary for one inbound event: always exactly one reply
	/// operation, even when handling fails internally.
	pub async fn process_event(&self, event: InboundEvent) {
		let reply = match self.handle_event(&event).await {
			Ok(reply) => reply,
			Err(err) => {
				tracing::error!(error = %err, user_id = %event.user_id, "Event handling failed.");

				Reply::one(GENERIC_ERROR_TEXT)
			},
		};

		if let Err(err) = self
			.providers
			.messenger
			.reply(&self.cfg.chat, &event.reply_token, &reply.segments)
			.await
		{
			tracing::error!(error = %err, user_id = %event.user_id, "Reply delivery failed.");
		}
	}

	pub async fn handle_event(&self, event: &InboundEvent) -> Result<Reply> {
		match &event.kind {
			EventKind::Text { text } => self.handle_text(&event.user_id, text.trim()).await,
			EventKind::Image { message_id } => self.handle_image(&event.user_id, message_id).await,
		}
	}

	async fn handle_text(&self, user_id: &str, text: &str) -> Result<Reply> {
		if !self.store.is_authenticated(user_id).await? {
			return self.handle_auth_attempt(user_id, text).await;
		}

		match command::parse(text) {
			Some(Parsed::Command(cmd)) => self.handle_command(user_id, cmd).await,
			Some(Parsed::Unknown { name }) =>
				Ok(Reply::one(format!("Unknown command: /{name}"))),
			None => self.converse(user_id, text).await,
		}
	}

	/// While unauthenticated, every text message is treated as a redemption
	/// attempt. No other branch is reachable.
	async fn handle_auth_attempt(&self, user_id: &str, code: &str) -> Result<Reply> {
		if !self.store.redeem_code(user_id, code).await? {
			return Ok(Reply::one(RETRY_CODE_TEXT));
		}

		tracing::info!(user_id = %user_id, "User authenticated.");

		Ok(Reply {
			segments: vec![WELCOME_TEXT.to_string(), self.command_summary()],
		})
	}

	async fn handle_command(&self, user_id: &str, cmd: Command) -> Result<Reply> {
		match cmd {
			Command::Reset => {
				self.store.reset_history(user_id).await?;

				Ok(Reply::one(RESET_DONE_TEXT))
			},
			Command::SetMode(mode) => {
				self.store.set_mode(user_id, mode).await?;

				let text = match mode {
					Mode::Fast => format!("{} Switched to the fast tier.", mode.icon()),
					Mode::Premium => format!(
						"{} Switched to the premium tier. (limit: {} requests/day)",
						mode.icon(),
						self.cfg.limits.premium_daily_limit,
					),
				};

				Ok(Reply::one(text))
			},
			Command::Search { query } => self.handle_search(user_id, &query).await,
		}
	}

	fn command_summary(&self) -> String {
		format!(
			"Commands:\n\
			/search <keywords> - search the web\n\
			/premium - premium tier ({}/day)\n\
			/fast - fast tier\n\
			/reset - clear history",
			self.cfg.limits.premium_daily_limit,
		)
	}
}
