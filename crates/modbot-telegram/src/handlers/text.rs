use std::sync::Arc;

use teloxide::prelude::*;

use modbot_core::{domain::UserId, Error};

use crate::router::AppState;

use super::submit::run_submission;

pub async fn handle_text(bot: Bot, msg: Message, state: Arc<AppState>) -> anyhow::Result<()> {
    let Some(text) = msg.text().map(|s| s.to_string()) else {
        return Ok(());
    };

    run_submission(bot, &msg, state, Some(text), None).await
}

/// A moderator with an open rejection prompt replied: consume the text as
/// the rejection reason.
pub async fn handle_rejection_reason(
    bot: Bot,
    msg: &Message,
    state: Arc<AppState>,
    moderator: UserId,
    reason: &str,
) -> anyhow::Result<()> {
    match state.service.complete_reject(moderator, reason).await {
        // Both parties were notified by the service.
        Ok(Some(_)) => Ok(()),
        // The entry vanished between classification and consumption; the
        // message was not consumed, so treat it as an ordinary submission.
        Ok(None) => run_submission(bot, msg, state, Some(reason.to_string()), None).await,
        // Service already re-issued the prompt.
        Err(Error::EmptyReason) => Ok(()),
        Err(Error::NotFound(_)) | Err(Error::AlreadyResolved(_)) => {
            let _ = bot
                .send_message(msg.chat.id, "⚠️ This proposal has already been processed.")
                .await;
            Ok(())
        }
        Err(e) => {
            tracing::error!(moderator = moderator.0, error = %e, "rejection completion failed");
            let _ = bot
                .send_message(msg.chat.id, "❌ Could not record the rejection. Please try again.")
                .await;
            Ok(())
        }
    }
}
