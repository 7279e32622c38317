use std::sync::Arc;

use teloxide::prelude::*;

use modbot_core::{
    domain::{ChatId, MessageId},
    service::SubmissionPhoto,
    Error,
};

use crate::router::AppState;

/// Shared submission path for text and photo messages: run the lifecycle
/// `submit` and translate its outcome for the submitter.
pub async fn run_submission(
    bot: Bot,
    msg: &Message,
    state: Arc<AppState>,
    text: Option<String>,
    photo: Option<SubmissionPhoto>,
) -> anyhow::Result<()> {
    let sender = ChatId(msg.chat.id.0);
    let origin = MessageId(msg.id.0);

    match state.service.submit(sender, origin, text, photo).await {
        // Confirmation to the submitter is the service's job.
        Ok(_) => {}
        Err(Error::Validation(reason)) => {
            let _ = bot.send_message(msg.chat.id, format!("⚠️ {reason}")).await;
        }
        Err(Error::AlreadyResolved(_)) => {
            let _ = bot
                .send_message(msg.chat.id, "⚠️ This submission was already processed.")
                .await;
        }
        Err(e) => {
            tracing::error!(error = %e, "submission failed");
            let _ = bot
                .send_message(
                    msg.chat.id,
                    "❌ Could not record your proposal. Please try again.",
                )
                .await;
        }
    }

    Ok(())
}
