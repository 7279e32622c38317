use std::sync::Arc;

use teloxide::prelude::*;

use modbot_core::{
    domain::{CallbackAction, ChatId, MessageId, MessageRef, UserId},
    Error, Result,
};

use crate::router::AppState;

/// Reply shown to the acting moderator for each action outcome. `None`
/// means the callback ack is the only feedback needed.
fn action_reply(outcome: &Result<()>) -> Option<&'static str> {
    match outcome {
        Ok(()) => None,
        Err(Error::NotFound(_)) | Err(Error::AlreadyResolved(_)) => {
            Some("⚠️ This proposal has already been processed.")
        }
        Err(Error::Publish(_)) => {
            Some("⚠️ Publishing failed. Check the channel configuration and press accept again.")
        }
        Err(_) => Some("❌ The action failed. Please try again."),
    }
}

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> anyhow::Result<()> {
    let data = q.data.clone().unwrap_or_default();
    let moderator = UserId(q.from.id.0 as i64);

    // Always answer, even for no-ops, so the gateway clears its spinner.
    if let Err(e) = state.messenger.answer_callback(&q.id, None).await {
        tracing::warn!(error = %e, "failed to answer callback");
    }

    let Some((action, id)) = CallbackAction::decode(&data) else {
        tracing::warn!(data = %data, "malformed callback payload; ignored");
        return Ok(());
    };

    // Action buttons are only ever sent to moderators; anything else is a
    // stale forward and gets dropped.
    if !state.cfg.is_moderator(moderator) {
        return Ok(());
    }

    let prompt = q.message.as_ref().map(|m| MessageRef {
        chat_id: ChatId(m.chat.id.0),
        message_id: MessageId(m.id.0),
    });

    let outcome = match action {
        CallbackAction::Accept => state
            .service
            .accept(id, moderator, prompt)
            .await
            .map(|_| ()),
        CallbackAction::Reject => state.service.begin_reject(id, moderator, prompt).await,
    };

    match &outcome {
        Ok(()) | Err(Error::NotFound(_)) | Err(Error::AlreadyResolved(_)) => {}
        Err(Error::Publish(e)) => {
            tracing::warn!(proposal = %id, error = %e, "channel publish failed");
        }
        Err(e) => {
            tracing::error!(proposal = %id, error = %e, "moderator action failed");
        }
    }

    if let Some(text) = action_reply(&outcome) {
        let _ = bot
            .send_message(teloxide::types::ChatId(moderator.0), text)
            .await;
    }

    Ok(())
}
