//! Telegram update handlers.
//!
//! Each handler classifies the update, calls into the moderation service,
//! and reports the outcome through the bot. Errors are caught and logged at
//! this edge; one failed update never takes down the dispatcher.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use modbot_core::domain::UserId;

use crate::router::AppState;

mod callback;
mod commands;
mod photo;
mod submit;
mod text;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    if let Err(e) = callback::handle_callback(bot, q, state).await {
        tracing::error!(error = %e, "callback handler failed");
    }
    Ok(())
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Err(e) = route_message(bot, msg, state).await {
        tracing::error!(error = %e, "message handler failed");
    }
    Ok(())
}

async fn route_message(bot: Bot, msg: Message, state: Arc<AppState>) -> anyhow::Result<()> {
    // Service messages / channel posts carry no sender; nothing to moderate.
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = UserId(user.id.0 as i64);

    if let Some(text) = msg.text() {
        // An open rejection prompt always wins: this moderator's next
        // free-text message is the reason, even if it looks like a command.
        if state.cfg.is_moderator(user_id)
            && state.service.awaiting_reason_for(user_id).await.is_some()
        {
            return text::handle_rejection_reason(bot, &msg, state, user_id, text).await;
        }

        if text.starts_with('/') {
            return commands::handle_command(bot, msg, state).await;
        }
        return text::handle_text(bot, msg, state).await;
    }

    if msg.photo().is_some() {
        return photo::handle_photo(bot, msg, state).await;
    }

    // Voice, stickers, documents: not moderatable content here.
    Ok(())
}
