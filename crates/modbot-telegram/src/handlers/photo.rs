use std::sync::Arc;

use teloxide::prelude::*;

use modbot_core::service::SubmissionPhoto;

use crate::router::AppState;

use super::submit::run_submission;

pub async fn handle_photo(bot: Bot, msg: Message, state: Arc<AppState>) -> anyhow::Result<()> {
    let Some(photos) = msg.photo() else {
        return Ok(());
    };
    // Telegram sends several renditions; the last is the full-size one the
    // size limit applies to.
    let Some(best) = photos.last() else {
        return Ok(());
    };

    let photo = SubmissionPhoto {
        file_id: best.file.id.clone(),
        file_size: Some(u64::from(best.file.size)),
    };
    let caption = msg.caption().map(|s| s.to_string());

    run_submission(bot, &msg, state, caption, Some(photo)).await
}
