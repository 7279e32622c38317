use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::InlineKeyboard,
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the first implementation; the shape is the fixed capability
/// set the relay needs (send text/photo, edit, ack a callback), so other
/// transports can fit behind the same interface.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Send a photo by gateway file id; bytes never pass through this system.
    async fn send_photo(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: Option<&str>,
    ) -> Result<MessageRef>;

    async fn send_with_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    async fn send_photo_with_keyboard(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    /// Prompt that asks the recipient for a free-text reply (force-reply
    /// markup where the gateway supports it).
    async fn send_reply_prompt(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Replace a message's text and drop any inline controls it carried.
    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()>;

    /// Replace a photo message's caption and drop any inline controls.
    async fn edit_caption(&self, msg: MessageRef, caption: &str) -> Result<()>;

    /// Must be called for every callback, even no-ops, so the gateway clears
    /// its pending-spinner state.
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}
