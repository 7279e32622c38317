use std::sync::Arc;

use crate::{
    domain::{CallbackAction, ChatId, MessageRef, ProposalId, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard},
    },
    proposal::Proposal,
    Result,
};

/// Decides which parties hear about a lifecycle outcome and sends exactly
/// those messages through the gateway port.
///
/// The channel publish is the only send whose failure is load-bearing (it
/// vetoes the accept transition); everything after a commit is best-effort
/// and merely logged.
pub struct Notifier {
    messenger: Arc<dyn MessagingPort>,
    moderators: Vec<i64>,
    channel: ChatId,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn MessagingPort>, moderators: Vec<i64>, channel: ChatId) -> Self {
        Self {
            messenger,
            moderators,
            channel,
        }
    }

    fn action_keyboard(id: ProposalId) -> InlineKeyboard {
        InlineKeyboard::new(vec![
            InlineButton {
                label: "✅ Accept".to_string(),
                callback_data: CallbackAction::Accept.encode(id),
            },
            InlineButton {
                label: "❌ Reject".to_string(),
                callback_data: CallbackAction::Reject.encode(id),
            },
        ])
    }

    /// New submission: one action prompt per moderator, one confirmation to
    /// the submitter. The proposal is already durable at this point, so
    /// delivery failures are logged, not propagated.
    pub async fn announce_submission(&self, proposal: &Proposal) {
        let body = proposal.text.as_deref().unwrap_or("Image without caption");
        let prompt = format!("📫 New proposal\n\n{body}");
        let keyboard = Self::action_keyboard(proposal.id);

        for &moderator in &self.moderators {
            let chat = ChatId(moderator);
            let sent = match &proposal.file_id {
                Some(file_id) => {
                    self.messenger
                        .send_photo_with_keyboard(chat, file_id, &prompt, keyboard.clone())
                        .await
                }
                None => {
                    self.messenger
                        .send_with_keyboard(chat, &prompt, keyboard.clone())
                        .await
                }
            };
            if let Err(e) = sent {
                tracing::warn!(moderator, proposal = %proposal.id, error = %e,
                    "failed to deliver moderation prompt");
            }
        }

        if let Err(e) = self
            .messenger
            .send_text(proposal.sender_id, "📤 Your proposal has been sent for review!")
            .await
        {
            tracing::warn!(proposal = %proposal.id, error = %e,
                "failed to confirm submission to sender");
        }
    }

    /// Publish an accepted proposal to the public channel, mirroring the
    /// submission's shape (photo-with-caption or plain text).
    pub async fn publish(&self, proposal: &Proposal) -> Result<()> {
        let res = match &proposal.file_id {
            Some(file_id) => {
                self.messenger
                    .send_photo(self.channel, file_id, proposal.text.as_deref())
                    .await
            }
            None => {
                let text = proposal.text.as_deref().unwrap_or_default();
                self.messenger.send_text(self.channel, text).await
            }
        };

        res.map(|_| ()).map_err(|e| Error::Publish(e.to_string()))
    }

    /// Post-accept notices: success to the submitter, and the moderator's
    /// original prompt edited to its resolved form (controls removed).
    pub async fn notify_accepted(&self, proposal: &Proposal, prompt: Option<MessageRef>) {
        if let Err(e) = self
            .messenger
            .send_text(
                proposal.sender_id,
                "🎉 Your proposal was accepted and published!",
            )
            .await
        {
            tracing::warn!(proposal = %proposal.id, error = %e,
                "failed to notify sender of acceptance");
        }

        if let Some(prompt) = prompt {
            self.resolve_prompt(proposal, prompt, "✅ Proposal published.")
                .await;
        }
    }

    /// Ask the invoking moderator for a free-text reason and mark the
    /// original prompt as waiting, with controls removed.
    pub async fn request_reason(&self, moderator: UserId, prompt: Option<MessageRef>, proposal: &Proposal) {
        if let Err(e) = self
            .messenger
            .send_reply_prompt(ChatId(moderator.0), "📝 Reply with the rejection reason:")
            .await
        {
            tracing::warn!(moderator = moderator.0, error = %e,
                "failed to prompt for rejection reason");
        }

        if let Some(prompt) = prompt {
            self.resolve_prompt(proposal, prompt, "⏳ Awaiting rejection reason...")
                .await;
        }
    }

    /// Reason was empty; ask again.
    pub async fn reissue_reason_prompt(&self, moderator: UserId) {
        if let Err(e) = self
            .messenger
            .send_reply_prompt(
                ChatId(moderator.0),
                "📝 The reason can't be empty. Reply with the rejection reason:",
            )
            .await
        {
            tracing::warn!(moderator = moderator.0, error = %e,
                "failed to re-issue rejection reason prompt");
        }
    }

    /// Post-reject notices: the reason to the submitter, a confirmation to
    /// the moderator who supplied it.
    pub async fn notify_rejected(&self, proposal: &Proposal, moderator: UserId) {
        let reason = proposal.rejection_reason.as_deref().unwrap_or_default();
        if let Err(e) = self
            .messenger
            .send_text(
                proposal.sender_id,
                &format!("❌ Your proposal was rejected.\nReason: {reason}"),
            )
            .await
        {
            tracing::warn!(proposal = %proposal.id, error = %e,
                "failed to notify sender of rejection");
        }

        if let Err(e) = self
            .messenger
            .send_text(ChatId(moderator.0), "✅ Proposal rejected.")
            .await
        {
            tracing::warn!(moderator = moderator.0, error = %e,
                "failed to confirm rejection to moderator");
        }
    }

    /// Edit a moderator prompt into its terminal text. Photo prompts carry
    /// the body as a caption, text prompts as message text.
    async fn resolve_prompt(&self, proposal: &Proposal, prompt: MessageRef, text: &str) {
        let res = if proposal.has_photo() {
            self.messenger.edit_caption(prompt, text).await
        } else {
            self.messenger.edit_text(prompt, text).await
        };
        if let Err(e) = res {
            tracing::warn!(proposal = %proposal.id, error = %e,
                "failed to edit moderation prompt");
        }
    }
}
