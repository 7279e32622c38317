use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    config::Config,
    domain::{ChatId, MessageId, MessageRef, ProposalId, UserId},
    errors::Error,
    messaging::port::MessagingPort,
    notify::Notifier,
    proposal::{Proposal, ProposalStatus},
    store::{ProposalBook, ProposalStore},
    Result,
};

/// Declared image attachment of a submission. Only the gateway file id and
/// the declared size travel through the relay; bytes stay on the gateway.
#[derive(Clone, Debug)]
pub struct SubmissionPhoto {
    pub file_id: String,
    pub file_size: Option<u64>,
}

#[derive(Default)]
struct ModerationState {
    proposals: ProposalBook,
    /// Transient side-mapping: this moderator's next free-text message is the
    /// rejection reason for this proposal. Keyed per moderator so concurrent
    /// rejections don't interfere. Never persisted.
    awaiting_reason: HashMap<UserId, ProposalId>,
}

/// The proposal lifecycle state machine with injected storage and gateway.
///
/// All shared state lives behind one async mutex, so every check-then-set on
/// a proposal (status check, mutation, save) is a single critical section;
/// racing moderator actions observe `AlreadyResolved` instead of double
/// resolving. The channel publish for an accept happens inside that section,
/// before the commit, which gives exactly one publish per proposal.
pub struct ModerationService {
    max_image_bytes: u64,
    page_char_limit: usize,
    moderators: Vec<i64>,
    store: ProposalStore,
    notifier: Notifier,
    state: Mutex<ModerationState>,
}

impl ModerationService {
    pub fn new(cfg: &Config, store: ProposalStore, messenger: Arc<dyn MessagingPort>) -> Self {
        let proposals = store.load();
        tracing::info!(count = proposals.len(), "proposal store loaded");

        Self {
            max_image_bytes: cfg.max_image_bytes,
            page_char_limit: cfg.page_char_limit,
            moderators: cfg.moderator_ids.clone(),
            store,
            notifier: Notifier::new(messenger, cfg.moderator_ids.clone(), ChatId(cfg.channel_id)),
            state: Mutex::new(ModerationState {
                proposals,
                awaiting_reason: HashMap::new(),
            }),
        }
    }

    /// Create a new pending proposal and fan out the review prompts.
    ///
    /// Validation failures (empty submission, oversized image) happen before
    /// anything is persisted or sent. Durability precedes notification: if
    /// the save fails, nobody is told about a proposal that doesn't exist.
    pub async fn submit(
        &self,
        sender: ChatId,
        origin: MessageId,
        text: Option<String>,
        photo: Option<SubmissionPhoto>,
    ) -> Result<Proposal> {
        if let Some(photo) = &photo {
            if photo.file_size.unwrap_or(0) > self.max_image_bytes {
                return Err(Error::Validation(format!(
                    "image exceeds the maximum size of {} bytes",
                    self.max_image_bytes
                )));
            }
        }

        let id = ProposalId::new(sender, origin);
        let proposal = Proposal::new(id, text, photo.map(|p| p.file_id))?;

        {
            let mut st = self.state.lock().await;
            // Same-id resubmission (gateway redelivery) may overwrite only
            // while the stored record is still pending.
            let previous = st.proposals.get(&id).cloned();
            if let Some(existing) = &previous {
                if !existing.is_pending() {
                    return Err(Error::AlreadyResolved(id));
                }
            }

            st.proposals.insert(proposal.clone());
            if let Err(e) = self.store.save(&st.proposals) {
                match previous {
                    Some(prev) => st.proposals.insert(prev),
                    None => {
                        st.proposals.remove(&id);
                    }
                }
                return Err(e);
            }
        }

        tracing::info!(proposal = %id, "proposal submitted");
        self.notifier.announce_submission(&proposal).await;
        Ok(proposal)
    }

    /// Accept a pending proposal: publish to the channel, then commit.
    ///
    /// A failed publish leaves the proposal pending and retriable; a failed
    /// save rolls the in-memory record back so a retry re-publishes rather
    /// than reporting success for a transition that was never durable.
    pub async fn accept(
        &self,
        id: ProposalId,
        moderator: UserId,
        prompt: Option<MessageRef>,
    ) -> Result<Proposal> {
        let accepted = {
            let mut st = self.state.lock().await;

            {
                let proposal = st.proposals.get(&id).ok_or(Error::NotFound(id))?;
                if !proposal.is_pending() {
                    return Err(Error::AlreadyResolved(id));
                }
                self.notifier.publish(proposal).await?;
            }

            let st = &mut *st;
            let Some(proposal) = st.proposals.get_mut(&id) else {
                return Err(Error::NotFound(id));
            };
            let before = proposal.clone();
            proposal.accept()?;
            let after = proposal.clone();

            if let Err(e) = self.store.save(&st.proposals) {
                // The channel post already went out. Rolling back to pending
                // keeps the accept retriable, at the cost of a second post if
                // a moderator retries. Pending on disk is the source of truth.
                if let Some(slot) = st.proposals.get_mut(&id) {
                    *slot = before;
                }
                return Err(e);
            }
            after
        };

        tracing::info!(proposal = %id, moderator = moderator.0, "proposal accepted");
        self.notifier.notify_accepted(&accepted, prompt).await;
        Ok(accepted)
    }

    /// Start a rejection: record that this moderator's next free-text message
    /// is the reason. The proposal itself is not mutated yet.
    pub async fn begin_reject(
        &self,
        id: ProposalId,
        moderator: UserId,
        prompt: Option<MessageRef>,
    ) -> Result<()> {
        let proposal = {
            let mut st = self.state.lock().await;
            let st = &mut *st;
            let proposal = st.proposals.get(&id).ok_or(Error::NotFound(id))?;
            if !proposal.is_pending() {
                return Err(Error::AlreadyResolved(id));
            }
            let proposal = proposal.clone();
            st.awaiting_reason.insert(moderator, id);
            proposal
        };

        tracing::info!(proposal = %id, moderator = moderator.0, "awaiting rejection reason");
        self.notifier.request_reason(moderator, prompt, &proposal).await;
        Ok(())
    }

    /// Whether this moderator's next message should be consumed as a reason.
    pub async fn awaiting_reason_for(&self, moderator: UserId) -> Option<ProposalId> {
        self.state
            .lock()
            .await
            .awaiting_reason
            .get(&moderator)
            .copied()
    }

    /// Consume a moderator's free-text message as the rejection reason.
    ///
    /// `Ok(None)` means the moderator has no open rejection, so the message
    /// was not consumed and normal classification applies. An empty reason
    /// keeps the side-entry and re-issues the prompt; a proposal resolved in
    /// the meantime clears the entry and reports `AlreadyResolved`.
    pub async fn complete_reject(
        &self,
        moderator: UserId,
        reason: &str,
    ) -> Result<Option<Proposal>> {
        let rejected = {
            let mut guard = self.state.lock().await;

            let Some(&id) = guard.awaiting_reason.get(&moderator) else {
                return Ok(None);
            };

            if reason.trim().is_empty() {
                drop(guard);
                self.notifier.reissue_reason_prompt(moderator).await;
                return Err(Error::EmptyReason);
            }

            let st = &mut *guard;

            let Some(proposal) = st.proposals.get_mut(&id) else {
                st.awaiting_reason.remove(&moderator);
                return Err(Error::NotFound(id));
            };

            let before = proposal.clone();
            if let Err(e) = proposal.reject(reason.trim().to_string()) {
                st.awaiting_reason.remove(&moderator);
                return Err(e);
            }
            let after = proposal.clone();

            if let Err(e) = self.store.save(&st.proposals) {
                if let Some(slot) = st.proposals.get_mut(&id) {
                    *slot = before;
                }
                return Err(e);
            }

            st.awaiting_reason.remove(&moderator);
            after
        };

        tracing::info!(proposal = %rejected.id, moderator = moderator.0, "proposal rejected");
        self.notifier.notify_rejected(&rejected, moderator).await;
        Ok(Some(rejected))
    }

    /// Audit listing gate: only moderators get pages back. `None` means the
    /// request is dropped without any response (silent deny).
    pub async fn list_pages_for(&self, requester: UserId) -> Option<Vec<String>> {
        if !self.moderators.contains(&requester.0) {
            return None;
        }
        Some(self.list_pages().await)
    }

    /// Audit listing, newest first, chunked at the per-page output cap.
    /// Callers space successive pages with the configured delay.
    async fn list_pages(&self) -> Vec<String> {
        let st = self.state.lock().await;
        let entries = st.proposals.newest_first();
        if entries.is_empty() {
            return vec!["📝 No proposals yet.".to_string()];
        }

        let mut pages = Vec::new();
        let mut page = String::from("📋 Proposals:\n\n");

        for p in entries {
            let status = match p.status {
                ProposalStatus::Pending => "⏳ pending",
                ProposalStatus::Accepted => "✅ accepted",
                ProposalStatus::Rejected => "❌ rejected",
            };
            let mut entry = format!(
                "ID: {}\nStatus: {}\nDate: {}\nText: {}",
                p.id,
                status,
                p.timestamp,
                p.text.as_deref().unwrap_or("(image)")
            );
            if let Some(reason) = &p.rejection_reason {
                entry.push_str(&format!("\nReason: {reason}"));
            }
            entry.push_str("\n\n");

            if page.len() + entry.len() > self.page_char_limit {
                pages.push(page);
                page = entry;
            } else {
                page.push_str(&entry);
            }
        }
        pages.push(page);
        pages
    }
}
