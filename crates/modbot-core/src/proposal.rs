use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{ChatId, ProposalId},
    errors::Error,
    Result,
};

/// Lifecycle status of a proposal. Transitions are one-way:
/// `Pending -> Accepted` or `Pending -> Rejected`, never back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A single user submission awaiting moderation. The sole persisted entity;
/// kept forever as an audit trail, never deleted.
///
/// Field names match the persisted JSON document (camelCase, optional fields
/// absent when unset) so an existing store file reloads verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub sender_id: ChatId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub status: ProposalStatus,
    /// Creation instant, RFC3339.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Proposal {
    /// Construct a new pending proposal. Fails if the submission carries
    /// neither a body nor an image: there is nothing to moderate.
    pub fn new(id: ProposalId, text: Option<String>, file_id: Option<String>) -> Result<Self> {
        let text = text.filter(|t| !t.trim().is_empty());
        if text.is_none() && file_id.is_none() {
            return Err(Error::Validation(
                "submission needs a text body or an image".to_string(),
            ));
        }

        Ok(Self {
            id,
            sender_id: id.sender,
            text,
            file_id,
            status: ProposalStatus::Pending,
            timestamp: Utc::now().to_rfc3339(),
            accepted_at: None,
            rejected_at: None,
            rejection_reason: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending
    }

    pub fn has_photo(&self) -> bool {
        self.file_id.is_some()
    }

    /// `Pending -> Accepted`, stamping `acceptedAt` exactly once.
    pub fn accept(&mut self) -> Result<()> {
        if !self.is_pending() {
            return Err(Error::AlreadyResolved(self.id));
        }
        self.status = ProposalStatus::Accepted;
        self.accepted_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }

    /// `Pending -> Rejected`, stamping `rejectedAt` and the reason exactly once.
    pub fn reject(&mut self, reason: String) -> Result<()> {
        if !self.is_pending() {
            return Err(Error::AlreadyResolved(self.id));
        }
        if reason.trim().is_empty() {
            return Err(Error::EmptyReason);
        }
        self.status = ProposalStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.rejected_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageId;

    fn id() -> ProposalId {
        ProposalId::new(ChatId(100), MessageId(55))
    }

    #[test]
    fn new_proposal_is_pending_with_creation_timestamp() {
        let p = Proposal::new(id(), Some("Hello".into()), None).unwrap();
        assert_eq!(p.status, ProposalStatus::Pending);
        assert_eq!(p.sender_id, ChatId(100));
        assert!(p.accepted_at.is_none());
        assert!(p.rejected_at.is_none());
        assert!(!p.timestamp.is_empty());
    }

    #[test]
    fn empty_submission_is_refused() {
        assert!(matches!(
            Proposal::new(id(), None, None),
            Err(Error::Validation(_))
        ));
        // Whitespace-only text with no image is still empty.
        assert!(matches!(
            Proposal::new(id(), Some("  ".into()), None),
            Err(Error::Validation(_))
        ));
        // A bare image is a valid submission.
        assert!(Proposal::new(id(), None, Some("file-1".into())).is_ok());
    }

    #[test]
    fn accept_is_one_way() {
        let mut p = Proposal::new(id(), Some("Hello".into()), None).unwrap();
        p.accept().unwrap();
        assert_eq!(p.status, ProposalStatus::Accepted);
        assert!(p.accepted_at.is_some());

        assert!(matches!(p.accept(), Err(Error::AlreadyResolved(_))));
        assert!(matches!(
            p.reject("late".into()),
            Err(Error::AlreadyResolved(_))
        ));
    }

    #[test]
    fn reject_requires_a_reason() {
        let mut p = Proposal::new(id(), Some("Hello".into()), None).unwrap();
        assert!(matches!(p.reject("  ".into()), Err(Error::EmptyReason)));
        assert!(p.is_pending());

        p.reject("too short".into()).unwrap();
        assert_eq!(p.status, ProposalStatus::Rejected);
        assert_eq!(p.rejection_reason.as_deref(), Some("too short"));
        assert!(p.rejected_at.is_some());
    }

    #[test]
    fn optional_fields_are_absent_when_unset() {
        let p = Proposal::new(id(), Some("Hello".into()), None).unwrap();
        let json = serde_json::to_value(&p).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("fileId"));
        assert!(!obj.contains_key("acceptedAt"));
        assert!(!obj.contains_key("rejectedAt"));
        assert!(!obj.contains_key("rejectionReason"));
        assert_eq!(obj["id"], "100_55");
        assert_eq!(obj["senderId"], 100);
        assert_eq!(obj["status"], "pending");
    }
}
