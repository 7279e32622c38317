use serde::{Deserialize, Serialize};

/// Gateway user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Gateway chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// Gateway message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i32);

/// A stable reference to a gateway message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Correlation key for a proposal: the submitter's chat plus the message that
/// started the submission. Deterministic, so gateway retries and callback
/// payloads resolve to the same proposal.
///
/// The `"<sender>_<origin>"` wire form exists only at the edges (persisted
/// object keys, button payloads); everything internal addresses proposals by
/// this struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProposalId {
    pub sender: ChatId,
    pub origin: MessageId,
}

impl ProposalId {
    pub fn new(sender: ChatId, origin: MessageId) -> Self {
        Self { sender, origin }
    }

    pub fn encode(&self) -> String {
        format!("{}_{}", self.sender.0, self.origin.0)
    }

    pub fn decode(s: &str) -> Option<Self> {
        let (sender, origin) = s.split_once('_')?;
        Some(Self {
            sender: ChatId(sender.parse().ok()?),
            origin: MessageId(origin.parse().ok()?),
        })
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl Serialize for ProposalId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for ProposalId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid proposal id: {s}")))
    }
}

/// Moderator decision carried in an inline-button payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    Accept,
    Reject,
}

impl CallbackAction {
    /// Button payload form: `accept_<sender>_<origin>` / `reject_<sender>_<origin>`.
    pub fn encode(&self, id: ProposalId) -> String {
        let tag = match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        };
        format!("{tag}_{}", id.encode())
    }

    /// Stale or malformed payloads decode to `None`; callers answer the
    /// callback and move on rather than crash.
    pub fn decode(data: &str) -> Option<(Self, ProposalId)> {
        let (tag, rest) = data.split_once('_')?;
        let action = match tag {
            "accept" => Self::Accept,
            "reject" => Self::Reject,
            _ => return None,
        };
        Some((action, ProposalId::decode(rest)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_id_round_trips_through_wire_form() {
        let id = ProposalId::new(ChatId(100), MessageId(55));
        assert_eq!(id.encode(), "100_55");
        assert_eq!(ProposalId::decode("100_55"), Some(id));
    }

    #[test]
    fn proposal_id_supports_negative_chat_ids() {
        // Telegram group/channel chats are negative.
        let id = ProposalId::new(ChatId(-1001234), MessageId(7));
        assert_eq!(ProposalId::decode(&id.encode()), Some(id));
    }

    #[test]
    fn proposal_id_rejects_malformed_input() {
        assert_eq!(ProposalId::decode(""), None);
        assert_eq!(ProposalId::decode("100"), None);
        assert_eq!(ProposalId::decode("abc_55"), None);
        assert_eq!(ProposalId::decode("100_xyz"), None);
    }

    #[test]
    fn distinct_origins_yield_distinct_ids() {
        let a = ProposalId::new(ChatId(100), MessageId(55));
        let b = ProposalId::new(ChatId(100), MessageId(56));
        assert_ne!(a, b);
        assert_ne!(a.encode(), b.encode());
    }

    #[test]
    fn callback_action_round_trips() {
        let id = ProposalId::new(ChatId(100), MessageId(55));
        assert_eq!(CallbackAction::Accept.encode(id), "accept_100_55");
        assert_eq!(
            CallbackAction::decode("reject_100_55"),
            Some((CallbackAction::Reject, id))
        );
    }

    #[test]
    fn callback_action_rejects_unknown_tags() {
        assert_eq!(CallbackAction::decode("publish_100_55"), None);
        assert_eq!(CallbackAction::decode("accept_"), None);
        assert_eq!(CallbackAction::decode("garbage"), None);
    }
}
