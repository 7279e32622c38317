use crate::domain::ProposalId;

/// Core error type for the moderation relay.
///
/// Each lifecycle operation reports its failure mode explicitly so the
/// dispatch edge can answer the right party (submitter vs moderator) instead
/// of guessing from a stringly error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid submission: {0}")]
    Validation(String),

    #[error("unknown proposal {0}")]
    NotFound(ProposalId),

    #[error("proposal {0} is already resolved")]
    AlreadyResolved(ProposalId),

    #[error("rejection reason must not be empty")]
    EmptyReason,

    #[error("channel publish failed: {0}")]
    Publish(String),

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
