//! Error types shared across cloze crates.
//!
//! `ServiceError` lives here rather than in the client crate so the session
//! actor can downcast fetch failures and report whether a retry makes sense.

use thiserror::Error;

/// Errors that can occur when talking to the exercise service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The service rejected the request (4xx other than 429).
    #[error("request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service returned a server error.
    #[error("service error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No cards matched the request.
    #[error("no cards available for category '{category}' at difficulty '{difficulty}'")]
    NoCards { category: String, difficulty: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ServiceError {
    /// Returns `true` if repeating the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ServiceError::Rejected { .. }
                | ServiceError::MalformedResponse(_)
                | ServiceError::NoCards { .. }
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ServiceError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Errors surfaced to session observers. None of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The fetch failed or returned nothing usable.
    #[error("failed to load cards: {message}")]
    FetchFailure { message: String, retryable: bool },

    /// A card in the batch is inconsistent; the whole batch was rejected.
    #[error("card {card_index} is malformed: {reason}")]
    MalformedCard { card_index: usize, reason: String },
}

impl SessionError {
    /// Build a fetch failure from a service error chain.
    pub fn from_fetch_error(err: &anyhow::Error) -> Self {
        let retryable = err
            .downcast_ref::<ServiceError>()
            .map(|e| !e.is_permanent())
            .unwrap_or(true);
        SessionError::FetchFailure {
            message: format!("{err:#}"),
            retryable,
        }
    }

    /// Whether the user can expect a `reload` to help.
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::FetchFailure { retryable, .. } => *retryable,
            // A fresh batch may well be well-formed.
            SessionError::MalformedCard { .. } => true,
        }
    }
}

/// Why a command left the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidCommand {
    #[error("answers can only be edited while answering")]
    NotAnswering,

    #[error("card {card_index} is out of range ({len} cards)")]
    CardOutOfRange { card_index: usize, len: usize },

    #[error("slot {slot_index} is out of range ({slots} blanks)")]
    SlotOutOfRange { slot_index: usize, slots: usize },

    #[error("no cards loaded")]
    NoCards,

    #[error("already at the edge of the deck")]
    AtDeckEdge,

    #[error("initial load already issued")]
    AlreadyLoaded,

    #[error("filters already set to those values")]
    FiltersUnchanged,

    #[error("fetch result superseded by a newer request")]
    StaleFetch,
}
