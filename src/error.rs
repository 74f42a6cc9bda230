use thiserror::Error;

/// Errors raised by a collection port while reading or writing the blob.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("collection lock poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by [`PlayerStore`](crate::PlayerStore) operations.
///
/// A missing player is never an error: lookups return `Option` and
/// deletes return `bool`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("player store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("player storage unavailable: {0}")]
    Unavailable(#[from] PortError),

    #[error("failed to encode player collection: {0}")]
    Encode(String),

    #[error("invalid player record: {0}")]
    Invalid(String),

    #[error("no player ids left to issue")]
    IdsExhausted,
}

pub type Result<T> = std::result::Result<T, StoreError>;
