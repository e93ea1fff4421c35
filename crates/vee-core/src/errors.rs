/// Core error type for the bot.
///
/// Adapter crates should map their specific errors into this type so state
/// operations and the persistence loop can report failures consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("community state has not been registered")]
    StateMissing,

    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("resolution failed: {0}")]
    Resolution(String),

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
