use musubi_parse::Cancelled;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MusubiError {
    /// The caller's cancellation token was triggered. Partial results are
    /// discarded.
    #[error("matching cancelled")]
    Cancelled,

    #[error("invalid matcher: {0}")]
    InvalidMatcher(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Cancelled> for MusubiError {
    fn from(_: Cancelled) -> Self {
        MusubiError::Cancelled
    }
}
