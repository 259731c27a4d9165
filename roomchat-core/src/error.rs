/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid room code format: {0:?} (expected 6 characters A-Z or 0-9)")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
