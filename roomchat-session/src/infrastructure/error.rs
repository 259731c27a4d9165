/// Bus transport errors
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Broadcast primitive unavailable")]
    Unsupported,

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

pub type Result<T> = std::result::Result<T, BusError>;
