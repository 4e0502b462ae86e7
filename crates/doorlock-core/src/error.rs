use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("Invalid password: {reason}")]
    InvalidPassword { reason: String },

    #[error("Protocol desync: expected {expected}, got byte 0x{byte:02x}")]
    ProtocolDesync { expected: String, byte: u8 },

    #[error("Frame too large: {size} bytes (max {max_size})")]
    FrameTooLarge { size: usize, max_size: usize },

    #[error("Link closed by peer")]
    LinkClosed,

    #[error("No reply within {timeout_ms}ms")]
    ReplyTimeout { timeout_ms: u64 },

    // Session errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Storage errors
    #[error("Persistent store corrupt at index {index}: byte 0x{byte:02x}")]
    StoreCorrupt { index: u16, byte: u8 },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
