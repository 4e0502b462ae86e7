//! Error types for hardware operations.
//!
//! Covers the failure modes of the door-lock peripherals: a device that went
//! away, a persistent store that cannot be read or written, and data a device
//! hands back that makes no sense.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Invalid data received from or passed to a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Store index outside the device capacity.
    #[error("Store index {index} out of range (capacity {capacity})")]
    OutOfRange { index: u16, capacity: u16 },

    /// Persistent store read or write failure.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new out of range error.
    pub fn out_of_range(index: u16, capacity: u16) -> Self {
        Self::OutOfRange { index, capacity }
    }

    /// Create a new storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("keypad");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: keypad");
    }

    #[test]
    fn test_timeout_error() {
        let error = HardwareError::timeout(3000);
        assert_eq!(error.to_string(), "Operation timeout after 3000ms");
    }

    #[test]
    fn test_out_of_range_error() {
        let error = HardwareError::out_of_range(9, 5);
        assert_eq!(error.to_string(), "Store index 9 out of range (capacity 5)");
    }

    #[test]
    fn test_storage_error() {
        let error = HardwareError::storage("write failed");
        assert_eq!(error.to_string(), "Storage error: write failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: HardwareError = io.into();
        assert!(matches!(error, HardwareError::Io(_)));
    }
}
