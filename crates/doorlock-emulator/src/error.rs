use doorlock_hardware::HardwareError;
use thiserror::Error;

/// Error ending a unit's main loop.
#[derive(Error, Debug)]
pub enum UnitError {
    /// Protocol, session or store-content failure.
    #[error(transparent)]
    Core(#[from] doorlock_core::Error),

    /// Peripheral failure.
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

pub type Result<T> = std::result::Result<T, UnitError>;
