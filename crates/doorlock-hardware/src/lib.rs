//! Hardware device abstraction layer for the door-lock units.
//!
//! This crate provides trait-based abstractions for the peripherals of the
//! two units, a single-slot timer, and host implementations of every device
//! so the whole system runs and is tested without target hardware.
//!
//! # Design Philosophy
//!
//! - **Async where it blocks**: the keypad and the persistent store use
//!   native `async fn` in traits (Edition 2024 RPITIT). Actuators and the
//!   display complete immediately and stay synchronous.
//! - **Generic, not dynamic**: the async traits are not object-safe; units
//!   take their devices as type parameters.
//! - **Error-aware**: all operations return [`Result<T>`] with a
//!   [`HardwareError`].
//!
//! # Device Traits
//!
//! | Trait | Unit | Operations |
//! |---|---|---|
//! | [`KeypadDevice`] | Interface | `read_input` |
//! | [`LineDisplay`] | Interface | `render_line`, `clear` |
//! | [`Motor`] | Control | `rotate`, `stop` |
//! | [`Alarm`] | Control | `on`, `off` |
//! | [`PersistentStore`] | Control | `write`, `read` |
//!
//! ```no_run
//! use doorlock_hardware::traits::{KeypadDevice, KeypadInput};
//! use doorlock_hardware::Result;
//!
//! async fn read_code<K: KeypadDevice>(keypad: &mut K) -> Result<Vec<u8>> {
//!     let mut code = Vec::new();
//!
//!     loop {
//!         match keypad.read_input().await? {
//!             KeypadInput::Enter => break,
//!             KeypadInput::Clear => code.clear(),
//!             key => code.extend(key.password_byte()),
//!         }
//!     }
//!
//!     Ok(code)
//! }
//! ```
//!
//! # Timer
//!
//! [`TimerSlot`] holds at most one `(deadline, phase)` binding; re-arming
//! replaces it, so a superseded phase is never delivered.
//!
//! # Host Implementations
//!
//! The [`mock`] module provides channel- and log-backed devices, each paired
//! with a handle for driving or inspecting it. [`FileStore`] keeps the
//! persistent store in a file across restarts.

pub mod error;
pub mod file_store;
pub mod mock;
pub mod timer;
pub mod traits;

// Re-export commonly used types
pub use error::{HardwareError, Result};
pub use file_store::FileStore;
pub use timer::TimerSlot;
pub use traits::{Alarm, KeypadDevice, KeypadInput, LineDisplay, Motor, PersistentStore};
