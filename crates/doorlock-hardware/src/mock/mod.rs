//! Mock device implementations for testing and development.
//!
//! Every mock comes as a `(device, handle)` pair: the device is moved into a
//! unit, the handle stays with the test (or the simulator front-end) to feed
//! input or inspect what the unit did.

pub mod actuator;
pub mod display;
pub mod keypad;
pub mod store;

use std::sync::{Mutex, MutexGuard, PoisonError};

// Re-export commonly used types
pub use actuator::{AlarmHandle, MockAlarm, MockMotor, MotorCommand, MotorHandle};
pub use display::{DisplayHandle, VirtualDisplay};
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use store::{MemoryStore, MemoryStoreHandle};

// A panicking test thread must not take the other side of the handle down
// with it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
