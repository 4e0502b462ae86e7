//! Interface Unit and Control Unit of the door lock.
//!
//! Each unit is a single cooperative task built from:
//!
//! - a [`StateMachine`] holding its validated, observable session state
//! - one `TimerSlot` driving the door sequence and the lockout
//! - its end of a `Link` to the other unit
//! - its devices, passed in as generic parameters
//!
//! # Running Both Units
//!
//! ```
//! use doorlock_core::{DoorlockConfig, SessionState};
//! use doorlock_emulator::{ControlUnit, InterfaceUnit};
//! use doorlock_hardware::mock::{MemoryStore, MockAlarm, MockKeypad, MockMotor, VirtualDisplay};
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let config = DoorlockConfig::default();
//! let (iu_io, cu_io) = tokio::io::duplex(64);
//!
//! let (keypad, keys) = MockKeypad::new();
//! let (display, _screen) = VirtualDisplay::new();
//! let (motor, _motor) = MockMotor::new();
//! let (alarm, _alarm) = MockAlarm::new();
//! let (store, _cells) = MemoryStore::new(5);
//!
//! let mut iu = InterfaceUnit::new(iu_io, keypad, display, config.clone());
//! let mut cu = ControlUnit::new(cu_io, motor, alarm, store, config);
//! let mut enrolled = cu.subscribe();
//!
//! keys.send_keys("1234\n1234\n").await.unwrap();
//! tokio::select! {
//!     _ = iu.run() => unreachable!(),
//!     _ = cu.run() => unreachable!(),
//!     _ = enrolled.wait_for(|s| *s == SessionState::Authenticated) => {}
//! }
//! # }
//! ```

pub mod control;
pub mod error;
pub mod interface;
pub mod lockout;
mod session;
pub mod state_machine;

pub use control::ControlUnit;
pub use error::{Result, UnitError};
pub use interface::InterfaceUnit;
pub use lockout::{AttemptOutcome, LockoutCountdown, RetryCounter};
pub use state_machine::{StateMachine, StateTransition};
