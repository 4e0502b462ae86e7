//! Protocol and timing constants shared by both units.
//!
//! The link between the Interface Unit and the Control Unit carries a
//! fixed alphabet of single bytes plus `#`-terminated password strings:
//!
//! ```text
//! IU -> CU   1234#        password (candidate, confirmation or attempt)
//! CU -> IU   c | w | r    confirm, wrong, repeat
//! IU -> CU   + | -        open door, change password
//! ```
//!
//! # Usage
//!
//! ```
//! use doorlock_core::constants::*;
//!
//! assert_eq!(BYTE_CONFIRM, b'c');
//! assert_eq!(PASSWORD_TERMINATOR, b'#');
//! assert_eq!(MAX_PASSWORD_LENGTH, 5);
//! ```

// ============================================================================
// Wire Alphabet
// ============================================================================

/// Reply: passwords match / attempt accepted.
pub const BYTE_CONFIRM: u8 = b'c';

/// Reply: enrollment mismatch, or third failed attempt (lockout).
pub const BYTE_WRONG: u8 = b'w';

/// Reply: failed attempt, attempts remain.
pub const BYTE_REPEAT: u8 = b'r';

/// Action selector: open the door.
pub const BYTE_OPEN_DOOR: u8 = b'+';

/// Action selector: change the password.
pub const BYTE_CHANGE_PASSWORD: u8 = b'-';

/// Terminates a password on the wire and marks unused store slots.
pub const PASSWORD_TERMINATOR: u8 = b'#';

// ============================================================================
// Password Limits
// ============================================================================

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 1;

/// Maximum password length in characters.
///
/// Also the number of positions walked by the countdown comparison.
pub const MAX_PASSWORD_LENGTH: usize = 5;

/// Largest password frame on the wire (characters plus terminator).
pub const MAX_PASSWORD_FRAME: usize = MAX_PASSWORD_LENGTH + 1;

// ============================================================================
// Persistent Store Layout
// ============================================================================

/// First store index holding the password.
pub const PASSWORD_STORE_BASE: u16 = 0;

/// Number of store slots reserved for the password (indices 0..=4).
pub const PASSWORD_STORE_SLOTS: u16 = MAX_PASSWORD_LENGTH as u16;

/// Content of a never-written EEPROM cell.
pub const ERASED_BYTE: u8 = 0xFF;

// ============================================================================
// Policy Defaults
// ============================================================================

/// Consecutive failed verifications that trigger a lockout.
pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;

/// Motor forward dwell while unlocking (milliseconds).
pub const DEFAULT_UNLOCK_DWELL_MS: u64 = 15_000;

/// Dwell with the door held open (milliseconds).
pub const DEFAULT_OPEN_DWELL_MS: u64 = 3_000;

/// Motor reverse dwell while locking (milliseconds).
pub const DEFAULT_LOCK_DWELL_MS: u64 = 15_000;

/// Total lockout cooldown (milliseconds).
pub const DEFAULT_LOCKOUT_MS: u64 = 60_000;

/// Periodic timer firings that make up one lockout.
///
/// The hardware counter cannot span a full minute, so the cooldown is
/// counted as this many shorter periods.
pub const DEFAULT_LOCKOUT_TICKS: u32 = 8;

/// Settle delay after each persistent store write (milliseconds).
pub const DEFAULT_STORE_SETTLE_MS: u64 = 10;
