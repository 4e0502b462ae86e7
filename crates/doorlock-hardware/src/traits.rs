//! Hardware device trait definitions.
//!
//! These traits are the contract between the two units and their
//! peripherals: the Interface Unit drives a keypad and a line display, the
//! Control Unit drives a motor, an alarm and a persistent byte store.
//!
//! Devices that block on the outside world (keypad, persistent store) use
//! native `async fn` methods (Edition 2024 RPITIT). Actuators and the display
//! complete immediately and are plain synchronous calls.

#![allow(async_fn_in_trait)]

use crate::error::{HardwareError, Result};
use doorlock_core::MotorDirection;

/// Input from a keypad device.
///
/// Mirrors a 4x4 membrane keypad: ten digits, the two menu keys and the
/// usual control keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeypadInput {
    /// Numeric digit (0-9).
    Digit(u8),

    /// Star key (*).
    Star,

    /// Hash/pound key (#).
    Hash,

    /// Plus key (+), "open door" in the main menu.
    Plus,

    /// Minus key (-), "change password" in the main menu.
    Minus,

    /// Enter/confirm key.
    Enter,

    /// Clear input key.
    Clear,
}

impl KeypadInput {
    /// Create a digit input.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_hardware::traits::KeypadInput;
    ///
    /// let input = KeypadInput::digit(5).unwrap();
    /// assert_eq!(input.as_digit(), Some(5));
    ///
    /// assert!(KeypadInput::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(HardwareError::invalid_data(format!(
                "Digit must be 0-9, got {}",
                d
            )));
        }
        Ok(Self::Digit(d))
    }

    /// Map a character to the key that produces it.
    ///
    /// `\n`/`\r` map to Enter and `C` to Clear; any other character without a
    /// key returns `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_hardware::traits::KeypadInput;
    ///
    /// assert_eq!(KeypadInput::from_char('7'), Some(KeypadInput::Digit(7)));
    /// assert_eq!(KeypadInput::from_char('+'), Some(KeypadInput::Plus));
    /// assert_eq!(KeypadInput::from_char('\n'), Some(KeypadInput::Enter));
    /// assert_eq!(KeypadInput::from_char('z'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self::Digit(c as u8 - b'0')),
            '*' => Some(Self::Star),
            '#' => Some(Self::Hash),
            '+' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            '\n' | '\r' => Some(Self::Enter),
            'C' => Some(Self::Clear),
            _ => None,
        }
    }

    /// Check if this input is a digit.
    pub fn is_digit(&self) -> bool {
        matches!(self, Self::Digit(_))
    }

    /// Get the digit value if this is a digit input.
    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(*d),
            _ => None,
        }
    }

    /// Character this key contributes to a password, if any.
    ///
    /// `#` terminates passwords on the link and is never part of one; Enter
    /// and Clear are control keys.
    pub fn password_byte(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(b'0' + d),
            Self::Star => Some(b'*'),
            Self::Plus => Some(b'+'),
            Self::Minus => Some(b'-'),
            Self::Hash | Self::Enter | Self::Clear => None,
        }
    }
}

/// Trait for keypad input devices.
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// opaque `impl Future` types. Use generics instead of trait objects:
///
/// ```no_run
/// use doorlock_hardware::traits::{KeypadDevice, KeypadInput};
/// use doorlock_hardware::Result;
///
/// async fn wait_for_enter<K: KeypadDevice>(keypad: &mut K) -> Result<()> {
///     while keypad.read_input().await? != KeypadInput::Enter {}
///     Ok(())
/// }
/// ```
pub trait KeypadDevice: Send + Sync {
    /// Wait for the next key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected.
    async fn read_input(&mut self) -> Result<KeypadInput>;
}

/// Character display addressed by row.
pub trait LineDisplay: Send + Sync {
    /// Replace the content of `row` with `text`, truncated to the width.
    ///
    /// # Errors
    ///
    /// Returns an error if `row` does not exist.
    fn render_line(&mut self, row: usize, text: &str) -> Result<()>;

    /// Blank every row.
    fn clear(&mut self) -> Result<()>;
}

/// Door bolt motor.
pub trait Motor: Send + Sync {
    /// Start rotating in `direction` until [`stop`](Motor::stop).
    fn rotate(&mut self, direction: MotorDirection) -> Result<()>;

    fn stop(&mut self) -> Result<()>;
}

/// Buzzer raised during a lockout.
pub trait Alarm: Send + Sync {
    fn on(&mut self) -> Result<()>;

    fn off(&mut self) -> Result<()>;
}

/// Durable byte storage indexed by address (an EEPROM on the target).
///
/// Writes are slow on real parts; callers insert their own settle delay
/// between consecutive writes.
pub trait PersistentStore: Send + Sync {
    /// Write one byte at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the write fails.
    async fn write(&mut self, index: u16, byte: u8) -> Result<()>;

    /// Read the byte stored at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the read fails.
    async fn read(&mut self, index: u16) -> Result<u8>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case('0', KeypadInput::Digit(0))]
    #[case('9', KeypadInput::Digit(9))]
    #[case('*', KeypadInput::Star)]
    #[case('#', KeypadInput::Hash)]
    #[case('-', KeypadInput::Minus)]
    #[case('\r', KeypadInput::Enter)]
    #[case('C', KeypadInput::Clear)]
    fn test_from_char(#[case] c: char, #[case] expected: KeypadInput) {
        assert_eq!(KeypadInput::from_char(c), Some(expected));
    }

    #[test]
    fn test_from_char_unknown() {
        assert_eq!(KeypadInput::from_char('a'), None);
        assert_eq!(KeypadInput::from_char(' '), None);
    }

    #[test]
    fn test_password_byte() {
        assert_eq!(KeypadInput::Digit(4).password_byte(), Some(b'4'));
        assert_eq!(KeypadInput::Star.password_byte(), Some(b'*'));
        assert_eq!(KeypadInput::Plus.password_byte(), Some(b'+'));
        assert_eq!(KeypadInput::Hash.password_byte(), None);
        assert_eq!(KeypadInput::Enter.password_byte(), None);
        assert_eq!(KeypadInput::Clear.password_byte(), None);
    }

    #[test]
    fn test_digit_helpers() {
        let input = KeypadInput::digit(3).unwrap();
        assert!(input.is_digit());
        assert_eq!(input.as_digit(), Some(3));
        assert!(!KeypadInput::Enter.is_digit());
        assert_eq!(KeypadInput::Enter.as_digit(), None);
    }
}
