//! Mock keypad implementation for testing and development.
//!
//! Key presses are fed through a channel by a [`MockKeypadHandle`], so a test
//! can script a whole session up front or type keys while a unit runs.

use crate::{
    HardwareError, Result,
    traits::{KeypadDevice, KeypadInput},
};
use tokio::sync::mpsc;

/// Mock keypad device for testing and development.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MockKeypad;
/// use doorlock_hardware::traits::{KeypadDevice, KeypadInput};
///
/// #[tokio::main]
/// async fn main() -> doorlock_hardware::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///
///     handle.send_password("12").await?;
///
///     assert_eq!(keypad.read_input().await?, KeypadInput::Digit(1));
///     assert_eq!(keypad.read_input().await?, KeypadInput::Digit(2));
///     assert_eq!(keypad.read_input().await?, KeypadInput::Enter);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    /// Channel receiver for simulated input
    input_rx: mpsc::Receiver<KeypadInput>,
}

impl MockKeypad {
    /// Create a new mock keypad.
    ///
    /// Returns a tuple of (MockKeypad, MockKeypadHandle) where the handle
    /// can be used to simulate input to the keypad.
    pub fn new() -> (Self, MockKeypadHandle) {
        let (input_tx, input_rx) = mpsc::channel(64);
        (Self { input_rx }, MockKeypadHandle { input_tx })
    }
}

impl KeypadDevice for MockKeypad {
    async fn read_input(&mut self) -> Result<KeypadInput> {
        self.input_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("Keypad input channel closed"))
    }
}

/// Handle for controlling a mock keypad.
///
/// It can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    /// Channel sender for simulated input
    input_tx: mpsc::Sender<KeypadInput>,
}

impl MockKeypadHandle {
    /// Send an input event to the mock keypad.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped and the channel is closed.
    pub async fn send_input(&self, input: KeypadInput) -> Result<()> {
        self.input_tx
            .send(input)
            .await
            .map_err(|_| HardwareError::disconnected("Keypad input channel closed"))
    }

    /// Type every character of `keys`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A character has no key (see [`KeypadInput::from_char`])
    /// - The keypad has been dropped and the channel is closed
    pub async fn send_keys(&self, keys: &str) -> Result<()> {
        for c in keys.chars() {
            let input = KeypadInput::from_char(c)
                .ok_or_else(|| HardwareError::invalid_data(format!("No key for {c:?}")))?;
            self.send_input(input).await?;
        }
        Ok(())
    }

    /// Type a password followed by Enter.
    ///
    /// # Errors
    ///
    /// Same conditions as [`send_keys`](Self::send_keys).
    pub async fn send_password(&self, password: &str) -> Result<()> {
        self.send_keys(password).await?;
        self.send_input(KeypadInput::Enter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_keypad_basic_input() {
        let (mut keypad, handle) = MockKeypad::new();

        handle.send_input(KeypadInput::Digit(5)).await.unwrap();

        let input = keypad.read_input().await.unwrap();
        assert_eq!(input, KeypadInput::Digit(5));
    }

    #[tokio::test]
    async fn test_mock_keypad_sequence() {
        let (mut keypad, handle) = MockKeypad::new();

        tokio::spawn(async move {
            handle.send_keys("+4").await.unwrap();
            handle.send_input(KeypadInput::Enter).await.unwrap();
        });

        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Plus);
        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Digit(4));
        assert_eq!(keypad.read_input().await.unwrap(), KeypadInput::Enter);
    }

    #[tokio::test]
    async fn test_send_keys_rejects_unknown_char() {
        let (_keypad, handle) = MockKeypad::new();

        let result = handle.send_keys("12x").await;
        assert!(matches!(result, Err(HardwareError::InvalidData { .. })));
    }

    #[tokio::test]
    async fn test_keypad_disconnected() {
        let (mut keypad, handle) = MockKeypad::new();
        drop(handle);

        let result = keypad.read_input().await;
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }
}
