use crate::{
    Result,
    constants::{
        BYTE_CHANGE_PASSWORD, BYTE_CONFIRM, BYTE_OPEN_DOOR, BYTE_REPEAT, BYTE_WRONG,
        MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, PASSWORD_TERMINATOR,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Door password (1-5 printable ASCII characters).
///
/// Stored as a bounded buffer with an explicit length, never as a
/// sentinel-terminated array. Unused tail bytes are always zero so the
/// derived equality compares length and content only.
///
/// # Security
/// `Debug` and `Display` mask the content; the value itself travels and is
/// stored in clear.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Password {
    bytes: [u8; MAX_PASSWORD_LENGTH],
    len: u8,
}

impl Password {
    /// Create a password from a string.
    ///
    /// # Errors
    /// Returns `Error::InvalidPassword` if the length is not 1-5 or a
    /// character is not printable ASCII or is the `#` terminator.
    pub fn new(value: &str) -> Result<Self> {
        Self::from_bytes(value.as_bytes())
    }

    /// Create a password from raw bytes received on the wire or read back
    /// from the persistent store.
    ///
    /// # Errors
    /// Same conditions as [`Password::new`].
    pub fn from_bytes(value: &[u8]) -> Result<Self> {
        let len = value.len();
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
            return Err(Error::InvalidPassword {
                reason: format!(
                    "length must be {MIN_PASSWORD_LENGTH}-{MAX_PASSWORD_LENGTH}, got {len}"
                ),
            });
        }

        if let Some(&bad) = value.iter().find(|b| !is_password_byte(**b)) {
            return Err(Error::InvalidPassword {
                reason: format!("byte 0x{bad:02x} is not allowed"),
            });
        }

        let mut bytes = [0u8; MAX_PASSWORD_LENGTH];
        bytes[..len].copy_from_slice(value);
        Ok(Self {
            bytes,
            len: len as u8,
        })
    }

    /// Password content without terminator.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Always `false`: an empty password cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Compare against another password using the match countdown.
    ///
    /// The countdown starts at this password's length and is decremented for
    /// every equal position, walking left to right over at most
    /// [`MAX_PASSWORD_LENGTH`] positions and stopping at the first mismatch.
    /// A match is declared only when the countdown reaches zero and both
    /// sides have the same length.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_core::Password;
    ///
    /// let stored = Password::new("1234").unwrap();
    /// assert!(stored.matches(&Password::new("1234").unwrap()));
    /// assert!(!stored.matches(&Password::new("12345").unwrap()));
    /// assert!(!stored.matches(&Password::new("1244").unwrap()));
    /// ```
    #[must_use]
    pub fn matches(&self, other: &Password) -> bool {
        if self.len != other.len {
            return false;
        }

        let mut remaining = self.len();
        for (a, b) in self
            .as_bytes()
            .iter()
            .zip(other.as_bytes())
            .take(MAX_PASSWORD_LENGTH)
        {
            if a != b {
                break;
            }
            remaining -= 1;
        }
        remaining == 0
    }
}

/// Whether a byte may appear inside a password.
#[inline]
#[must_use]
pub fn is_password_byte(byte: u8) -> bool {
    byte.is_ascii_graphic() && byte != PASSWORD_TERMINATOR
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Password({})", "*".repeat(self.len()))
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", "*".repeat(self.len()))
    }
}

impl std::str::FromStr for Password {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Password::new(s)
    }
}

/// Outcome code sent by the Control Unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply {
    /// Passwords match.
    Confirm,
    /// Enrollment mismatch, or the attempt that triggers a lockout.
    Wrong,
    /// Verification mismatch with attempts remaining.
    Repeat,
}

impl Reply {
    /// Decode a reply byte.
    #[inline]
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            BYTE_CONFIRM => Some(Reply::Confirm),
            BYTE_WRONG => Some(Reply::Wrong),
            BYTE_REPEAT => Some(Reply::Repeat),
            _ => None,
        }
    }

    /// Wire byte for this reply.
    #[inline]
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            Reply::Confirm => BYTE_CONFIRM,
            Reply::Wrong => BYTE_WRONG,
            Reply::Repeat => BYTE_REPEAT,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Reply::Confirm => write!(f, "CONFIRM"),
            Reply::Wrong => write!(f, "WRONG"),
            Reply::Repeat => write!(f, "REPEAT"),
        }
    }
}

/// Action selected from the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// `+`: run the door sequence.
    OpenDoor,
    /// `-`: enroll a new password.
    ChangePassword,
}

impl Action {
    /// Decode an action selector byte.
    #[inline]
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            BYTE_OPEN_DOOR => Some(Action::OpenDoor),
            BYTE_CHANGE_PASSWORD => Some(Action::ChangePassword),
            _ => None,
        }
    }

    /// Wire byte for this action.
    #[inline]
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            Action::OpenDoor => BYTE_OPEN_DOOR,
            Action::ChangePassword => BYTE_CHANGE_PASSWORD,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Action::OpenDoor => write!(f, "OpenDoor"),
            Action::ChangePassword => write!(f, "ChangePassword"),
        }
    }
}

/// Session state of one unit. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No enrolled password yet, or a change was requested.
    #[default]
    AwaitingNewPassword,
    /// Password enrolled; main menu active, door idle.
    Authenticated,
    /// Door motor running forward.
    DoorUnlocking,
    /// Door held open.
    DoorOpen,
    /// Door motor running in reverse.
    DoorLocking,
    /// Three consecutive failed verifications; alarm active.
    LockedOut,
}

impl SessionState {
    /// Check if the transition to `target` is legal.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_core::SessionState;
    ///
    /// assert!(SessionState::Authenticated.can_transition_to(&SessionState::DoorUnlocking));
    /// assert!(!SessionState::DoorUnlocking.can_transition_to(&SessionState::LockedOut));
    /// ```
    #[must_use]
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::AwaitingNewPassword, SessionState::Authenticated)
                | (
                    SessionState::Authenticated,
                    SessionState::AwaitingNewPassword
                        | SessionState::DoorUnlocking
                        | SessionState::LockedOut
                )
                | (SessionState::DoorUnlocking, SessionState::DoorOpen)
                | (SessionState::DoorOpen, SessionState::DoorLocking)
                | (SessionState::DoorLocking, SessionState::Authenticated)
                | (SessionState::LockedOut, SessionState::Authenticated)
        )
    }

    /// Returns `true` while a timer-driven sequence owns the unit.
    #[inline]
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            SessionState::DoorUnlocking
                | SessionState::DoorOpen
                | SessionState::DoorLocking
                | SessionState::LockedOut
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SessionState::AwaitingNewPassword => "AwaitingNewPassword",
            SessionState::Authenticated => "Authenticated",
            SessionState::DoorUnlocking => "DoorUnlocking",
            SessionState::DoorOpen => "DoorOpen",
            SessionState::DoorLocking => "DoorLocking",
            SessionState::LockedOut => "LockedOut",
        };
        write!(f, "{name}")
    }
}

/// Phase tag bound to the single timer slot.
///
/// The tag armed in the slot is what the completion handler dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// Unlock dwell running.
    Unlocking,
    /// Door held open.
    Open,
    /// Lock dwell running.
    Locking,
    /// One period of the lockout cooldown.
    Lockout,
}

impl TimerPhase {
    /// Session state the unit is in while this phase is armed.
    #[must_use]
    pub fn session_state(self) -> SessionState {
        match self {
            TimerPhase::Unlocking => SessionState::DoorUnlocking,
            TimerPhase::Open => SessionState::DoorOpen,
            TimerPhase::Locking => SessionState::DoorLocking,
            TimerPhase::Lockout => SessionState::LockedOut,
        }
    }

    /// Door phase that follows this one, `None` when the sequence ends.
    #[must_use]
    pub fn next_door_phase(self) -> Option<TimerPhase> {
        match self {
            TimerPhase::Unlocking => Some(TimerPhase::Open),
            TimerPhase::Open => Some(TimerPhase::Locking),
            TimerPhase::Locking | TimerPhase::Lockout => None,
        }
    }
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimerPhase::Unlocking => write!(f, "Unlocking"),
            TimerPhase::Open => write!(f, "Open"),
            TimerPhase::Locking => write!(f, "Locking"),
            TimerPhase::Lockout => write!(f, "Lockout"),
        }
    }
}

/// Motor rotation sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorDirection {
    /// Retracts the bolt.
    Clockwise,
    /// Extends the bolt.
    CounterClockwise,
}

impl fmt::Display for MotorDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MotorDirection::Clockwise => write!(f, "clockwise"),
            MotorDirection::CounterClockwise => write!(f, "counter-clockwise"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1")]
    #[case("1234")]
    #[case("12345")]
    #[case("a*B9!")]
    fn test_password_valid(#[case] input: &str) {
        let password = Password::new(input).unwrap();
        assert_eq!(password.as_bytes(), input.as_bytes());
        assert_eq!(password.len(), input.len());
    }

    #[rstest]
    #[case("")] // empty
    #[case("123456")] // too long
    #[case("12#4")] // terminator
    #[case("12 4")] // space is not graphic
    #[case("12\n")] // control byte
    fn test_password_invalid(#[case] input: &str) {
        assert!(Password::new(input).is_err());
    }

    #[rstest]
    #[case("1234", "1234", true)]
    #[case("12345", "12345", true)]
    #[case("1234", "1235", false)]
    #[case("1234", "12345", false)]
    #[case("12345", "1234", false)]
    #[case("9234", "1234", false)]
    fn test_password_countdown_match(#[case] a: &str, #[case] b: &str, #[case] expected: bool) {
        let a = Password::new(a).unwrap();
        let b = Password::new(b).unwrap();
        assert_eq!(a.matches(&b), expected);
        assert_eq!(b.matches(&a), expected);
    }

    #[test]
    fn test_password_debug_is_masked() {
        let password = Password::new("4321").unwrap();
        assert_eq!(format!("{password:?}"), "Password(****)");
        assert_eq!(password.to_string(), "****");
    }

    #[test]
    fn test_reply_bytes() {
        for reply in [Reply::Confirm, Reply::Wrong, Reply::Repeat] {
            assert_eq!(Reply::from_byte(reply.to_byte()), Some(reply));
        }
        assert_eq!(Reply::from_byte(b'+'), None);
    }

    #[test]
    fn test_action_bytes() {
        assert_eq!(Action::from_byte(b'+'), Some(Action::OpenDoor));
        assert_eq!(Action::from_byte(b'-'), Some(Action::ChangePassword));
        assert_eq!(Action::from_byte(b'c'), None);
    }

    #[test]
    fn test_session_state_default() {
        assert_eq!(SessionState::default(), SessionState::AwaitingNewPassword);
    }

    #[test]
    fn test_session_state_transitions() {
        use SessionState::*;

        assert!(AwaitingNewPassword.can_transition_to(&Authenticated));
        assert!(!AwaitingNewPassword.can_transition_to(&DoorUnlocking));
        assert!(Authenticated.can_transition_to(&LockedOut));
        assert!(DoorUnlocking.can_transition_to(&DoorOpen));
        assert!(DoorOpen.can_transition_to(&DoorLocking));
        assert!(DoorLocking.can_transition_to(&Authenticated));
        assert!(LockedOut.can_transition_to(&Authenticated));
        assert!(!LockedOut.can_transition_to(&DoorUnlocking));
        assert!(!DoorOpen.can_transition_to(&Authenticated));
    }

    #[test]
    fn test_busy_states() {
        assert!(!SessionState::Authenticated.is_busy());
        assert!(!SessionState::AwaitingNewPassword.is_busy());
        assert!(SessionState::DoorOpen.is_busy());
        assert!(SessionState::LockedOut.is_busy());
    }

    #[test]
    fn test_door_phase_order() {
        assert_eq!(
            TimerPhase::Unlocking.next_door_phase(),
            Some(TimerPhase::Open)
        );
        assert_eq!(TimerPhase::Open.next_door_phase(), Some(TimerPhase::Locking));
        assert_eq!(TimerPhase::Locking.next_door_phase(), None);
        assert_eq!(
            TimerPhase::Lockout.session_state(),
            SessionState::LockedOut
        );
    }
}
