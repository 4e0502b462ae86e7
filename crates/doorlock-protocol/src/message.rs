use std::fmt;

use doorlock_core::{Action, Password, Reply};

/// A single protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// IU -> CU: candidate, confirmation or verification attempt.
    Password(Password),

    /// CU -> IU: outcome of the last exchange.
    Reply(Reply),

    /// IU -> CU: menu selection sent after a confirmed attempt.
    Action(Action),
}

impl Message {
    /// Kind of this message.
    pub fn kind(&self) -> Expect {
        match self {
            Message::Password(_) => Expect::Password,
            Message::Reply(_) => Expect::Reply,
            Message::Action(_) => Expect::Action,
        }
    }
}

impl From<Password> for Message {
    fn from(password: Password) -> Self {
        Message::Password(password)
    }
}

impl From<Reply> for Message {
    fn from(reply: Reply) -> Self {
        Message::Reply(reply)
    }
}

impl From<Action> for Message {
    fn from(action: Action) -> Self {
        Message::Action(action)
    }
}

/// Message kind a receiver is waiting for.
///
/// The byte alphabet overlaps (`+` is both an action selector and a legal
/// password character), so the receiver declares the kind of the next
/// message and anything that does not fit it is a desync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expect {
    #[default]
    Password,
    Reply,
    Action,
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expect::Password => write!(f, "password"),
            Expect::Reply => write!(f, "reply"),
            Expect::Action => write!(f, "action"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_kind() {
        let password = Password::new("12").unwrap();
        assert_eq!(Message::from(password).kind(), Expect::Password);
        assert_eq!(Message::from(Reply::Repeat).kind(), Expect::Reply);
        assert_eq!(Message::from(Action::OpenDoor).kind(), Expect::Action);
    }

    #[test]
    fn test_expect_display() {
        assert_eq!(Expect::Reply.to_string(), "reply");
        assert_eq!(Expect::default(), Expect::Password);
    }
}
