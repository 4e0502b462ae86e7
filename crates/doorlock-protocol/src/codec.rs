//! Tokio codec for the door-lock link.
//!
//! # Overview
//!
//! `LinkCodec` implements [`Decoder`] and [`Encoder<Message>`] so a
//! transport can be wrapped in a `tokio_util::codec::Framed`:
//!
//! ```text
//! serial / duplex pipe -> Decoder -> Message (as expected by the receiver)
//! Message -> Encoder -> serial / duplex pipe
//! ```
//!
//! # Turn Awareness
//!
//! The exchange is strictly half-duplex, so the receiver always knows which
//! kind of message comes next. The codec is told through
//! [`LinkCodec::expect`] and rejects any byte that does not belong to that
//! kind with `Error::ProtocolDesync` instead of misreading it.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use tokio_util::codec::Decoder;
//! use doorlock_core::Reply;
//! use doorlock_protocol::{Expect, LinkCodec, Message};
//!
//! let mut codec = LinkCodec::new();
//! codec.expect(Expect::Reply);
//!
//! let mut buffer = BytesMut::from(&b"r"[..]);
//! let message = codec.decode(&mut buffer).unwrap();
//! assert_eq!(message, Some(Message::Reply(Reply::Repeat)));
//! ```

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::{Expect, Message};
use doorlock_core::constants::{MAX_PASSWORD_FRAME, PASSWORD_TERMINATOR};
use doorlock_core::{Action, Error, Password, Reply, Result};

/// Codec for the single-byte alphabet and `#`-terminated passwords.
#[derive(Debug, Default)]
pub struct LinkCodec {
    /// Kind of the next message to decode.
    expect: Expect,
}

impl LinkCodec {
    /// Create a codec expecting a password (the first message of every
    /// exchange).
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the kind of the next message to decode.
    pub fn expect(&mut self, kind: Expect) {
        self.expect = kind;
    }

    /// Kind currently expected.
    pub fn expecting(&self) -> Expect {
        self.expect
    }

    fn decode_password(&self, src: &mut BytesMut) -> Result<Option<Message>> {
        let window = src.len().min(MAX_PASSWORD_FRAME);
        let Some(end) = src[..window].iter().position(|&b| b == PASSWORD_TERMINATOR) else {
            if src.len() >= MAX_PASSWORD_FRAME {
                return Err(Error::FrameTooLarge {
                    size: src.len(),
                    max_size: MAX_PASSWORD_FRAME,
                });
            }
            // Terminator not seen yet
            return Ok(None);
        };

        let frame = src.split_to(end + 1);
        let password = Password::from_bytes(&frame[..end])?;
        Ok(Some(Message::Password(password)))
    }

    fn decode_byte<T>(
        &self,
        src: &mut BytesMut,
        parse: fn(u8) -> Option<T>,
        wrap: fn(T) -> Message,
    ) -> Result<Option<Message>> {
        let byte = src[0];
        match parse(byte) {
            Some(value) => {
                src.advance(1);
                Ok(Some(wrap(value)))
            }
            None => Err(Error::ProtocolDesync {
                expected: self.expect.to_string(),
                byte,
            }),
        }
    }
}

impl Decoder for LinkCodec {
    type Item = Message;
    type Error = Error;

    /// Decode the next message of the expected kind.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message))` - a complete message was decoded
    /// - `Ok(None)` - more bytes are needed
    /// - `Err(Error)` - desync, oversized or invalid password frame
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.is_empty() {
            return Ok(None);
        }

        let message = match self.expect {
            Expect::Password => self.decode_password(src)?,
            Expect::Reply => self.decode_byte(src, Reply::from_byte, Message::Reply)?,
            Expect::Action => self.decode_byte(src, Action::from_byte, Message::Action)?,
        };

        if let Some(message) = &message {
            trace!(?message, "Decoded frame");
        }
        Ok(message)
    }
}

impl Encoder<Message> for LinkCodec {
    type Error = Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<()> {
        match item {
            Message::Password(password) => {
                dst.reserve(password.len() + 1);
                dst.extend_from_slice(password.as_bytes());
                dst.extend_from_slice(&[PASSWORD_TERMINATOR]);
            }
            Message::Reply(reply) => dst.extend_from_slice(&[reply.to_byte()]),
            Message::Action(action) => dst.extend_from_slice(&[action.to_byte()]),
        }
        Ok(())
    }
}
