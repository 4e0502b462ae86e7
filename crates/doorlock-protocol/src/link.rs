//! Framed transport between the two units.
//!
//! `Link` wraps any ordered, lossless byte stream (`AsyncRead + AsyncWrite`)
//! in a [`LinkCodec`] and exposes the request/reply operations both units
//! need. It carries no protocol policy of its own: deciding what to send
//! and what to expect next belongs to the units.
//!
//! # Timeout Handling
//!
//! Receives block until a message arrives, like the serial link they model.
//! An optional reply timeout turns an absent peer into
//! `Error::ReplyTimeout` instead of an indefinite wait.
//!
//! # Example
//!
//! ```
//! use doorlock_core::{Password, Reply};
//! use doorlock_protocol::Link;
//!
//! # #[tokio::main]
//! # async fn main() -> doorlock_core::Result<()> {
//! let (iu_end, cu_end) = tokio::io::duplex(64);
//! let mut iu = Link::new(iu_end, None);
//! let mut cu = Link::new(cu_end, None);
//!
//! iu.send_password(Password::new("1234")?).await?;
//! let attempt = cu.recv_password().await?;
//! assert_eq!(attempt.as_bytes(), b"1234");
//!
//! cu.send_reply(Reply::Confirm).await?;
//! assert_eq!(iu.recv_reply().await?, Reply::Confirm);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{trace, warn};

use crate::{Expect, LinkCodec, Message};
use doorlock_core::{Action, Error, Password, Reply, Result};

/// Framed, turn-aware link endpoint.
pub struct Link<T> {
    /// Framed stream with `LinkCodec`.
    framed: Framed<T, LinkCodec>,

    /// Maximum wait for an incoming message.
    reply_timeout: Option<Duration>,
}

impl<T> Link<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a transport. `reply_timeout` of `None` waits indefinitely.
    pub fn new(io: T, reply_timeout: Option<Duration>) -> Self {
        Self {
            framed: Framed::new(io, LinkCodec::new()),
            reply_timeout,
        }
    }

    /// Configured receive timeout.
    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout
    }

    /// Encode and flush one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or the peer has gone away.
    pub async fn send(&mut self, message: Message) -> Result<()> {
        trace!(?message, "Sending message");
        self.framed.send(message).await
    }

    /// Receive the next message, which must be of kind `expect`.
    ///
    /// # Errors
    ///
    /// - `Error::LinkClosed` if the peer closed the transport
    /// - `Error::ReplyTimeout` if a timeout is configured and elapses
    /// - `Error::ProtocolDesync` / `Error::InvalidPassword` /
    ///   `Error::FrameTooLarge` if the bytes do not form the expected message
    pub async fn recv(&mut self, expect: Expect) -> Result<Message> {
        self.framed.codec_mut().expect(expect);
        trace!(%expect, "Waiting for message");

        let next = match self.reply_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.framed.next()).await {
                Ok(next) => next,
                Err(_) => {
                    let timeout_ms = whole_millis(limit);
                    warn!("No message within {}ms", timeout_ms);
                    return Err(Error::ReplyTimeout { timeout_ms });
                }
            },
            None => self.framed.next().await,
        };

        match next {
            Some(Ok(message)) => {
                trace!(?message, "Received message");
                Ok(message)
            }
            Some(Err(e)) => {
                warn!("Failed to decode {}: {}", expect, e);
                Err(e)
            }
            None => Err(Error::LinkClosed),
        }
    }

    pub async fn send_password(&mut self, password: Password) -> Result<()> {
        self.send(Message::Password(password)).await
    }

    pub async fn send_reply(&mut self, reply: Reply) -> Result<()> {
        self.send(Message::Reply(reply)).await
    }

    pub async fn send_action(&mut self, action: Action) -> Result<()> {
        self.send(Message::Action(action)).await
    }

    pub async fn recv_password(&mut self) -> Result<Password> {
        match self.recv(Expect::Password).await? {
            Message::Password(password) => Ok(password),
            other => Err(unexpected(Expect::Password, other)),
        }
    }

    pub async fn recv_reply(&mut self) -> Result<Reply> {
        match self.recv(Expect::Reply).await? {
            Message::Reply(reply) => Ok(reply),
            other => Err(unexpected(Expect::Reply, other)),
        }
    }

    pub async fn recv_action(&mut self) -> Result<Action> {
        match self.recv(Expect::Action).await? {
            Message::Action(action) => Ok(action),
            other => Err(unexpected(Expect::Action, other)),
        }
    }

    /// Consume the link and return the transport.
    pub fn into_inner(self) -> T {
        self.framed.into_inner()
    }
}

/// Milliseconds in `duration`, saturating at `u64::MAX`.
fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// The codec only yields the expected kind; this guards the match arms above.
fn unexpected(expect: Expect, got: Message) -> Error {
    let byte = match got {
        Message::Password(password) => password.as_bytes().first().copied().unwrap_or_default(),
        Message::Reply(reply) => reply.to_byte(),
        Message::Action(action) => action.to_byte(),
    };
    Error::ProtocolDesync {
        expected: expect.to_string(),
        byte,
    }
}
