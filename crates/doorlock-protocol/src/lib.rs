//! Wire protocol between the Interface Unit and the Control Unit.
//!
//! - [`Message`]: the three message kinds carried by the link
//! - [`LinkCodec`]: turn-aware tokio-util codec for the byte alphabet
//! - [`Link`]: framed transport with optional reply timeout

pub mod codec;
pub mod link;
pub mod message;

pub use codec::LinkCodec;
pub use link::Link;
pub use message::{Expect, Message};
