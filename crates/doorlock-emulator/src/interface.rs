//! Interface Unit: keypad, display and the user side of the protocol.
//!
//! The Interface Unit collects passwords and menu choices, relays them to
//! the Control Unit and renders the outcome. Once the Control Unit has
//! confirmed a door opening or a lockout, both units run the same timed
//! sequence from the shared configuration without exchanging messages; the
//! Interface Unit mirrors each phase with a display notice.
//!
//! # Key Collection
//!
//! - Password keys are echoed as `*`; at most 5 are kept, extra ones are
//!   ignored.
//! - Enter ends the entry (an empty entry is ignored).
//! - Clear empties the entry.
//! - Keys pressed while the door runs or during a lockout are discarded.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use doorlock_core::constants::MAX_PASSWORD_LENGTH;
use doorlock_core::{Action, DoorlockConfig, Error, Password, Reply, SessionState, TimerPhase};
use doorlock_hardware::{KeypadDevice, KeypadInput, LineDisplay};
use doorlock_protocol::Link;

use crate::error::Result;
use crate::session::{Session, TimerDriven, pump};
use crate::state_machine::StateTransition;

/// Screen text of the Interface Unit.
pub mod notice {
    pub const ENTER_PASSWORD: &str = "PLZ ENTER PASS:";
    pub const REENTER_PASSWORD: (&str, &str) = ("PLZ RE-ENTER THE", "SAME PASS:");
    pub const MISMATCH: &str = "NOT MATCHED";
    pub const MENU: (&str, &str) = ("+ : OPEN DOOR", "- : CHANGE PASS");
    pub const DOOR: &str = "DOOR IS";
    pub const UNLOCKING: &str = "UNLOCKING";
    pub const UNLOCKED: &str = "UNLOCKED";
    pub const LOCKING: &str = "LOCKING";
    pub const THIEF: &str = "THIEF!";
    pub const COMM_TIMEOUT: (&str, &str) = ("COMMUNICATION", "TIMEOUT");
}

/// State touched by timer handlers.
struct InterfaceCore<D> {
    session: Session,
    display: D,
}

impl<D: LineDisplay> InterfaceCore<D> {
    fn show(&mut self, top: &str, bottom: &str) -> Result<()> {
        self.display.clear()?;
        self.display.render_line(0, top)?;
        self.display.render_line(1, bottom)?;
        Ok(())
    }
}

impl<D: LineDisplay> TimerDriven for InterfaceCore<D> {
    fn session(&mut self) -> &mut Session {
        &mut self.session
    }

    fn on_timer(&mut self, phase: TimerPhase) -> Result<()> {
        match phase {
            TimerPhase::Unlocking => {
                self.show(notice::DOOR, notice::UNLOCKED)?;
                self.session.advance_door(phase)
            }
            TimerPhase::Open => {
                self.show(notice::DOOR, notice::LOCKING)?;
                self.session.advance_door(phase)
            }
            TimerPhase::Locking => self.session.advance_door(phase),
            TimerPhase::Lockout => {
                if self.session.lockout_tick()? {
                    self.display.clear()?;
                }
                Ok(())
            }
        }
    }
}

/// The Interface Unit.
pub struct InterfaceUnit<T, K, D> {
    link: Link<T>,
    keypad: K,
    core: InterfaceCore<D>,
}

impl<T, K, D> InterfaceUnit<T, K, D>
where
    T: AsyncRead + AsyncWrite + Unpin,
    K: KeypadDevice,
    D: LineDisplay,
{
    /// Create a unit in `AwaitingNewPassword`.
    ///
    /// Replies from the Control Unit are awaited for at most
    /// `config.reply_timeout()`, or forever when unset.
    pub fn new(io: T, keypad: K, display: D, config: DoorlockConfig) -> Self {
        Self {
            link: Link::new(io, config.reply_timeout()),
            keypad,
            core: InterfaceCore {
                session: Session::new("interface", config),
                display,
            },
        }
    }

    pub fn state(&self) -> SessionState {
        self.core.session.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.core.session.machine.subscribe()
    }

    /// Recorded state transitions, oldest first.
    pub fn history(&self) -> Vec<StateTransition> {
        self.core.session.machine.history().iter().cloned().collect()
    }

    /// Run until the keypad or link goes away or a fatal error occurs.
    ///
    /// # Errors
    ///
    /// - `Error::LinkClosed` / `Error::ReplyTimeout` when the Control Unit
    ///   stops answering
    /// - `Error::ProtocolDesync` on a reply that makes no sense here
    /// - a hardware error from the keypad or display
    pub async fn run(&mut self) -> Result<()> {
        info!("Interface unit started");
        loop {
            if let Err(e) = self.step().await {
                error!("Interface unit stopped: {}", e);
                return Err(e);
            }
        }
    }

    /// Handle one interaction for the current state.
    pub async fn step(&mut self) -> Result<()> {
        match self.state() {
            SessionState::AwaitingNewPassword => self.enroll().await,
            SessionState::Authenticated => self.main_menu().await,
            _ => self.wait_idle().await,
        }
    }

    async fn enroll(&mut self) -> Result<()> {
        self.core.show(notice::ENTER_PASSWORD, "")?;
        let candidate = self.collect_password().await?;

        let (top, bottom) = notice::REENTER_PASSWORD;
        self.core.show(top, bottom)?;
        let confirmation = self.collect_password().await?;

        pump(&mut self.core, self.link.send_password(candidate)).await??;
        pump(&mut self.core, self.link.send_password(confirmation)).await??;

        match self.await_reply().await? {
            Reply::Confirm => {
                info!("Password enrolled");
                self.core.session.transition(SessionState::Authenticated)
            }
            Reply::Wrong => {
                warn!("Enrollment passwords differ");
                self.core.show(notice::MISMATCH, "")
            }
            Reply::Repeat => Err(unexpected_reply(Reply::Repeat)),
        }
    }

    async fn main_menu(&mut self) -> Result<()> {
        let action = self.select_action().await?;

        // A REPEAT asks for the password again; the menu is not re-shown.
        loop {
            self.core.show(notice::ENTER_PASSWORD, "")?;
            let attempt = self.collect_password().await?;
            pump(&mut self.core, self.link.send_password(attempt)).await??;

            match self.await_reply().await? {
                Reply::Confirm => {
                    pump(&mut self.core, self.link.send_action(action)).await??;
                    info!(%action, "Attempt accepted");
                    return match action {
                        Action::OpenDoor => {
                            self.core.show(notice::DOOR, notice::UNLOCKING)?;
                            self.core.session.begin_door()
                        }
                        Action::ChangePassword => self
                            .core
                            .session
                            .transition(SessionState::AwaitingNewPassword),
                    };
                }
                Reply::Repeat => warn!("Attempt rejected, asking again"),
                Reply::Wrong => {
                    warn!("Attempt limit reached, locked out");
                    self.core.show(notice::THIEF, "")?;
                    return self.core.session.begin_lockout();
                }
            }
        }
    }

    async fn select_action(&mut self) -> Result<Action> {
        loop {
            let (top, bottom) = notice::MENU;
            self.core.show(top, bottom)?;

            match pump(&mut self.core, self.keypad.read_input()).await?? {
                KeypadInput::Plus => return Ok(Action::OpenDoor),
                KeypadInput::Minus => return Ok(Action::ChangePassword),
                key => debug!(?key, "Not a menu key"),
            }
        }
    }

    async fn collect_password(&mut self) -> Result<Password> {
        let mut entry: Vec<u8> = Vec::with_capacity(MAX_PASSWORD_LENGTH);
        loop {
            let key = pump(&mut self.core, self.keypad.read_input()).await??;
            match key {
                KeypadInput::Enter if !entry.is_empty() => break,
                KeypadInput::Enter => {}
                KeypadInput::Clear => entry.clear(),
                key => match key.password_byte() {
                    Some(byte) if entry.len() < MAX_PASSWORD_LENGTH => entry.push(byte),
                    _ => continue,
                },
            }
            self.core
                .display
                .render_line(1, &"*".repeat(entry.len()))?;
        }
        Ok(Password::from_bytes(&entry)?)
    }

    async fn await_reply(&mut self) -> Result<Reply> {
        match pump(&mut self.core, self.link.recv_reply()).await? {
            Ok(reply) => {
                debug!(%reply, "Reply received");
                Ok(reply)
            }
            Err(e @ Error::ReplyTimeout { .. }) => {
                let (top, bottom) = notice::COMM_TIMEOUT;
                self.core.show(top, bottom)?;
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Service the timer until the current sequence ends, dropping any key
    /// pressed meanwhile.
    async fn wait_idle(&mut self) -> Result<()> {
        while self.core.session.is_busy() {
            tokio::select! {
                biased;
                phase = self.core.session.timer.expired() => self.core.on_timer(phase)?,
                key = self.keypad.read_input() => {
                    let key = key?;
                    debug!(?key, "Key ignored while busy");
                }
            }
        }
        Ok(())
    }
}

fn unexpected_reply(reply: Reply) -> crate::error::UnitError {
    Error::ProtocolDesync {
        expected: "confirm or wrong".to_string(),
        byte: reply.to_byte(),
    }
    .into()
}
