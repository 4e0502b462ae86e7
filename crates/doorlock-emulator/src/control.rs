//! Control Unit: stored password, verification, motor and alarm.
//!
//! # Protocol
//!
//! ```text
//! AwaitingNewPassword   <- candidate#  <- confirmation#
//!                       -> c (stored, Authenticated) | w (retry enrollment)
//! Authenticated         <- attempt#
//!                       -> c  <- + (door sequence) | - (AwaitingNewPassword)
//!                       -> r (attempts remain) | w (LockedOut)
//! ```
//!
//! # Door Sequence
//!
//! | Phase fired | Motor | Next state |
//! |---|---|---|
//! | (verified `+`) | clockwise | DoorUnlocking |
//! | Unlocking | stop | DoorOpen |
//! | Open | counter-clockwise | DoorLocking |
//! | Locking | stop | Authenticated |
//!
//! # Stored Password Layout
//!
//! Indices `0..=4` hold the password; slots past its end hold `#`. An
//! erased cell or any other byte outside the password alphabet means the
//! store is corrupt, which ends the unit instead of falling back to a
//! default password.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use doorlock_core::constants::{PASSWORD_STORE_BASE, PASSWORD_STORE_SLOTS, PASSWORD_TERMINATOR};
use doorlock_core::{
    Action, DoorlockConfig, Error, MotorDirection, Password, Reply, SessionState, TimerPhase,
    is_password_byte,
};
use doorlock_hardware::{Alarm, Motor, PersistentStore};
use doorlock_protocol::Link;

use crate::error::Result;
use crate::lockout::{AttemptOutcome, RetryCounter};
use crate::session::{Session, TimerDriven, pump, settle};
use crate::state_machine::StateTransition;

/// State touched by timer handlers.
struct ControlCore<M, A> {
    session: Session,
    retries: RetryCounter,
    motor: M,
    alarm: A,
}

impl<M: Motor, A: Alarm> ControlCore<M, A> {
    fn start_door(&mut self) -> Result<()> {
        self.motor.rotate(MotorDirection::Clockwise)?;
        self.session.begin_door()
    }

    fn start_lockout(&mut self) -> Result<()> {
        self.session.begin_lockout()?;
        self.alarm.on()?;
        Ok(())
    }
}

impl<M: Motor, A: Alarm> TimerDriven for ControlCore<M, A> {
    fn session(&mut self) -> &mut Session {
        &mut self.session
    }

    fn on_timer(&mut self, phase: TimerPhase) -> Result<()> {
        match phase {
            TimerPhase::Unlocking | TimerPhase::Locking => {
                self.motor.stop()?;
                self.session.advance_door(phase)
            }
            TimerPhase::Open => {
                self.motor.rotate(MotorDirection::CounterClockwise)?;
                self.session.advance_door(phase)
            }
            TimerPhase::Lockout => {
                if self.session.lockout_tick()? {
                    self.alarm.off()?;
                    info!("Lockout over, alarm off");
                }
                Ok(())
            }
        }
    }
}

/// The Control Unit.
///
/// Owns its end of the link, the persistent store and the actuators.
pub struct ControlUnit<T, M, A, S> {
    link: Link<T>,
    store: S,
    core: ControlCore<M, A>,
}

impl<T, M, A, S> ControlUnit<T, M, A, S>
where
    T: AsyncRead + AsyncWrite + Unpin,
    M: Motor,
    A: Alarm,
    S: PersistentStore,
{
    /// Create a unit in `AwaitingNewPassword`.
    ///
    /// The Control Unit waits for the user at the Interface Unit, so its
    /// receives never time out.
    pub fn new(io: T, motor: M, alarm: A, store: S, config: DoorlockConfig) -> Self {
        Self {
            link: Link::new(io, None),
            store,
            core: ControlCore {
                retries: RetryCounter::new(config.max_attempts),
                session: Session::new("control", config),
                motor,
                alarm,
            },
        }
    }

    pub fn state(&self) -> SessionState {
        self.core.session.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.core.session.machine.subscribe()
    }

    /// Failed verifications since the last success or lockout.
    pub fn retry_count(&self) -> u8 {
        self.core.retries.failures()
    }

    pub fn armed_phase(&self) -> Option<TimerPhase> {
        self.core.session.timer.armed_phase()
    }

    /// Recorded state transitions, oldest first.
    pub fn history(&self) -> Vec<StateTransition> {
        self.core.session.machine.history().iter().cloned().collect()
    }

    /// Run until the link closes or a fatal error occurs.
    ///
    /// # Errors
    ///
    /// - `Error::LinkClosed` when the Interface Unit goes away
    /// - `Error::ProtocolDesync` / `Error::InvalidPassword` on malformed input
    /// - `Error::StoreCorrupt` or a hardware error from the store or actuators
    pub async fn run(&mut self) -> Result<()> {
        info!("Control unit started");
        loop {
            if let Err(e) = self.step().await {
                error!("Control unit stopped: {}", e);
                return Err(e);
            }
        }
    }

    /// Handle one exchange for the current state.
    pub async fn step(&mut self) -> Result<()> {
        match self.state() {
            SessionState::AwaitingNewPassword => self.enroll().await,
            SessionState::Authenticated => self.verify().await,
            _ => settle(&mut self.core).await,
        }
    }

    async fn enroll(&mut self) -> Result<()> {
        let candidate = pump(&mut self.core, self.link.recv_password()).await??;
        let confirmation = pump(&mut self.core, self.link.recv_password()).await??;

        if !candidate.matches(&confirmation) {
            warn!("Enrollment passwords differ");
            pump(&mut self.core, self.link.send_reply(Reply::Wrong)).await??;
            return Ok(());
        }

        pump(&mut self.core, self.link.send_reply(Reply::Confirm)).await??;
        self.persist(&candidate).await?;
        self.core.session.transition(SessionState::Authenticated)?;
        info!(len = candidate.len(), "Password enrolled");
        Ok(())
    }

    async fn verify(&mut self) -> Result<()> {
        let attempt = pump(&mut self.core, self.link.recv_password()).await??;
        settle(&mut self.core).await?;

        let stored = self.load_stored().await?;
        if stored.matches(&attempt) {
            self.core.retries.reset();
            pump(&mut self.core, self.link.send_reply(Reply::Confirm)).await??;
            info!("Attempt accepted");

            let action = pump(&mut self.core, self.link.recv_action()).await??;
            info!(%action, "Action selected");
            return match action {
                Action::OpenDoor => self.core.start_door(),
                Action::ChangePassword => self
                    .core
                    .session
                    .transition(SessionState::AwaitingNewPassword),
            };
        }

        let outcome = self.core.retries.record_failure();
        pump(&mut self.core, self.link.send_reply(outcome.reply())).await??;
        match outcome {
            AttemptOutcome::Retry { remaining } => {
                warn!(remaining, "Attempt rejected");
                Ok(())
            }
            AttemptOutcome::Lockout => {
                warn!("Attempt limit reached, locking out");
                self.core.start_lockout()
            }
        }
    }

    /// Write the password slot by slot, settling after each write.
    async fn persist(&mut self, password: &Password) -> Result<()> {
        let settle_for = self.core.session.config.store_settle();
        for slot in 0..PASSWORD_STORE_SLOTS {
            let byte = password
                .as_bytes()
                .get(usize::from(slot))
                .copied()
                .unwrap_or(PASSWORD_TERMINATOR);
            let index = PASSWORD_STORE_BASE + slot;
            pump(&mut self.core, self.store.write(index, byte)).await??;
            pump(&mut self.core, tokio::time::sleep(settle_for)).await?;
        }
        debug!("Password persisted");
        Ok(())
    }

    async fn load_stored(&mut self) -> Result<Password> {
        let mut bytes = Vec::with_capacity(usize::from(PASSWORD_STORE_SLOTS));
        for slot in 0..PASSWORD_STORE_SLOTS {
            let index = PASSWORD_STORE_BASE + slot;
            let byte = pump(&mut self.core, self.store.read(index)).await??;
            if byte == PASSWORD_TERMINATOR {
                break;
            }
            if !is_password_byte(byte) {
                return Err(Error::StoreCorrupt { index, byte }.into());
            }
            bytes.push(byte);
        }

        Password::from_bytes(&bytes).map_err(|_| {
            Error::StoreCorrupt {
                index: PASSWORD_STORE_BASE,
                byte: PASSWORD_TERMINATOR,
            }
            .into()
        })
    }
}
