//! State shared by both units and the timer pump.
//!
//! A unit is one cooperative task. Whatever it awaits (a key, a message, a
//! store write) is raced against its [`TimerSlot`] by [`pump`], biased
//! towards the timer, and a fired phase is handled through
//! [`TimerDriven::on_timer`] before the await resumes. Handlers therefore
//! run between two steps of the main loop, never in the middle of one, and
//! take the same `&mut` the loop uses.

use std::future::Future;

use tracing::{debug, info};

use doorlock_core::{DoorlockConfig, SessionState, TimerPhase};
use doorlock_hardware::TimerSlot;

use crate::error::Result;
use crate::lockout::LockoutCountdown;
use crate::state_machine::StateMachine;

/// Session state, timer slot and lockout count of one unit.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) config: DoorlockConfig,
    pub(crate) machine: StateMachine,
    pub(crate) timer: TimerSlot<TimerPhase>,
    pub(crate) lockout: LockoutCountdown,
    unit: &'static str,
}

impl Session {
    pub(crate) fn new(unit: &'static str, config: DoorlockConfig) -> Self {
        Self {
            lockout: LockoutCountdown::new(config.lockout_ticks),
            config,
            machine: StateMachine::new(),
            timer: TimerSlot::new(),
            unit,
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        self.machine.current_state()
    }

    /// A door sequence or lockout owns the unit until its timer runs out.
    pub(crate) fn is_busy(&self) -> bool {
        self.state().is_busy() && self.timer.is_armed()
    }

    pub(crate) fn transition(&mut self, to: SessionState) -> Result<()> {
        let transition = self.machine.transition_to(to)?;
        info!(unit = self.unit, from = %transition.from, to = %transition.to, "State changed");
        Ok(())
    }

    /// Enter `DoorUnlocking` and arm the first door phase.
    pub(crate) fn begin_door(&mut self) -> Result<()> {
        self.enter_phase(TimerPhase::Unlocking)
    }

    /// Move on from a finished door phase: arm the next one, or return to
    /// `Authenticated` after locking.
    pub(crate) fn advance_door(&mut self, finished: TimerPhase) -> Result<()> {
        match finished.next_door_phase() {
            Some(next) => self.enter_phase(next),
            None => {
                self.timer.disarm();
                self.transition(SessionState::Authenticated)
            }
        }
    }

    /// Enter `LockedOut` and start counting lockout periods.
    pub(crate) fn begin_lockout(&mut self) -> Result<()> {
        self.lockout.reset();
        self.transition(SessionState::LockedOut)?;
        self.timer
            .arm_periodic(self.config.dwell(TimerPhase::Lockout), TimerPhase::Lockout);
        Ok(())
    }

    /// Count one lockout firing. Returns `true` once the lockout is over and
    /// the unit is back in `Authenticated`.
    pub(crate) fn lockout_tick(&mut self) -> Result<bool> {
        if !self.lockout.tick() {
            debug!(unit = self.unit, ticks = self.lockout.ticks(), "Lockout tick");
            return Ok(false);
        }
        self.timer.disarm();
        self.transition(SessionState::Authenticated)?;
        Ok(true)
    }

    fn enter_phase(&mut self, phase: TimerPhase) -> Result<()> {
        self.transition(phase.session_state())?;
        self.timer.arm(self.config.dwell(phase), phase);
        Ok(())
    }
}

/// A unit whose timer completions must be serviced while it waits.
pub(crate) trait TimerDriven {
    fn session(&mut self) -> &mut Session;

    /// Handle a fired phase. Runs with exclusive access to the unit state.
    fn on_timer(&mut self, phase: TimerPhase) -> Result<()>;
}

/// Await `fut`, servicing every timer completion that fires meanwhile.
pub(crate) async fn pump<C, F>(core: &mut C, fut: F) -> Result<F::Output>
where
    C: TimerDriven,
    F: Future,
{
    tokio::pin!(fut);
    loop {
        tokio::select! {
            biased;
            phase = core.session().timer.expired() => core.on_timer(phase)?,
            output = &mut fut => return Ok(output),
        }
    }
}

/// Service timer completions until no door sequence or lockout is running.
pub(crate) async fn settle<C: TimerDriven>(core: &mut C) -> Result<()> {
    while core.session().is_busy() {
        let phase = core.session().timer.expired().await;
        core.on_timer(phase)?;
    }
    Ok(())
}
