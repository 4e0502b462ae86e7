//! Single-slot re-armable timer.
//!
//! Each unit owns exactly one [`TimerSlot`]. A slot holds at most one
//! binding: a deadline plus the phase tag delivered when it passes. Arming
//! replaces the deadline and the tag in place, so the only phase that can
//! ever be delivered is the one most recently armed.
//!
//! The slot does not run anything by itself. Its owner awaits
//! [`TimerSlot::expired`], usually raced against other I/O with
//! `tokio::select!`, and dispatches on the returned phase.
//!
//! # Example
//!
//! ```
//! use doorlock_hardware::TimerSlot;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let mut slot = TimerSlot::new();
//! slot.arm(Duration::from_secs(15), "unlocking");
//! slot.arm(Duration::from_secs(3), "open");
//!
//! assert_eq!(slot.expired().await, "open");
//! assert!(!slot.is_armed());
//! # }
//! ```

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep};
use tracing::debug;

struct Binding<P> {
    phase: P,
    sleep: Pin<Box<Sleep>>,
    /// `Some` for a periodic binding.
    period: Option<Duration>,
}

/// Timer slot holding at most one `(deadline, phase)` binding.
pub struct TimerSlot<P> {
    binding: Option<Binding<P>>,
}

impl<P> TimerSlot<P>
where
    P: Copy + fmt::Debug,
{
    /// Create an unarmed slot.
    pub fn new() -> Self {
        Self { binding: None }
    }

    /// Arm a one-shot binding firing once after `duration`.
    ///
    /// Any previous binding is discarded.
    pub fn arm(&mut self, duration: Duration, phase: P) {
        debug!(?phase, ?duration, "Arming timer");
        self.bind(duration, phase, None);
    }

    /// Arm a periodic binding firing every `period` until disarmed or
    /// replaced.
    pub fn arm_periodic(&mut self, period: Duration, phase: P) {
        debug!(?phase, ?period, "Arming periodic timer");
        self.bind(period, phase, Some(period));
    }

    /// Drop the current binding, if any.
    pub fn disarm(&mut self) {
        if let Some(binding) = self.binding.take() {
            debug!(phase = ?binding.phase, "Timer disarmed");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.binding.is_some()
    }

    /// Phase of the current binding.
    pub fn armed_phase(&self) -> Option<P> {
        self.binding.as_ref().map(|b| b.phase)
    }

    /// Time left until the current binding fires.
    pub fn remaining(&self) -> Option<Duration> {
        self.binding
            .as_ref()
            .map(|b| b.sleep.deadline().saturating_duration_since(Instant::now()))
    }

    /// Wait for the current binding to fire and return its phase.
    ///
    /// Never completes while the slot is unarmed. A one-shot binding is
    /// cleared when it fires; a periodic one is pushed one period further.
    ///
    /// Cancel safe: dropping the future before it completes leaves the
    /// binding untouched.
    pub async fn expired(&mut self) -> P {
        let Some(binding) = self.binding.as_mut() else {
            return std::future::pending().await;
        };

        binding.sleep.as_mut().await;
        let phase = binding.phase;
        let period = binding.period;

        match period {
            Some(period) => {
                let next = binding.sleep.deadline() + period;
                binding.sleep.as_mut().reset(next);
            }
            None => self.binding = None,
        }
        phase
    }

    fn bind(&mut self, duration: Duration, phase: P, period: Option<Duration>) {
        self.binding = Some(Binding {
            phase,
            sleep: Box::pin(tokio::time::sleep(duration)),
            period,
        });
    }
}

impl<P> Default for TimerSlot<P>
where
    P: Copy + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P: fmt::Debug> fmt::Debug for TimerSlot<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("TimerSlot");
        match &self.binding {
            Some(binding) => s
                .field("phase", &binding.phase)
                .field("deadline", &binding.sleep.deadline())
                .field("period", &binding.period),
            None => s.field("phase", &Option::<P>::None),
        }
        .finish()
    }
}
