//! Brute-force protection counters.
//!
//! [`RetryCounter`] lives on the Control Unit and decides between `REPEAT`
//! and `WRONG` after a failed verification. [`LockoutCountdown`] runs on both
//! units and counts periodic timer firings until the lockout is over.

use doorlock_core::Reply;

/// Outcome of recording a failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Attempts remain; the user may try again.
    Retry { remaining: u8 },
    /// The limit was reached; the counter has been reset.
    Lockout,
}

impl AttemptOutcome {
    /// Reply sent to the Interface Unit for this outcome.
    pub fn reply(self) -> Reply {
        match self {
            AttemptOutcome::Retry { .. } => Reply::Repeat,
            AttemptOutcome::Lockout => Reply::Wrong,
        }
    }
}

/// Consecutive failed verifications, always below `max_attempts`.
#[derive(Debug, Clone)]
pub struct RetryCounter {
    failures: u8,
    max_attempts: u8,
}

impl RetryCounter {
    pub fn new(max_attempts: u8) -> Self {
        Self {
            failures: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Count one failure.
    ///
    /// Reaching the limit resets the counter, so counting starts over once
    /// the lockout has been served.
    pub fn record_failure(&mut self) -> AttemptOutcome {
        self.failures += 1;
        if self.failures >= self.max_attempts {
            self.failures = 0;
            AttemptOutcome::Lockout
        } else {
            AttemptOutcome::Retry {
                remaining: self.max_attempts - self.failures,
            }
        }
    }

    /// Forget past failures after a successful verification.
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u8 {
        self.failures
    }
}

/// Counts lockout timer firings.
#[derive(Debug, Clone)]
pub struct LockoutCountdown {
    ticks: u32,
    required: u32,
}

impl LockoutCountdown {
    pub fn new(required: u32) -> Self {
        Self {
            ticks: 0,
            required: required.max(1),
        }
    }

    /// Count one firing. Returns `true` on the firing that ends the lockout,
    /// after which the count is back at zero.
    pub fn tick(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks >= self.required {
            self.ticks = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.ticks = 0;
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}
