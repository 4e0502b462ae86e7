//! Session state machine shared by both units.
//!
//! Wraps a [`SessionState`] so that every change goes through the legal
//! transition table, is recorded in a bounded history and is published to
//! observers.
//!
//! # Valid Transitions
//!
//! - AwaitingNewPassword → Authenticated
//! - Authenticated → AwaitingNewPassword / DoorUnlocking / LockedOut
//! - DoorUnlocking → DoorOpen → DoorLocking → Authenticated
//! - LockedOut → Authenticated
//!
//! # Examples
//!
//! ```
//! use doorlock_core::SessionState;
//! use doorlock_emulator::StateMachine;
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_state(), SessionState::AwaitingNewPassword);
//!
//! machine.transition_to(SessionState::Authenticated).unwrap();
//! assert!(machine.transition_to(SessionState::DoorOpen).is_err());
//! assert_eq!(machine.history().len(), 1);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;

use doorlock_core::{Error, Result, SessionState};

/// Maximum number of state transitions to keep in history.
///
/// A full door cycle is four transitions and a lockout two, so 100 entries
/// cover well over a dozen complete sessions.
const MAX_HISTORY_SIZE: usize = 100;

/// Represents a single state transition with timestamp.
///
/// # Serialization Note
///
/// The `timestamp` field is not serialized as `Instant` is process-specific.
/// When deserializing, the timestamp will be set to the current time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: SessionState,

    /// The state transitioned to.
    pub to: SessionState,

    /// When the transition occurred.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: SessionState, to: SessionState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Get the duration since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// Validated, observable session state.
///
/// # Thread Safety
///
/// Mutation requires `&mut self`: each unit owns its machine and is the
/// only writer. Other tasks observe it through [`subscribe`](Self::subscribe).
#[derive(Debug)]
pub struct StateMachine {
    /// Current session state.
    current_state: SessionState,

    /// When the current state was entered.
    state_entered_at: Instant,

    /// History of state transitions (limited to MAX_HISTORY_SIZE).
    history: VecDeque<StateTransition>,

    /// Publishes every new state.
    publisher: watch::Sender<SessionState>,
}

impl StateMachine {
    /// Create a new state machine in `AwaitingNewPassword`.
    pub fn new() -> Self {
        let initial = SessionState::default();
        let (publisher, _) = watch::channel(initial);
        Self {
            current_state: initial,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            publisher,
        }
    }

    pub fn current_state(&self) -> SessionState {
        self.current_state
    }

    /// Get the time elapsed in the current state.
    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Receiver that observes every published state, starting with the
    /// current one.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.publisher.subscribe()
    }

    /// Get a reference to the state transition history, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last N state transitions.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not in
    /// the legal table; the state is left unchanged.
    pub fn transition_to(&mut self, new_state: SessionState) -> Result<StateTransition> {
        // Validate transition before making any changes
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);

        self.current_state = new_state;
        self.state_entered_at = transition.timestamp;
        self.add_to_history(transition.clone());
        self.publisher.send_replace(new_state);

        Ok(transition)
    }

    fn add_to_history(&mut self, transition: StateTransition) {
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use doorlock_core::SessionState::*;

    fn machine_in(path: &[SessionState]) -> StateMachine {
        let mut machine = StateMachine::new();
        for state in path {
            machine.transition_to(*state).unwrap();
        }
        machine
    }

    #[test]
    fn test_new_machine_awaits_password() {
        let machine = StateMachine::new();
        assert_eq!(machine.current_state(), AwaitingNewPassword);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_full_door_cycle() {
        let machine = machine_in(&[
            Authenticated,
            DoorUnlocking,
            DoorOpen,
            DoorLocking,
            Authenticated,
        ]);

        assert_eq!(machine.current_state(), Authenticated);
        let to: Vec<_> = machine.history().iter().map(|t| t.to).collect();
        assert_eq!(
            to,
            vec![Authenticated, DoorUnlocking, DoorOpen, DoorLocking, Authenticated]
        );
    }

    #[rstest]
    #[case(&[], DoorUnlocking)]
    #[case(&[], LockedOut)]
    #[case(&[Authenticated], DoorOpen)]
    #[case(&[Authenticated, DoorUnlocking], Authenticated)]
    #[case(&[Authenticated, DoorUnlocking], LockedOut)]
    #[case(&[Authenticated, LockedOut], DoorUnlocking)]
    #[case(&[Authenticated, LockedOut], AwaitingNewPassword)]
    fn test_invalid_transition_rejected(
        #[case] path: &[SessionState],
        #[case] target: SessionState,
    ) {
        let mut machine = machine_in(path);
        let before = machine.current_state();

        let result = machine.transition_to(target);
        assert!(matches!(result, Err(Error::InvalidStateTransition { .. })));
        assert_eq!(machine.current_state(), before);
        assert_eq!(machine.history().len(), path.len());
    }

    #[test]
    fn test_transition_error_names_states() {
        let mut machine = StateMachine::new();
        let err = machine.transition_to(DoorOpen).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid state transition from AwaitingNewPassword to DoorOpen"
        );
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = machine_in(&[Authenticated]);
        for _ in 0..60 {
            machine.transition_to(LockedOut).unwrap();
            machine.transition_to(Authenticated).unwrap();
        }

        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        assert_eq!(machine.history().back().unwrap().to, Authenticated);
    }

    #[test]
    fn test_last_transitions() {
        let machine = machine_in(&[Authenticated, DoorUnlocking, DoorOpen]);
        let last = machine.last_transitions(2);

        assert_eq!(last.len(), 2);
        assert_eq!(last[0].to, DoorUnlocking);
        assert_eq!(last[1].to, DoorOpen);
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let mut machine = StateMachine::new();
        let mut rx = machine.subscribe();
        assert_eq!(*rx.borrow(), AwaitingNewPassword);

        machine.transition_to(Authenticated).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Authenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_in_current_state() {
        let mut machine = machine_in(&[Authenticated]);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(machine.time_in_current_state() >= Duration::from_secs(3));

        machine.transition_to(LockedOut).unwrap();
        assert!(machine.time_in_current_state() < Duration::from_secs(1));
    }

    #[test]
    fn test_transition_serialization_skips_timestamp() {
        let transition = StateTransition::new(LockedOut, Authenticated);
        let json = serde_json::to_string(&transition).unwrap();
        assert_eq!(json, r#"{"from":"locked_out","to":"authenticated"}"#);
    }
}
