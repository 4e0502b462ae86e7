//! Recording motor and alarm.
//!
//! Both mocks log every command they receive and expose the log through a
//! cloneable handle.

use std::sync::{Arc, Mutex};

use doorlock_core::MotorDirection;
use tracing::debug;

use super::lock;
use crate::{
    Result,
    traits::{Alarm, Motor},
};

/// Command received by a [`MockMotor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    Rotate(MotorDirection),
    Stop,
}

#[derive(Debug, Default)]
struct MotorState {
    running: Option<MotorDirection>,
    commands: Vec<MotorCommand>,
}

/// Mock door motor.
///
/// # Examples
///
/// ```
/// use doorlock_core::MotorDirection;
/// use doorlock_hardware::mock::{MockMotor, MotorCommand};
/// use doorlock_hardware::traits::Motor;
///
/// let (mut motor, handle) = MockMotor::new();
/// motor.rotate(MotorDirection::Clockwise).unwrap();
/// assert_eq!(handle.running(), Some(MotorDirection::Clockwise));
///
/// motor.stop().unwrap();
/// assert_eq!(
///     handle.commands(),
///     vec![MotorCommand::Rotate(MotorDirection::Clockwise), MotorCommand::Stop]
/// );
/// ```
#[derive(Debug)]
pub struct MockMotor {
    state: Arc<Mutex<MotorState>>,
}

impl MockMotor {
    pub fn new() -> (Self, MotorHandle) {
        let state = Arc::new(Mutex::new(MotorState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MotorHandle { state },
        )
    }
}

impl Motor for MockMotor {
    fn rotate(&mut self, direction: MotorDirection) -> Result<()> {
        debug!(%direction, "Motor rotating");
        let mut state = lock(&self.state);
        state.running = Some(direction);
        state.commands.push(MotorCommand::Rotate(direction));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        debug!("Motor stopped");
        let mut state = lock(&self.state);
        state.running = None;
        state.commands.push(MotorCommand::Stop);
        Ok(())
    }
}

/// Inspection handle for a [`MockMotor`].
#[derive(Debug, Clone)]
pub struct MotorHandle {
    state: Arc<Mutex<MotorState>>,
}

impl MotorHandle {
    /// Direction the motor is turning, `None` when stopped.
    pub fn running(&self) -> Option<MotorDirection> {
        lock(&self.state).running
    }

    /// Every command received, oldest first.
    pub fn commands(&self) -> Vec<MotorCommand> {
        lock(&self.state).commands.clone()
    }
}

#[derive(Debug, Default)]
struct AlarmState {
    active: bool,
    activations: usize,
}

/// Mock buzzer.
#[derive(Debug)]
pub struct MockAlarm {
    state: Arc<Mutex<AlarmState>>,
}

impl MockAlarm {
    pub fn new() -> (Self, AlarmHandle) {
        let state = Arc::new(Mutex::new(AlarmState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            AlarmHandle { state },
        )
    }
}

impl Alarm for MockAlarm {
    fn on(&mut self) -> Result<()> {
        debug!("Alarm on");
        let mut state = lock(&self.state);
        if !state.active {
            state.activations += 1;
        }
        state.active = true;
        Ok(())
    }

    fn off(&mut self) -> Result<()> {
        debug!("Alarm off");
        lock(&self.state).active = false;
        Ok(())
    }
}

/// Inspection handle for a [`MockAlarm`].
#[derive(Debug, Clone)]
pub struct AlarmHandle {
    state: Arc<Mutex<AlarmState>>,
}

impl AlarmHandle {
    pub fn is_on(&self) -> bool {
        lock(&self.state).active
    }

    /// Number of off-to-on transitions.
    pub fn activations(&self) -> usize {
        lock(&self.state).activations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motor_records_door_cycle() {
        let (mut motor, handle) = MockMotor::new();

        motor.rotate(MotorDirection::Clockwise).unwrap();
        motor.stop().unwrap();
        motor.rotate(MotorDirection::CounterClockwise).unwrap();
        assert_eq!(handle.running(), Some(MotorDirection::CounterClockwise));
        motor.stop().unwrap();

        assert_eq!(handle.running(), None);
        assert_eq!(
            handle.commands(),
            vec![
                MotorCommand::Rotate(MotorDirection::Clockwise),
                MotorCommand::Stop,
                MotorCommand::Rotate(MotorDirection::CounterClockwise),
                MotorCommand::Stop,
            ]
        );
    }

    #[test]
    fn test_alarm_counts_activations() {
        let (mut alarm, handle) = MockAlarm::new();
        assert!(!handle.is_on());

        alarm.on().unwrap();
        alarm.on().unwrap();
        assert!(handle.is_on());
        assert_eq!(handle.activations(), 1);

        alarm.off().unwrap();
        assert!(!handle.is_on());

        alarm.on().unwrap();
        assert_eq!(handle.activations(), 2);
    }
}
