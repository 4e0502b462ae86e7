//! Shared rigs for the unit and end-to-end scenarios.
//!
//! Every scenario runs on a paused clock: a door cycle or a lockout takes
//! simulated seconds, not real ones. Units are driven in the test task with
//! `select!` next to the scenario script, which observes them through their
//! state watchers and device handles.

#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use tokio::io::DuplexStream;
use tokio::sync::watch;

use doorlock_core::{DoorlockConfig, Password, Reply, SessionState};
use doorlock_emulator::{ControlUnit, InterfaceUnit, UnitError};
use doorlock_hardware::mock::{
    AlarmHandle, DisplayHandle, MemoryStore, MemoryStoreHandle, MockAlarm, MockKeypad,
    MockKeypadHandle, MockMotor, MotorHandle, VirtualDisplay,
};
use doorlock_protocol::Link;

/// Upper bound on the simulated duration of one scenario.
pub const SCENARIO_LIMIT: Duration = Duration::from_secs(3600);

pub type Iu = InterfaceUnit<DuplexStream, MockKeypad, VirtualDisplay>;
pub type Cu = ControlUnit<DuplexStream, MockMotor, MockAlarm, MemoryStore>;

/// Control Unit with the test holding the Interface Unit end of the link.
pub struct ControlRig {
    pub cu: Cu,
    pub link: Link<DuplexStream>,
    pub motor: MotorHandle,
    pub alarm: AlarmHandle,
    pub cells: MemoryStoreHandle,
}

pub fn control_rig(config: DoorlockConfig) -> ControlRig {
    let (iu_io, cu_io) = tokio::io::duplex(64);
    let (motor, motor_handle) = MockMotor::new();
    let (alarm, alarm_handle) = MockAlarm::new();
    let (store, cells) = MemoryStore::new(5);

    ControlRig {
        cu: ControlUnit::new(cu_io, motor, alarm, store, config),
        link: Link::new(iu_io, None),
        motor: motor_handle,
        alarm: alarm_handle,
        cells,
    }
}

/// Interface Unit with the test holding the Control Unit end of the link.
pub struct InterfaceRig {
    pub iu: Iu,
    pub link: Link<DuplexStream>,
    pub keys: MockKeypadHandle,
    pub screen: DisplayHandle,
}

pub fn interface_rig(config: DoorlockConfig) -> InterfaceRig {
    let (iu_io, cu_io) = tokio::io::duplex(64);
    let (keypad, keys) = MockKeypad::new();
    let (display, screen) = VirtualDisplay::new();

    InterfaceRig {
        iu: InterfaceUnit::new(iu_io, keypad, display, config),
        link: Link::new(cu_io, None),
        keys,
        screen,
    }
}

/// Both units wired together.
pub struct System {
    pub iu: Iu,
    pub cu: Cu,
    pub keys: MockKeypadHandle,
    pub screen: DisplayHandle,
    pub motor: MotorHandle,
    pub alarm: AlarmHandle,
    pub cells: MemoryStoreHandle,
}

pub fn system(config: DoorlockConfig) -> System {
    let (iu_io, cu_io) = tokio::io::duplex(64);
    let (keypad, keys) = MockKeypad::new();
    let (display, screen) = VirtualDisplay::new();
    let (motor, motor_handle) = MockMotor::new();
    let (alarm, alarm_handle) = MockAlarm::new();
    let (store, cells) = MemoryStore::new(5);

    System {
        iu: InterfaceUnit::new(iu_io, keypad, display, config.clone()),
        cu: ControlUnit::new(cu_io, motor, alarm, store, config),
        keys,
        screen,
        motor: motor_handle,
        alarm: alarm_handle,
        cells,
    }
}

/// Run `script` while `unit` runs; the unit must outlive the script.
pub async fn with_unit<U, F>(unit: U, script: F) -> F::Output
where
    U: Future<Output = doorlock_emulator::Result<()>>,
    F: Future,
{
    let scenario = async {
        tokio::select! {
            result = unit => panic!("unit stopped: {result:?}"),
            output = script => output,
        }
    };
    tokio::time::timeout(SCENARIO_LIMIT, scenario)
        .await
        .expect("scenario timed out")
}

/// Run `script` while both units run; neither may stop first.
pub async fn with_units<I, C, F>(iu: I, cu: C, script: F) -> F::Output
where
    I: Future<Output = doorlock_emulator::Result<()>>,
    C: Future<Output = doorlock_emulator::Result<()>>,
    F: Future,
{
    let scenario = async {
        tokio::select! {
            result = iu => panic!("interface unit stopped: {result:?}"),
            result = cu => panic!("control unit stopped: {result:?}"),
            output = script => output,
        }
    };
    tokio::time::timeout(SCENARIO_LIMIT, scenario)
        .await
        .expect("scenario timed out")
}

/// Run `script` and return the error `unit` stops with.
pub async fn until_failure<U, F>(unit: U, script: F) -> UnitError
where
    U: Future<Output = doorlock_emulator::Result<()>>,
    F: Future<Output = ()>,
{
    let scenario = async {
        tokio::select! {
            result = unit => result.expect_err("unit returned Ok"),
            _ = async { script.await; std::future::pending::<()>().await } => unreachable!(),
        }
    };
    tokio::time::timeout(SCENARIO_LIMIT, scenario)
        .await
        .expect("unit never failed")
}

pub async fn wait_state(rx: &mut watch::Receiver<SessionState>, state: SessionState) {
    rx.wait_for(|s| *s == state)
        .await
        .expect("state publisher dropped");
}

pub fn password(value: &str) -> Password {
    Password::new(value).unwrap()
}

/// Play the Interface Unit side of a successful enrollment.
pub async fn enroll(link: &mut Link<DuplexStream>, value: &str) {
    link.send_password(password(value)).await.unwrap();
    link.send_password(password(value)).await.unwrap();
    assert_eq!(link.recv_reply().await.unwrap(), Reply::Confirm);
}

/// Configuration with the default timings.
pub fn config() -> DoorlockConfig {
    DoorlockConfig::default()
}

/// Assert `elapsed` is `expected`, allowing for millisecond rounding.
pub fn assert_about(elapsed: Duration, expected: Duration) {
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(100),
        "elapsed {elapsed:?}, expected about {expected:?}"
    );
}

pub fn states(history: &[doorlock_emulator::StateTransition]) -> Vec<SessionState> {
    history.iter().map(|t| t.to).collect()
}
