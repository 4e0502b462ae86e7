//! Both units wired over an in-memory link, driven from the keypad.

mod common;

use std::time::Duration;

use tokio::time::Instant;

use common::{System, assert_about, config, states, system, wait_state, with_units};
use doorlock_core::{MotorDirection, SessionState};
use doorlock_emulator::interface::notice;
use doorlock_hardware::mock::MotorCommand;

#[tokio::test(start_paused = true)]
async fn test_enroll_then_open_door() {
    let System {
        mut iu,
        mut cu,
        keys,
        screen,
        motor,
        cells,
        ..
    } = system(config());
    let mut cu_state = cu.subscribe();
    let mut iu_state = iu.subscribe();

    let elapsed = with_units(iu.run(), cu.run(), async {
        keys.send_password("2580").await.unwrap();
        keys.send_password("2580").await.unwrap();
        wait_state(&mut cu_state, SessionState::Authenticated).await;
        wait_state(&mut iu_state, SessionState::Authenticated).await;

        keys.send_keys("+").await.unwrap();
        keys.send_password("2580").await.unwrap();
        wait_state(&mut cu_state, SessionState::DoorUnlocking).await;
        let start = Instant::now();

        wait_state(&mut cu_state, SessionState::Authenticated).await;
        wait_state(&mut iu_state, SessionState::Authenticated).await;
        start.elapsed()
    })
    .await;

    assert_about(elapsed, Duration::from_secs(33));
    assert_eq!(cells.snapshot(), b"2580#");
    assert_eq!(
        motor.commands(),
        vec![
            MotorCommand::Rotate(MotorDirection::Clockwise),
            MotorCommand::Stop,
            MotorCommand::Rotate(MotorDirection::CounterClockwise),
            MotorCommand::Stop,
        ]
    );
    assert!(screen.has_shown(notice::UNLOCKED));
    assert_eq!(states(&iu.history()), states(&cu.history()));
}

#[tokio::test(start_paused = true)]
async fn test_enrollment_mismatch_then_match() {
    let System {
        mut iu,
        mut cu,
        keys,
        screen,
        cells,
        ..
    } = system(config());
    let mut cu_state = cu.subscribe();

    with_units(iu.run(), cu.run(), async {
        keys.send_keys("1234\n1235\n").await.unwrap();
        keys.send_keys("77\n77\n").await.unwrap();
        wait_state(&mut cu_state, SessionState::Authenticated).await;
    })
    .await;

    assert_eq!(screen.count_shown(notice::MISMATCH), 1);
    assert_eq!(cells.snapshot(), b"77###");
    assert_eq!(cells.writes(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_three_wrong_passwords_lock_both_units() {
    let System {
        mut iu,
        mut cu,
        keys,
        screen,
        alarm,
        motor,
        ..
    } = system(config());
    let mut cu_state = cu.subscribe();
    let mut iu_state = iu.subscribe();

    let elapsed = with_units(iu.run(), cu.run(), async {
        keys.send_keys("1234\n1234\n").await.unwrap();
        wait_state(&mut iu_state, SessionState::Authenticated).await;

        keys.send_keys("+0000\n0000\n0000\n").await.unwrap();
        wait_state(&mut cu_state, SessionState::LockedOut).await;
        wait_state(&mut iu_state, SessionState::LockedOut).await;
        let start = Instant::now();
        assert!(alarm.is_on());
        assert!(screen.line(0).starts_with(notice::THIEF));

        // Typed during the lockout: must not reach the control unit.
        keys.send_keys("+1234\n").await.unwrap();

        wait_state(&mut cu_state, SessionState::Authenticated).await;
        wait_state(&mut iu_state, SessionState::Authenticated).await;
        start.elapsed()
    })
    .await;

    assert_about(elapsed, Duration::from_secs(60));
    assert!(!alarm.is_on());
    assert!(motor.commands().is_empty());
    assert_eq!(cu.retry_count(), 0);
    assert_eq!(screen.count_shown(notice::ENTER_PASSWORD), 4);
}

#[tokio::test(start_paused = true)]
async fn test_door_opens_after_lockout() {
    let System {
        mut iu,
        mut cu,
        keys,
        motor,
        ..
    } = system(config());
    let mut cu_state = cu.subscribe();
    let mut iu_state = iu.subscribe();

    with_units(iu.run(), cu.run(), async {
        keys.send_keys("1234\n1234\n").await.unwrap();
        wait_state(&mut iu_state, SessionState::Authenticated).await;
        keys.send_keys("+0000\n0000\n0000\n").await.unwrap();
        wait_state(&mut iu_state, SessionState::LockedOut).await;
        wait_state(&mut iu_state, SessionState::Authenticated).await;

        // Two failures are allowed again before the third locks out.
        keys.send_keys("+0000\n0000\n1234\n").await.unwrap();
        wait_state(&mut cu_state, SessionState::DoorUnlocking).await;
    })
    .await;

    assert_eq!(motor.running(), Some(MotorDirection::Clockwise));
    assert_eq!(
        states(&cu.history())
            .iter()
            .filter(|s| **s == SessionState::LockedOut)
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_change_password_from_keypad() {
    let System {
        mut iu,
        mut cu,
        keys,
        cells,
        ..
    } = system(config());
    let mut cu_state = cu.subscribe();
    let mut iu_state = iu.subscribe();

    with_units(iu.run(), cu.run(), async {
        keys.send_keys("1234\n1234\n").await.unwrap();
        wait_state(&mut cu_state, SessionState::Authenticated).await;

        keys.send_keys("-1234\n").await.unwrap();
        wait_state(&mut cu_state, SessionState::AwaitingNewPassword).await;
        wait_state(&mut iu_state, SessionState::AwaitingNewPassword).await;

        keys.send_keys("9*9\n9*9\n").await.unwrap();
        wait_state(&mut cu_state, SessionState::Authenticated).await;
        wait_state(&mut iu_state, SessionState::Authenticated).await;

        keys.send_keys("+9*9\n").await.unwrap();
        wait_state(&mut cu_state, SessionState::DoorUnlocking).await;
    })
    .await;

    assert_eq!(cells.snapshot(), b"9*9##");
}
