//! Terminal devices for the simulator.
//!
//! The display and the actuators print to stdout; logs go to stderr so the
//! two streams can be separated. Keys come from stdin one line at a time.

use std::io::Write;

use doorlock_core::MotorDirection;
use doorlock_hardware::mock::MockKeypadHandle;
use doorlock_hardware::{Alarm, HardwareError, KeypadInput, LineDisplay, Motor, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

const ROWS: usize = 2;
const COLUMNS: usize = 16;

/// 2x16 character display drawn as a framed box on every update.
#[derive(Debug)]
pub struct ConsoleDisplay {
    rows: Vec<String>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self {
            rows: vec![String::new(); ROWS],
        }
    }

    fn frame(&self) -> String {
        let border = format!("+{}+", "-".repeat(COLUMNS));
        let mut frame = border.clone();
        for row in &self.rows {
            frame.push_str(&format!("\n|{row:<COLUMNS$}|"));
        }
        frame.push('\n');
        frame.push_str(&border);
        frame
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDisplay for ConsoleDisplay {
    fn render_line(&mut self, row: usize, text: &str) -> Result<()> {
        let Some(line) = self.rows.get_mut(row) else {
            return Err(HardwareError::invalid_data(format!(
                "Line {row} out of range (max {})",
                ROWS - 1
            )));
        };
        *line = text.chars().take(COLUMNS).collect();

        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", self.frame())?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.rows.iter_mut().for_each(String::clear);
        Ok(())
    }
}

/// Door motor reported on stdout.
#[derive(Debug, Default)]
pub struct ConsoleMotor;

impl Motor for ConsoleMotor {
    fn rotate(&mut self, direction: MotorDirection) -> Result<()> {
        writeln!(std::io::stdout(), "[motor] rotating {direction}")?;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        writeln!(std::io::stdout(), "[motor] stopped")?;
        Ok(())
    }
}

/// Buzzer reported on stdout.
#[derive(Debug, Default)]
pub struct ConsoleAlarm;

impl Alarm for ConsoleAlarm {
    fn on(&mut self) -> Result<()> {
        writeln!(std::io::stdout(), "[alarm] ON")?;
        Ok(())
    }

    fn off(&mut self) -> Result<()> {
        writeln!(std::io::stdout(), "[alarm] off")?;
        Ok(())
    }
}

/// Keys typed on one input line, followed by Enter.
///
/// Characters without a key are skipped with a warning.
pub fn keys_for_line(line: &str) -> Vec<KeypadInput> {
    let mut keys: Vec<KeypadInput> = line
        .chars()
        .filter(|c| !c.is_whitespace())
        .filter_map(|c| {
            let key = KeypadInput::from_char(c);
            if key.is_none() {
                warn!("No key for {c:?}");
            }
            key
        })
        .collect();
    keys.push(KeypadInput::Enter);
    keys
}

/// Forward stdin lines to the keypad until stdin closes.
///
/// Dropping `keys` on return disconnects the keypad.
pub async fn feed_keypad(keys: MockKeypadHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        for key in keys_for_line(&line) {
            keys.send_input(key).await?;
        }
    }
    debug!("stdin closed");
    Ok(())
}
