//! Virtual character LCD.
//!
//! Simulates the 2-line x 16-column display of the Interface Unit. The
//! display keeps the current screen plus a log of every line rendered, so a
//! test can assert on the notices a unit produced without racing it.
//!
//! # Character Encoding
//!
//! Only printable ASCII reaches the buffer: control characters are dropped
//! and text is truncated to the column width, as the physical controller
//! would.
//!
//! # Examples
//!
//! ```
//! use doorlock_hardware::mock::VirtualDisplay;
//! use doorlock_hardware::traits::LineDisplay;
//!
//! let (mut display, handle) = VirtualDisplay::new();
//! display.render_line(0, "DOOR IS").unwrap();
//! display.render_line(1, "UNLOCKING").unwrap();
//!
//! assert_eq!(handle.line(0).trim_end(), "DOOR IS");
//! assert!(handle.has_shown("UNLOCKING"));
//! ```

use std::sync::{Arc, Mutex};

use super::lock;
use crate::{HardwareError, Result, traits::LineDisplay};

/// Number of display lines (standard LCD configuration).
const DEFAULT_LINES: usize = 2;

/// Number of characters per line (standard LCD configuration).
const DEFAULT_COLUMNS: usize = 16;

#[derive(Debug)]
struct Screen {
    columns: usize,
    buffer: Vec<String>,
    log: Vec<String>,
}

/// Virtual LCD implementing [`LineDisplay`].
#[derive(Debug)]
pub struct VirtualDisplay {
    screen: Arc<Mutex<Screen>>,
}

impl VirtualDisplay {
    /// Create a 2x16 display and its inspection handle.
    pub fn new() -> (Self, DisplayHandle) {
        Self::with_size(DEFAULT_LINES, DEFAULT_COLUMNS)
    }

    /// Create a display with custom dimensions.
    pub fn with_size(lines: usize, columns: usize) -> (Self, DisplayHandle) {
        let screen = Arc::new(Mutex::new(Screen {
            columns,
            buffer: vec![" ".repeat(columns); lines],
            log: Vec::new(),
        }));
        (
            Self {
                screen: Arc::clone(&screen),
            },
            DisplayHandle { screen },
        )
    }
}

impl LineDisplay for VirtualDisplay {
    fn render_line(&mut self, row: usize, text: &str) -> Result<()> {
        let mut screen = lock(&self.screen);
        if row >= screen.buffer.len() {
            return Err(HardwareError::invalid_data(format!(
                "Line {} out of range (max {})",
                row,
                screen.buffer.len().saturating_sub(1)
            )));
        }

        let text = sanitize_text(text);
        let line = pad_text(&text, screen.columns);
        screen.buffer[row] = line;
        if !text.is_empty() {
            screen.log.push(text);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let mut screen = lock(&self.screen);
        let blank = " ".repeat(screen.columns);
        for line in &mut screen.buffer {
            line.clone_from(&blank);
        }
        Ok(())
    }
}

/// Read-only view of a [`VirtualDisplay`].
#[derive(Debug, Clone)]
pub struct DisplayHandle {
    screen: Arc<Mutex<Screen>>,
}

impl DisplayHandle {
    /// Current content of `row`, padded to the width. Empty if the row does
    /// not exist.
    pub fn line(&self, row: usize) -> String {
        lock(&self.screen)
            .buffer
            .get(row)
            .cloned()
            .unwrap_or_default()
    }

    /// Every non-blank line rendered so far, oldest first.
    pub fn log(&self) -> Vec<String> {
        lock(&self.screen).log.clone()
    }

    /// Whether any rendered line contained `text`.
    pub fn has_shown(&self, text: &str) -> bool {
        lock(&self.screen).log.iter().any(|line| line.contains(text))
    }

    /// Number of rendered lines containing `text`.
    pub fn count_shown(&self, text: &str) -> usize {
        lock(&self.screen)
            .log
            .iter()
            .filter(|line| line.contains(text))
            .count()
    }
}

/// Pad or truncate `text` to exactly `width` characters.
fn pad_text(text: &str, width: usize) -> String {
    let mut line: String = text.chars().take(width).collect();
    let len = line.chars().count();
    line.push_str(&" ".repeat(width - len));
    line
}

/// Keep printable ASCII only and trim surrounding blanks.
fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}
