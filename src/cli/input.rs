//! Raw-mode key capture using crossterm
//!
//! The reader implements the surface `wait_key` contract: stale input is
//! drained at call start, waits are bounded by a wall-clock deadline (or
//! unbounded), only key-press events count, and within a ready batch the
//! key listed latest in the accepted set wins.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::Result;
use crate::surface::Key;

/// How often an unbounded wait re-polls
const IDLE_POLL_MS: u64 = 250;

/// Reads experiment keys from the raw-mode terminal
pub struct InputReader;

impl InputReader {
    pub fn enable_raw_mode() -> Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(())
    }

    pub fn disable_raw_mode() -> Result<()> {
        crossterm::terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Map a crossterm event to an experiment key. Repeats/releases and
    /// modified characters are dropped; Ctrl+C arrives as `Escape` so the
    /// default cancellation binding covers it.
    fn translate(key: &KeyEvent) -> Option<Key> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Key::Escape)
            }
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(Key::Char(c))
            }
            KeyCode::Enter => Some(Key::Enter),
            KeyCode::Esc => Some(Key::Escape),
            _ => None,
        }
    }

    /// Discard everything buffered before the wait starts
    fn drain(&self) -> Result<()> {
        while event::poll(Duration::ZERO)? {
            let _ = event::read()?;
        }
        Ok(())
    }

    /// Everything ready right now, as one batch
    fn ready_batch(&self) -> Result<Vec<Key>> {
        let mut batch = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(key) = Self::translate(&key) {
                    batch.push(key);
                }
            }
        }
        Ok(batch)
    }

    /// Block until an accepted key arrives or the deadline passes
    pub fn wait_key(&self, timeout: Option<Duration>, accepted: &[Key]) -> Result<Option<Key>> {
        self.drain()?;
        let deadline = timeout.map(|dwell| Instant::now() + dwell);
        loop {
            let poll_for = match deadline {
                Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(left) => left,
                    None => return Ok(None),
                },
                None => Duration::from_millis(IDLE_POLL_MS),
            };
            if !event::poll(poll_for)? {
                if deadline.is_some() {
                    return Ok(None);
                }
                continue;
            }
            // later entries in `accepted` take precedence within a batch
            let mut hit: Option<Key> = None;
            let mut best = 0;
            for key in self.ready_batch()? {
                if let Some(pos) = accepted.iter().position(|k| *k == key) {
                    if hit.is_none() || pos >= best {
                        hit = Some(key);
                        best = pos;
                    }
                }
            }
            if hit.is_some() {
                return Ok(hit);
            }
        }
    }
}

impl Default for InputReader {
    fn default() -> Self {
        InputReader
    }
}
