//! Scripted surface for tests
//!
//! `SimSurface` replaces the terminal with a virtual clock and a fixed key
//! script: every `wait_key` either jumps the clock to the next scripted key
//! it accepts or to its own deadline. Presented frames and played clips are
//! logged so tests can assert on what the subject would have seen and heard.

use std::collections::VecDeque;
use std::mem;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::surface::{AudioRef, Key, Surface, Visual};

/// Deterministic stand-in for the terminal surface
pub struct SimSurface {
    now: Duration,
    script: VecDeque<(Duration, Key)>,
    pending: Vec<String>,
    /// Every committed frame, as drawn-element labels (empty = blank frame)
    pub frames: Vec<Vec<String>>,
    /// Clips started, with the virtual time of each start
    pub played: Vec<(Duration, PathBuf)>,
}

impl SimSurface {
    /// Builds a surface around `(millisecond, key)` press events. Events at
    /// the same millisecond arrive as one batch.
    pub fn new(script: Vec<(u64, Key)>) -> Self {
        let mut script: Vec<(Duration, Key)> = script
            .into_iter()
            .map(|(ms, key)| (Duration::from_millis(ms), key))
            .collect();
        script.sort_by_key(|(t, _)| *t);
        SimSurface {
            now: Duration::ZERO,
            script: script.into(),
            pending: Vec::new(),
            frames: Vec::new(),
            played: Vec::new(),
        }
    }
}

impl Surface for SimSurface {
    fn draw(&mut self, element: &Visual) -> Result<()> {
        self.pending.push(match element {
            Visual::Fixation => "fixation".to_string(),
            Visual::Image(img) => format!("image:{}", img.label()),
            Visual::Word(word) => format!("word:{word}"),
            Visual::Feedback { correct: true } => "feedback:right".to_string(),
            Visual::Feedback { correct: false } => "feedback:wrong".to_string(),
            Visual::RoundIntro { round } => format!("round:{round}"),
            Visual::SlowNotice => "slow".to_string(),
            Visual::RestBreak { .. } => "rest".to_string(),
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.frames.push(mem::take(&mut self.pending));
        Ok(())
    }

    fn wait_key(&mut self, timeout: Option<Duration>, accepted: &[Key]) -> Result<Option<Key>> {
        // stale input from before this wait is discarded
        while matches!(self.script.front(), Some((t, _)) if *t < self.now) {
            self.script.pop_front();
        }
        let deadline = timeout.map(|dwell| self.now + dwell);
        while let Some(&(arrival, _)) = self.script.front() {
            if let Some(deadline) = deadline {
                if arrival > deadline {
                    break;
                }
            }
            // the whole same-timestamp batch arrives at once
            let mut batch = Vec::new();
            while matches!(self.script.front(), Some((t, _)) if *t == arrival) {
                batch.push(self.script.pop_front().unwrap().1);
            }
            // later entries in `accepted` take precedence within a batch
            let mut hit: Option<Key> = None;
            let mut best = 0;
            for key in batch {
                if let Some(pos) = accepted.iter().position(|k| *k == key) {
                    if hit.is_none() || pos >= best {
                        hit = Some(key);
                        best = pos;
                    }
                }
            }
            if let Some(key) = hit {
                self.now = arrival;
                return Ok(Some(key));
            }
        }
        match deadline {
            Some(deadline) => {
                self.now = deadline;
                Ok(None)
            }
            None => panic!("unbounded simulated wait ran out of scripted keys"),
        }
    }

    fn play(&mut self, clip: &AudioRef) -> Result<()> {
        self.played.push((self.now, clip.path().to_path_buf()));
        Ok(())
    }

    fn elapsed(&self) -> Duration {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_advances_the_clock() {
        let mut io = SimSurface::new(vec![]);
        let key = io
            .wait_key(Some(Duration::from_millis(700)), &[Key::Escape])
            .unwrap();
        assert_eq!(key, None);
        assert_eq!(io.elapsed(), Duration::from_millis(700));
    }

    #[test]
    fn test_unaccepted_keys_are_skipped() {
        let mut io = SimSurface::new(vec![(100, Key::Char('x')), (200, Key::Escape)]);
        let key = io
            .wait_key(Some(Duration::from_millis(500)), &[Key::Escape])
            .unwrap();
        assert_eq!(key, Some(Key::Escape));
        assert_eq!(io.elapsed(), Duration::from_millis(200));
    }

    #[test]
    fn test_stale_input_is_drained() {
        let mut io = SimSurface::new(vec![(50, Key::Escape)]);
        // first wait runs past the press without accepting it
        io.wait_key(Some(Duration::from_millis(100)), &[Key::Char('q')])
            .unwrap();
        // the buffered escape must not leak into the next wait
        let key = io
            .wait_key(Some(Duration::from_millis(100)), &[Key::Escape])
            .unwrap();
        assert_eq!(key, None);
    }

    #[test]
    fn test_last_listed_key_wins_within_a_batch() {
        let mut io = SimSurface::new(vec![(100, Key::Char('q')), (100, Key::Escape)]);
        let key = io
            .wait_key(
                Some(Duration::from_millis(500)),
                &[Key::Char('q'), Key::Char('p'), Key::Escape],
            )
            .unwrap();
        assert_eq!(key, Some(Key::Escape));
    }
}
