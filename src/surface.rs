//! Display/audio/input surface abstraction
//!
//! The trial engine and the session orchestrator never talk to a terminal,
//! a window or a sound card directly; they consume the `Surface` trait:
//! - `draw`/`present`: draw-then-commit display (a bare `present` commits a
//!   blank frame)
//! - `wait_key`: bounded (or unbounded) blocking key read with an accepted
//!   set
//! - `play`: fire-and-forget audio
//! - `elapsed`: monotonic clock
//!
//! `cli` provides the real crossterm/rodio implementation; `sim` provides a
//! scripted one for tests.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

/// A key the experiment distinguishes. Everything else is dropped at the
/// surface boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character (space included, as `Char(' ')`)
    Char(char),
    Enter,
    Escape,
}

impl Key {
    /// Human-readable label for on-screen hints
    pub fn label(&self) -> String {
        match self {
            Key::Char(' ') => "SPACE".to_string(),
            Key::Char(c) => c.to_uppercase().to_string(),
            Key::Enter => "ENTER".to_string(),
            Key::Escape => "ESC".to_string(),
        }
    }
}

/// Key assignments for one session
///
/// `first`/`second` answer "which word matches the photo"; `cancel` aborts
/// the session; `resume` is the deliberate two-step rest-break gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub first: Key,
    pub second: Key,
    pub cancel: Key,
    pub resume: (Key, Key),
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            first: Key::Char('q'),
            second: Key::Char('p'),
            cancel: Key::Escape,
            resume: (Key::Char('z'), Key::Char('m')),
        }
    }
}

impl KeyBindings {
    /// All five bound keys must be pairwise distinct, otherwise a response
    /// could be read as a cancellation (or vice versa) mid-trial.
    pub fn validate(&self) -> Result<()> {
        let keys = [
            self.first,
            self.second,
            self.cancel,
            self.resume.0,
            self.resume.1,
        ];
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                if keys[i] == keys[j] {
                    return Err(Error::Config(format!(
                        "key {} is bound twice",
                        keys[i].label()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Handle to a photo stimulus. Opened once per configuration row and shared
/// by every trial generated from it.
#[derive(Debug)]
pub struct ImageRef {
    path: PathBuf,
    label: String,
}

impl ImageRef {
    /// Verifies the file is readable now so a missing photo surfaces at
    /// session setup instead of mid-block.
    pub fn open(path: &Path) -> Result<Arc<Self>> {
        File::open(path).map_err(|_| Error::AssetMissing {
            path: path.to_path_buf(),
        })?;
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Arc::new(ImageRef {
            path: path.to_path_buf(),
            label,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem, used by placeholder renderers
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Test constructor that skips the filesystem check
    #[cfg(test)]
    pub fn fake(label: &str) -> Arc<Self> {
        Arc::new(ImageRef {
            path: PathBuf::from(format!("{label}.jpeg")),
            label: label.to_string(),
        })
    }
}

/// Handle to an audio clip, played fire-and-forget at stimulus onset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRef {
    path: PathBuf,
}

impl AudioRef {
    pub fn open(path: &Path) -> Result<Self> {
        File::open(path).map_err(|_| Error::AssetMissing {
            path: path.to_path_buf(),
        })?;
        Ok(AudioRef {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn fake(name: &str) -> Self {
        AudioRef {
            path: PathBuf::from(format!("{name}.wav")),
        }
    }
}

/// Everything a surface can be asked to draw
#[derive(Debug, Clone, Copy)]
pub enum Visual<'a> {
    /// Central fixation cross
    Fixation,
    /// Photo stimulus (terminals render a labeled placeholder box)
    Image(&'a ImageRef),
    /// Candidate word, centered
    Word(&'a str),
    /// Right/wrong feedback scene
    Feedback { correct: bool },
    /// "Round N" splash before a block
    RoundIntro { round: usize },
    /// "Too slow" notice after a finite final gap elapses
    SlowNotice,
    /// Rest checkpoint with the resume gesture hint
    RestBreak { resume: (Key, Key) },
}

/// The display/audio/input capabilities the core consumes.
///
/// Single-threaded, phase-blocking: `wait_key` is the only suspension point,
/// and `play` returns immediately.
pub trait Surface {
    /// Queue an element for the next `present`
    fn draw(&mut self, element: &Visual) -> Result<()>;

    /// Commit everything drawn since the last present; with nothing drawn,
    /// commits a blank frame
    fn present(&mut self) -> Result<()>;

    /// Block until an accepted key arrives or `timeout` elapses
    /// (`None` = wait indefinitely).
    ///
    /// Contract: stale input buffered before the call is discarded, and when
    /// several accepted keys sit in the same ready batch, the one listed
    /// latest in `accepted` wins. Callers list the cancellation key last so
    /// it beats a simultaneous response key.
    fn wait_key(&mut self, timeout: Option<Duration>, accepted: &[Key]) -> Result<Option<Key>>;

    /// Start playback and return without awaiting it
    fn play(&mut self, clip: &AudioRef) -> Result<()>;

    /// Monotonic time since the surface was brought up
    fn elapsed(&self) -> Duration;
}
