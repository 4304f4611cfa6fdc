//! Terminal Surface: crossterm rendering, raw-mode key capture, rodio audio
//!
//! # Components
//! - `display.rs`: centered scene rendering onto stdout
//! - `input.rs`: raw-mode bounded key waits
//! - `audio.rs`: detached-sink clip playback

pub mod audio;
pub mod display;
pub mod input;

use std::time::{Duration, Instant};

use log::warn;

use crate::error::Result;
use crate::surface::{AudioRef, Key, Surface, Visual};
use audio::AudioChannel;
use display::Screen;
use input::InputReader;

/// The real display/input/audio bundle. Construction enables raw mode;
/// dropping it restores the terminal.
pub struct TerminalSurface {
    screen: Screen,
    input: InputReader,
    /// Absent when the session has no clips to play
    audio: Option<AudioChannel>,
    epoch: Instant,
    frame_open: bool,
}

impl TerminalSurface {
    pub fn new(audio: Option<AudioChannel>) -> Result<Self> {
        InputReader::enable_raw_mode()?;
        let screen = Screen::new()?;
        Ok(TerminalSurface {
            screen,
            input: InputReader,
            audio,
            epoch: Instant::now(),
            frame_open: false,
        })
    }
}

impl Surface for TerminalSurface {
    fn draw(&mut self, element: &Visual) -> Result<()> {
        if !self.frame_open {
            self.screen.clear()?;
            self.frame_open = true;
        }
        match element {
            Visual::Fixation => self.screen.fixation(),
            Visual::Image(img) => self.screen.image_box(img.label()),
            Visual::Word(word) => self.screen.word(word),
            Visual::Feedback { correct } => self.screen.feedback(*correct),
            Visual::RoundIntro { round } => self.screen.round_intro(*round),
            Visual::SlowNotice => self.screen.slow_notice(),
            Visual::RestBreak { resume } => self.screen.rest_break(*resume),
        }
    }

    fn present(&mut self) -> Result<()> {
        // nothing drawn: commit a blank frame
        if !self.frame_open {
            self.screen.clear()?;
        }
        self.frame_open = false;
        self.screen.commit()
    }

    fn wait_key(&mut self, timeout: Option<Duration>, accepted: &[Key]) -> Result<Option<Key>> {
        self.input.wait_key(timeout, accepted)
    }

    fn play(&mut self, clip: &AudioRef) -> Result<()> {
        match &self.audio {
            Some(channel) => channel.play(clip),
            None => warn!("no audio channel; skipping {}", clip.path().display()),
        }
        Ok(())
    }

    fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = InputReader::disable_raw_mode();
        let _ = self.screen.shutdown();
    }
}
