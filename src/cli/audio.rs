//! Fire-and-forget clip playback using rodio
//!
//! Each play spawns a detached sink, so playback runs alongside the visual
//! phases without ever being awaited. Clips are decode-probed at startup;
//! a failure mid-session only degrades to a warning and a silent trial.

use std::fs::File;
use std::io::BufReader;

use log::warn;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::error::{Error, Result};
use crate::surface::AudioRef;

/// Owns the audio output device for the session
pub struct AudioChannel {
    // keeps the device alive; playback dies with it
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioChannel {
    pub fn open() -> Result<Self> {
        let (_stream, handle) = OutputStream::try_default()
            .map_err(|e| Error::Audio(format!("no audio output device: {e}")))?;
        Ok(AudioChannel { _stream, handle })
    }

    /// Decode the clip once now, so a corrupt or unreadable file fails
    /// session startup instead of a trial.
    pub fn probe(clip: &AudioRef) -> Result<()> {
        let file = File::open(clip.path()).map_err(|_| Error::AssetMissing {
            path: clip.path().to_path_buf(),
        })?;
        Decoder::new(BufReader::new(file)).map_err(|e| {
            Error::Audio(format!("cannot decode {}: {e}", clip.path().display()))
        })?;
        Ok(())
    }

    /// Start playback and return immediately. Mid-session failures are
    /// logged, not raised; the trial continues silently.
    pub fn play(&self, clip: &AudioRef) {
        if let Err(e) = self.start(clip) {
            warn!("playback failed for {}: {e}", clip.path().display());
        }
    }

    fn start(&self, clip: &AudioRef) -> Result<()> {
        let file = File::open(clip.path()).map_err(|_| Error::AssetMissing {
            path: clip.path().to_path_buf(),
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| {
            Error::Audio(format!("cannot decode {}: {e}", clip.path().display()))
        })?;
        let sink = Sink::try_new(&self.handle)
            .map_err(|e| Error::Audio(format!("cannot open playback sink: {e}")))?;
        sink.append(source);
        sink.detach();
        Ok(())
    }
}
