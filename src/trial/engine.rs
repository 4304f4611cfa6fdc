//! Per-item trial state machine
//!
//! Walks one `StimulusItem` through the fixed phase sequence:
//!
//! `Fixation → Gap1 → Stimulus → Gap2 → Word1 → Gap3 → Word2 → Gap4`
//!
//! Every phase blocks for its dwell or until an accepted key arrives,
//! whichever is first. Before `Word1` only the cancellation key is heard;
//! from `Word1` onward the response keys join in and the reaction clock
//! runs. The walk ends in a response record, a timeout record (finite final
//! gap only), or a cancellation that discards the in-flight item.

use std::time::Duration;

use log::{debug, trace};

use crate::error::Result;
use crate::surface::{Key, KeyBindings, Surface, Visual};
use crate::trial::item::{Modality, ResponseKey, ResponseRecord, StimulusItem};
use crate::trial::timing::{Phase, TrialTiming};

/// Dwell of the "too slow" notice shown when a finite final gap elapses
pub(crate) const SLOW_NOTICE_MS: u64 = 1000;

/// Outcome of presenting one item
#[derive(Debug, Clone, PartialEq)]
pub enum TrialResult {
    /// The item ran to a record (response or timeout); continue the block
    Completed(ResponseRecord),
    /// Cancellation observed. `record` is only present when the item had
    /// already timed out and been recorded before the cancel arrived
    /// (cancel during the slow notice).
    Aborted { record: Option<ResponseRecord> },
}

/// Drives single items through the phase sequence
#[derive(Debug, Clone)]
pub struct TrialEngine {
    timing: TrialTiming,
    bindings: KeyBindings,
}

impl TrialEngine {
    pub fn new(timing: TrialTiming, bindings: KeyBindings) -> Self {
        TrialEngine { timing, bindings }
    }

    pub fn timing(&self) -> &TrialTiming {
        &self.timing
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Present one item start to finish
    pub fn run(&self, io: &mut dyn Surface, item: &StimulusItem) -> Result<TrialResult> {
        // Approach: cross, blank, photo, blank. Cancellation only.
        for phase in Phase::APPROACH {
            self.enter(io, item, phase)?;
            if io
                .wait_key(self.timing.dwell(phase), &[self.bindings.cancel])?
                .is_some()
            {
                debug!("cancelled during {phase:?}");
                return Ok(TrialResult::Aborted { record: None });
            }
        }

        // Response window; the reaction clock starts at Word1 onset.
        let accepted = [self.bindings.first, self.bindings.second, self.bindings.cancel];
        let onset = io.elapsed();
        for phase in Phase::RESPONSE_WINDOW {
            self.enter(io, item, phase)?;
            match io.wait_key(self.timing.dwell(phase), &accepted)? {
                Some(key) if key == self.bindings.cancel => {
                    debug!("cancelled during {phase:?}");
                    return Ok(TrialResult::Aborted { record: None });
                }
                Some(key) => {
                    let rt = io.elapsed().saturating_sub(onset);
                    let pressed = if key == self.bindings.first {
                        ResponseKey::First
                    } else {
                        ResponseKey::Second
                    };
                    trace!("response {key:?} in {phase:?} after {rt:?}");
                    return Ok(TrialResult::Completed(item.record(Some(pressed), Some(rt))));
                }
                None => {}
            }
        }

        // Every wait elapsed silently. Unreachable with an unbounded final
        // gap, whose wait can only end on a key.
        self.slow_notice(io, item)
    }

    /// Timeout epilogue: show the "too slow" notice, emit the no-response
    /// record, keep it even if the subject cancels during the notice.
    fn slow_notice(&self, io: &mut dyn Surface, item: &StimulusItem) -> Result<TrialResult> {
        io.draw(&Visual::SlowNotice)?;
        io.present()?;
        let record = item.record(None, None);
        let cancelled = io
            .wait_key(
                Some(Duration::from_millis(SLOW_NOTICE_MS)),
                &[self.bindings.cancel],
            )?
            .is_some();
        if cancelled {
            debug!("cancelled during slow notice");
            return Ok(TrialResult::Aborted {
                record: Some(record),
            });
        }
        Ok(TrialResult::Completed(record))
    }

    /// Draw and commit the phase's visuals. Gaps commit a blank frame; the
    /// photo phase also fires audio playback for audio-visual items.
    fn enter(&self, io: &mut dyn Surface, item: &StimulusItem, phase: Phase) -> Result<()> {
        trace!("enter {phase:?}");
        match phase {
            Phase::Fixation => io.draw(&Visual::Fixation)?,
            Phase::Stimulus => {
                io.draw(&Visual::Image(item.image()))?;
                if let Modality::AudioVisual(clip) = item.modality() {
                    io.play(clip)?;
                }
            }
            Phase::Word1 => io.draw(&Visual::Word(item.word1()))?,
            Phase::Word2 => io.draw(&Visual::Word(item.word2()))?,
            Phase::Gap1 | Phase::Gap2 | Phase::Gap3 | Phase::Gap4 => {}
        }
        io.present()
    }
}
