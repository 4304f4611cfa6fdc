//! Block sequencing
//!
//! One block runs a double-shuffled item list through the `TrialEngine`:
//! every set contributes a freshly shuffled permutation, and the
//! concatenation is shuffled once more. Policy hangs off `BlockConfig`:
//! immediate right/wrong feedback, a correct-count stop threshold, and an
//! optional round intro splash. Cancellation anywhere surfaces as
//! `BlockOutcome::Aborted` with everything collected so far.

use std::time::Duration;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::surface::{AudioRef, Surface, Visual};
use crate::trial::engine::{TrialEngine, TrialResult};
use crate::trial::item::{ItemSet, ResponseRecord, StimulusItem};

/// Acknowledgment dwell of the right/wrong feedback scene
pub const FEEDBACK_MS: u64 = 2000;

/// Dwell of the round intro splash
pub const ROUND_INTRO_MS: u64 = 2000;

/// Splash shown once before a block's first item
#[derive(Debug, Clone)]
pub struct RoundIntro {
    pub round: usize,
    pub sound: Option<AudioRef>,
}

/// Per-block policy
#[derive(Debug, Clone, Default)]
pub struct BlockConfig {
    /// Show right/wrong feedback after every completed item
    pub feedback: bool,
    /// Clip played with positive feedback
    pub right_sound: Option<AudioRef>,
    /// Clip played with negative feedback
    pub wrong_sound: Option<AudioRef>,
    /// Stop the block once this many correct answers are in
    pub max_correct: Option<usize>,
    pub intro: Option<RoundIntro>,
}

/// How a block ended. Partial records are always preserved, never discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    /// Ran to the end of the list or hit the stop threshold
    Completed(Vec<ResponseRecord>),
    /// Cancellation cut the block short
    Aborted(Vec<ResponseRecord>),
}

impl BlockOutcome {
    pub fn records(&self) -> &[ResponseRecord] {
        match self {
            BlockOutcome::Completed(records) | BlockOutcome::Aborted(records) => records,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, BlockOutcome::Aborted(_))
    }

    pub fn into_records(self) -> (Vec<ResponseRecord>, bool) {
        match self {
            BlockOutcome::Completed(records) => (records, false),
            BlockOutcome::Aborted(records) => (records, true),
        }
    }
}

/// Flattens a group of sets into one presentation list: each set is drawn in
/// its own fresh order, then the concatenation is shuffled again.
pub fn assemble_block<R: Rng>(sets: &[ItemSet], rng: &mut R) -> Vec<StimulusItem> {
    let mut items = Vec::new();
    for set in sets {
        items.extend(set.trial_items(rng));
    }
    items.shuffle(rng);
    items
}

/// Runs one shuffled item list with a block policy
#[derive(Debug, Clone)]
pub struct BlockRunner {
    engine: TrialEngine,
    config: BlockConfig,
}

impl BlockRunner {
    pub fn new(engine: TrialEngine, config: BlockConfig) -> Self {
        BlockRunner { engine, config }
    }

    pub fn run(&self, io: &mut dyn Surface, items: &[StimulusItem]) -> Result<BlockOutcome> {
        let mut records = Vec::new();

        if let Some(intro) = &self.config.intro {
            let splash = Visual::RoundIntro { round: intro.round };
            if self.scene(io, &splash, intro.sound.as_ref(), ROUND_INTRO_MS)? {
                debug!("cancelled during round intro");
                return Ok(BlockOutcome::Aborted(records));
            }
        }

        let mut correct = 0;
        for (index, item) in items.iter().enumerate() {
            match self.engine.run(io, item)? {
                TrialResult::Completed(record) => {
                    let hit = record.is_correct();
                    if hit {
                        correct += 1;
                    }
                    records.push(record);
                    if self.config.feedback {
                        let sound = if hit {
                            self.config.right_sound.as_ref()
                        } else {
                            self.config.wrong_sound.as_ref()
                        };
                        let scene = Visual::Feedback { correct: hit };
                        if self.scene(io, &scene, sound, FEEDBACK_MS)? {
                            debug!("cancelled during feedback");
                            return Ok(BlockOutcome::Aborted(records));
                        }
                    }
                    if self.config.max_correct.is_some_and(|cap| correct >= cap) {
                        debug!("stop threshold reached after {} items", index + 1);
                        break;
                    }
                }
                TrialResult::Aborted { record } => {
                    records.extend(record);
                    return Ok(BlockOutcome::Aborted(records));
                }
            }
        }
        Ok(BlockOutcome::Completed(records))
    }

    /// Shows a scene for a fixed dwell, cancellation accepted. Returns
    /// whether the cancel key was pressed.
    fn scene(
        &self,
        io: &mut dyn Surface,
        visual: &Visual,
        sound: Option<&AudioRef>,
        dwell_ms: u64,
    ) -> Result<bool> {
        io.draw(visual)?;
        if let Some(clip) = sound {
            io.play(clip)?;
        }
        io.present()?;
        let cancel = [self.engine.bindings().cancel];
        let key = io.wait_key(Some(Duration::from_millis(dwell_ms)), &cancel)?;
        Ok(key.is_some())
    }
}
