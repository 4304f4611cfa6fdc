//! Stimulus items and item sets
//!
//! One configuration row (a photographed concept plus its distractor words)
//! becomes an `ItemSet`: a single shared photo handle and `2 × k` generated
//! `StimulusItem`s — for every distractor, one trial with the subject word
//! first and one with the roles swapped, so each designated response key is
//! correct equally often.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};
use crate::surface::{AudioRef, ImageRef};

/// Which word position answers the trial correctly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKey {
    /// The first word shown matches the photo
    First,
    /// The second word shown matches the photo
    Second,
}

/// Stimulus modality of an item. Audio-visual items start clip playback at
/// photo onset; the engine dispatches on this tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Modality {
    Visual,
    AudioVisual(AudioRef),
}

/// One presentable trial unit: photo, two candidate words, the designated
/// correct key and the distractor tag. Immutable after construction.
#[derive(Debug, Clone)]
pub struct StimulusItem {
    subject: String,
    word1: String,
    word2: String,
    correct_key: ResponseKey,
    condition: String,
    image: Arc<ImageRef>,
    modality: Modality,
}

impl StimulusItem {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn word1(&self) -> &str {
        &self.word1
    }

    pub fn word2(&self) -> &str {
        &self.word2
    }

    pub fn correct_key(&self) -> ResponseKey {
        self.correct_key
    }

    /// Distractor tag, reported per trial for per-condition accuracy
    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn modality(&self) -> &Modality {
        &self.modality
    }

    /// Reduce an observed response into a record. `key = None` is the
    /// timeout case and forces the no-response sentinel.
    pub fn record(&self, key: Option<ResponseKey>, response_time: Option<Duration>) -> ResponseRecord {
        let (verdict, response_time) = match key {
            None => (Verdict::NoResponse, None),
            Some(pressed) => {
                debug_assert!(response_time.is_some(), "responses carry a reaction time");
                if pressed == self.correct_key {
                    (Verdict::Correct, response_time)
                } else {
                    (Verdict::Incorrect, response_time)
                }
            }
        };
        ResponseRecord {
            word1: self.word1.clone(),
            word2: self.word2.clone(),
            condition: self.condition.clone(),
            response_time,
            verdict,
        }
    }
}

/// Tri-state trial correctness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// No qualifying key before the response window closed — a valid
    /// outcome, not an error
    NoResponse,
}

impl Verdict {
    /// The strings the results tables use
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Correct => "true",
            Verdict::Incorrect => "false",
            Verdict::NoResponse => "no response",
        }
    }
}

/// Outcome of one presented trial
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub word1: String,
    pub word2: String,
    pub condition: String,
    /// Elapsed time from first-word onset to the key press; `None` when the
    /// trial timed out
    pub response_time: Option<Duration>,
    pub verdict: Verdict,
}

impl ResponseRecord {
    pub fn is_correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }
}

/// All trials generated from one configuration row, sharing one photo (and
/// optionally one clip)
#[derive(Debug, Clone)]
pub struct ItemSet {
    subject: String,
    image: Arc<ImageRef>,
    audio: Option<AudioRef>,
    items: Vec<StimulusItem>,
}

impl ItemSet {
    /// Builds the `2 × k` items for a subject and its `(tag, word)`
    /// distractors. A row without distractors generates nothing and is
    /// rejected.
    pub fn new(
        subject: &str,
        distractors: &[(String, String)],
        image: Arc<ImageRef>,
        audio: Option<AudioRef>,
    ) -> Result<Self> {
        if distractors.is_empty() {
            return Err(Error::Config(format!(
                "stimulus row '{subject}' has no distractor words"
            )));
        }
        let modality = match &audio {
            Some(clip) => Modality::AudioVisual(clip.clone()),
            None => Modality::Visual,
        };
        let mut items = Vec::with_capacity(distractors.len() * 2);
        for (tag, wrong) in distractors {
            items.push(StimulusItem {
                subject: subject.to_string(),
                word1: subject.to_string(),
                word2: wrong.clone(),
                correct_key: ResponseKey::First,
                condition: tag.clone(),
                image: Arc::clone(&image),
                modality: modality.clone(),
            });
            items.push(StimulusItem {
                subject: subject.to_string(),
                word1: wrong.clone(),
                word2: subject.to_string(),
                correct_key: ResponseKey::Second,
                condition: tag.clone(),
                image: Arc::clone(&image),
                modality: modality.clone(),
            });
        }
        Ok(ItemSet {
            subject: subject.to_string(),
            image,
            audio,
            items,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    /// The shared clip, if the set is audio-visual. Used for startup probing.
    pub fn audio(&self) -> Option<&AudioRef> {
        self.audio.as_ref()
    }

    /// Generation-ordered view of the items; tests pin orientation pairs
    /// without going through a shuffle.
    #[cfg(test)]
    pub fn items(&self) -> &[StimulusItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// A freshly shuffled permutation of the full item list. Deliberately
    /// not memoized: every call re-draws, so reuse (practice resampling)
    /// sees an independent order.
    pub fn trial_items<R: Rng>(&self, rng: &mut R) -> Vec<StimulusItem> {
        let mut items = self.items.clone();
        items.shuffle(rng);
        items
    }
}
