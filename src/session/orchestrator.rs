//! Session sequencing
//!
//! Expands the chosen protocol ordering into (practice, measured) block
//! pairs separated by rest checkpoints. Practice blocks sample a capped
//! random subset of the stage's practice pool, run with feedback and the
//! round intro; measured blocks run the full double-shuffled sub-block list
//! with feedback off. Cancellation anywhere ends the session early with
//! everything collected so far.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::session::protocol::{Protocol, Stage, SubBlock};
use crate::session::results::SessionResult;
use crate::surface::{AudioRef, Surface, Visual};
use crate::trial::block::{assemble_block, BlockConfig, BlockRunner, RoundIntro};
use crate::trial::engine::TrialEngine;
use crate::trial::item::ItemSet;

/// Stimulus material for one stage
#[derive(Debug, Clone)]
pub struct StageMaterial {
    pub former: Vec<ItemSet>,
    pub latter: Vec<ItemSet>,
    /// Pool practice blocks sample from
    pub practice: Vec<ItemSet>,
}

impl StageMaterial {
    fn pool(&self, sub: SubBlock) -> &[ItemSet] {
        match sub {
            SubBlock::Former => &self.former,
            SubBlock::Latter => &self.latter,
        }
    }
}

/// Everything a session needs besides a surface and an RNG
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub protocol: Protocol,
    pub stage1: StageMaterial,
    pub stage2: StageMaterial,
    /// Item sets sampled into each practice block, capped at the pool size
    pub practice_size: usize,
    /// Correct answers that end a practice block early
    pub practice_target: Option<usize>,
    pub intro_sound: Option<AudioRef>,
    pub right_sound: Option<AudioRef>,
    pub wrong_sound: Option<AudioRef>,
}

impl SessionPlan {
    fn stage(&self, stage: Stage) -> &StageMaterial {
        match stage {
            Stage::Stage1 => &self.stage1,
            Stage::Stage2 => &self.stage2,
        }
    }
}

/// Runs whole sessions: block pairs, rest checkpoints, result assembly
#[derive(Debug, Clone)]
pub struct Orchestrator {
    engine: TrialEngine,
}

impl Orchestrator {
    pub fn new(engine: TrialEngine) -> Self {
        Orchestrator { engine }
    }

    pub fn run<R: Rng>(
        &self,
        io: &mut dyn Surface,
        plan: &SessionPlan,
        rng: &mut R,
    ) -> Result<SessionResult> {
        let mut result = SessionResult::new(plan.protocol);

        for (round, id) in plan.protocol.order().iter().enumerate() {
            if round > 0 {
                self.rest_checkpoint(io)?;
            }
            let material = plan.stage(id.stage);

            // practice: capped random sample of the pool, feedback on
            let sample = plan.practice_size.min(material.practice.len());
            let sampled: Vec<ItemSet> = material
                .practice
                .choose_multiple(rng, sample)
                .cloned()
                .collect();
            let items = assemble_block(&sampled, rng);
            info!("practice for {} ({} items)", id.name(), items.len());
            let practice = BlockRunner::new(
                self.engine.clone(),
                BlockConfig {
                    feedback: true,
                    right_sound: plan.right_sound.clone(),
                    wrong_sound: plan.wrong_sound.clone(),
                    max_correct: plan.practice_target,
                    intro: Some(RoundIntro {
                        round: round + 1,
                        sound: plan.intro_sound.clone(),
                    }),
                },
            );
            let (records, aborted) = practice.run(io, &items)?.into_records();
            result.push(format!("{}_practice", id.name()), records);
            if aborted {
                info!("session cancelled during practice for {}", id.name());
                result.aborted = true;
                return Ok(result);
            }

            // measured: the full sub-block list, feedback off, unbounded
            let items = assemble_block(material.pool(id.sub), rng);
            info!("measured block {} ({} items)", id.name(), items.len());
            let measured = BlockRunner::new(self.engine.clone(), BlockConfig::default());
            let (records, aborted) = measured.run(io, &items)?.into_records();
            result.push(id.name().to_string(), records);
            if aborted {
                info!("session cancelled during {}", id.name());
                result.aborted = true;
                return Ok(result);
            }
        }
        Ok(result)
    }

    /// Blocks until the two resume keys are pressed in sequence. No timeout
    /// and no cancellation path; the two-step gesture guards against
    /// accidental resumption.
    fn rest_checkpoint(&self, io: &mut dyn Surface) -> Result<()> {
        let resume = self.engine.bindings().resume;
        debug!("rest checkpoint");
        io.draw(&Visual::RestBreak { resume })?;
        io.present()?;
        io.wait_key(None, &[resume.0])?;
        io.wait_key(None, &[resume.1])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{ImageRef, Key, KeyBindings};
    use crate::trial::timing::TrialTiming;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    /// Surface that answers every trial with the first response key,
    /// sleeps through fixed dwells and passes rest gestures immediately.
    struct Autopilot {
        clock: Duration,
        waits: usize,
        /// After this many waits, answer anything accepting Escape with it
        cancel_after: Option<usize>,
        intros: Vec<usize>,
        rests: usize,
    }

    impl Autopilot {
        fn new() -> Self {
            Autopilot {
                clock: Duration::ZERO,
                waits: 0,
                cancel_after: None,
                intros: Vec::new(),
                rests: 0,
            }
        }

        fn cancelling_after(waits: usize) -> Self {
            Autopilot {
                cancel_after: Some(waits),
                ..Autopilot::new()
            }
        }
    }

    impl Surface for Autopilot {
        fn draw(&mut self, element: &Visual) -> Result<()> {
            match element {
                Visual::RoundIntro { round } => self.intros.push(*round),
                Visual::RestBreak { .. } => self.rests += 1,
                _ => {}
            }
            Ok(())
        }

        fn present(&mut self) -> Result<()> {
            Ok(())
        }

        fn wait_key(
            &mut self,
            timeout: Option<Duration>,
            accepted: &[Key],
        ) -> Result<Option<Key>> {
            self.waits += 1;
            if let Some(cap) = self.cancel_after {
                if self.waits > cap && accepted.contains(&Key::Escape) {
                    return Ok(Some(Key::Escape));
                }
            }
            match timeout {
                // rest gesture: press whatever is asked for
                None => {
                    self.clock += Duration::from_millis(50);
                    Ok(Some(accepted[0]))
                }
                // response window: answer with the first response key
                Some(_) if accepted.len() > 1 => {
                    self.clock += Duration::from_millis(50);
                    Ok(Some(accepted[0]))
                }
                // approach phases and feedback/intro dwells elapse
                Some(dwell) => {
                    self.clock += dwell;
                    Ok(None)
                }
            }
        }

        fn play(&mut self, _clip: &AudioRef) -> Result<()> {
            Ok(())
        }

        fn elapsed(&self) -> Duration {
            self.clock
        }
    }

    fn material(prefix: &str) -> StageMaterial {
        let set = |name: &str| {
            ItemSet::new(
                name,
                &[("d1".to_string(), format!("not-{name}"))],
                ImageRef::fake(name),
                None,
            )
            .unwrap()
        };
        StageMaterial {
            former: vec![set(&format!("{prefix}-former"))],
            latter: vec![set(&format!("{prefix}-latter"))],
            practice: vec![
                set(&format!("{prefix}-practice-a")),
                set(&format!("{prefix}-practice-b")),
            ],
        }
    }

    fn plan(protocol: Protocol, practice_size: usize) -> SessionPlan {
        SessionPlan {
            protocol,
            stage1: material("s1"),
            stage2: material("s2"),
            practice_size,
            practice_target: None,
            intro_sound: None,
            right_sound: None,
            wrong_sound: None,
        }
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(TrialEngine::new(
            TrialTiming::default(),
            KeyBindings::default(),
        ))
    }

    #[test]
    fn test_type1_blocks_keyed_in_literal_order() {
        let mut io = Autopilot::new();
        let mut rng = StdRng::seed_from_u64(1);
        let result = orchestrator()
            .run(&mut io, &plan(Protocol::Type1, 1), &mut rng)
            .unwrap();

        assert!(!result.aborted);
        assert_eq!(
            result.measured_names(),
            ["stage1_former", "stage1_latter", "stage2_former", "stage2_latter"]
        );
        // practice precedes each measured block
        let names: Vec<&str> = result.blocks.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names[0], "stage1_former_practice");
        assert_eq!(names[1], "stage1_former");
        assert_eq!(io.rests, 3, "one checkpoint between each pair");
        assert_eq!(io.intros, [1, 2, 3, 4]);
    }

    #[test]
    fn test_type3_blocks_keyed_in_reverse_order() {
        let mut io = Autopilot::new();
        let mut rng = StdRng::seed_from_u64(2);
        let result = orchestrator()
            .run(&mut io, &plan(Protocol::Type3, 1), &mut rng)
            .unwrap();
        assert_eq!(
            result.measured_names(),
            ["stage2_former", "stage2_latter", "stage1_latter", "stage1_former"]
        );
    }

    #[test]
    fn test_practice_sample_capped_at_pool_size() {
        let mut io = Autopilot::new();
        let mut rng = StdRng::seed_from_u64(3);
        // ask for far more sets than the two-set pool holds
        let result = orchestrator()
            .run(&mut io, &plan(Protocol::Type1, 10), &mut rng)
            .unwrap();
        let records = result.get("stage1_former_practice").unwrap();
        // 2 pool sets x 1 distractor x 2 orientations
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_cancel_on_first_wait_returns_one_empty_block() {
        let mut io = Autopilot::cancelling_after(0);
        let mut rng = StdRng::seed_from_u64(4);
        let result = orchestrator()
            .run(&mut io, &plan(Protocol::Type1, 1), &mut rng)
            .unwrap();
        assert!(result.aborted);
        assert_eq!(result.blocks.len(), 1);
        assert_eq!(result.blocks[0].0, "stage1_former_practice");
        assert!(result.blocks[0].1.is_empty());
    }

    #[test]
    fn test_abort_mid_session_keeps_earlier_blocks() {
        // each pair costs 23 waits (intro + 2x6 practice + 2x5 measured)
        // and each rest checkpoint 2, so wait 61 lands in the third pair's
        // practice block
        let mut io = Autopilot::cancelling_after(60);
        let mut rng = StdRng::seed_from_u64(5);
        let result = orchestrator()
            .run(&mut io, &plan(Protocol::Type1, 1), &mut rng)
            .unwrap();
        assert!(result.aborted);
        assert!(result.get("stage1_former").is_some());
        assert!(result.get("stage2_former").is_none());
        let first = result.get("stage1_former").unwrap();
        assert_eq!(first.len(), 2, "first measured block ran to completion");
    }
}
