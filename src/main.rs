//! pictoword - picture-word matching reaction time trials
//!
//! Presents timed photo/word stimuli, records key-press responses, and
//! aggregates correctness and reaction-time statistics across blocks.
//! Sessions run one of four counterbalanced block orderings over a visual
//! stage and an audio-visual stage, each with its own practice pool.

mod cli;
mod data;
mod error;
mod session;
#[cfg(test)]
mod sim;
mod surface;
mod trial;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use cli::audio::AudioChannel;
use cli::TerminalSurface;
use data::output::Participant;
use error::Result;
use session::{condition_accuracy, Orchestrator, Protocol, SessionPlan, Stage, StageMaterial};
use surface::{AudioRef, ImageRef, KeyBindings};
use trial::{ItemSet, TrialEngine, TrialTiming};

#[derive(Parser, Debug)]
#[command(name = "pictoword")]
#[command(about = "Picture-word matching reaction time trials")]
struct Args {
    /// Counterbalancing protocol ordering (1-4)
    #[arg(short, long)]
    protocol: u8,

    /// Directory holding stage CSVs, photos and sounds
    #[arg(long, default_value = "stimuli")]
    stimuli_dir: PathBuf,

    /// Directory results are written to
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Shuffle seed (omit for entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Final response gap in milliseconds
    #[arg(long, default_value = "400")]
    final_gap_ms: u64,

    /// Wait indefinitely after the second word instead of timing out
    #[arg(long)]
    wait_word2_forever: bool,

    /// Item sets sampled into each practice block
    #[arg(long, default_value = "3")]
    practice_size: usize,

    /// Correct answers that end a practice block early
    #[arg(long)]
    practice_target: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn prompt(question: &str) -> Result<String> {
    print!("{question}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Blocking participant form, run on the cooked terminal before raw mode
fn participant_form() -> Result<Participant> {
    let id = loop {
        let id = prompt("Participant id")?;
        if !id.is_empty() {
            break id;
        }
        println!("Participant id must not be empty.");
    };
    let age = prompt("Age")?;
    let group = prompt("Group")?;
    Ok(Participant { id, age, group })
}

/// Builds the item sets for one stimulus table, opening every photo (and
/// clip, for audio-visual stages) up front so missing assets fail here.
fn build_sets(
    rows: &[data::StimulusRow],
    photos_dir: &Path,
    sounds_dir: Option<&Path>,
) -> Result<Vec<ItemSet>> {
    rows.iter()
        .map(|row| {
            let image = ImageRef::open(&photos_dir.join(format!("{}.jpeg", row.target)))?;
            let audio = sounds_dir
                .map(|dir| AudioRef::open(&dir.join(format!("{}.wav", row.target))))
                .transpose()?;
            ItemSet::new(&row.target, &row.distractors, image, audio)
        })
        .collect()
}

/// Loads one stage: the measured table split into former/latter halves,
/// plus the stage's practice pool. Stage 2 is audio-visual.
fn load_stage(dir: &Path, stage: Stage) -> Result<StageMaterial> {
    let n = match stage {
        Stage::Stage1 => 1,
        Stage::Stage2 => 2,
    };
    let with_audio = stage == Stage::Stage2;

    let rows = data::load_stimulus_rows(&dir.join(format!("stage{n}.csv")))?;
    let (former_rows, latter_rows) = data::split_former_latter(rows);
    let photos = dir.join(format!("photos_stage{n}"));
    let sounds = with_audio.then(|| dir.join(format!("sounds_stage{n}")));
    let former = build_sets(&former_rows, &photos, sounds.as_deref())?;
    let latter = build_sets(&latter_rows, &photos, sounds.as_deref())?;

    let practice_rows = data::load_stimulus_rows(&dir.join(format!("practice{n}.csv")))?;
    let practice_photos = dir.join(format!("photos_practice{n}"));
    let practice_sounds = with_audio.then(|| dir.join(format!("sounds_practice{n}")));
    let practice = build_sets(&practice_rows, &practice_photos, practice_sounds.as_deref())?;

    info!(
        "stage {n}: {} former / {} latter / {} practice sets",
        former.len(),
        latter.len(),
        practice.len()
    );
    Ok(StageMaterial {
        former,
        latter,
        practice,
    })
}

/// Embellishment clips are optional; a missing file just means silence
fn optional_clip(path: PathBuf) -> Option<AudioRef> {
    path.exists().then(|| AudioRef::open(&path).ok()).flatten()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let protocol = Protocol::from_code(args.protocol)?;
    let bindings = KeyBindings::default();
    bindings.validate()?;
    let final_gap = (!args.wait_word2_forever).then(|| Duration::from_millis(args.final_gap_ms));
    let timing = TrialTiming::with_final_gap(final_gap);

    let participant = participant_form()?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let stage1 = load_stage(&args.stimuli_dir, Stage::Stage1)?;
    let stage2 = load_stage(&args.stimuli_dir, Stage::Stage2)?;

    let sounds = args.stimuli_dir.join("sounds");
    let plan = SessionPlan {
        protocol,
        stage1,
        stage2,
        practice_size: args.practice_size,
        practice_target: args.practice_target,
        intro_sound: optional_clip(sounds.join("round.wav")),
        right_sound: optional_clip(sounds.join("right.wav")),
        wrong_sound: optional_clip(sounds.join("wrong.wav")),
    };

    // bring up audio only if the session has clips; probe them all now
    let mut clips: Vec<AudioRef> = Vec::new();
    for sets in [&plan.stage2.former, &plan.stage2.latter, &plan.stage2.practice] {
        clips.extend(sets.iter().filter_map(|set| set.audio().cloned()));
    }
    clips.extend(
        [&plan.intro_sound, &plan.right_sound, &plan.wrong_sound]
            .into_iter()
            .filter_map(|clip| clip.clone()),
    );
    let audio = if clips.is_empty() {
        None
    } else {
        let channel = AudioChannel::open()?;
        for clip in &clips {
            AudioChannel::probe(clip)?;
        }
        info!("probed {} audio clips", clips.len());
        Some(channel)
    };

    info!(
        "starting session: participant {}, protocol type{}",
        participant.id,
        protocol.code()
    );
    let mut io = TerminalSurface::new(audio)?;
    let orchestrator = Orchestrator::new(TrialEngine::new(timing, bindings));
    let result = orchestrator.run(&mut io, &plan, &mut rng)?;
    // restore the terminal before printing anything
    drop(io);

    fs::create_dir_all(&args.results_dir)?;
    let date = chrono::Local::now().format("%Y%m%d");
    let session_path = args
        .results_dir
        .join(format!("{}_{date}.csv", participant.id));
    data::write_session_csv(&session_path, &result)?;
    data::append_overview(&args.results_dir.join("overview.csv"), &participant, &result)?;

    if result.aborted {
        println!("Session cancelled; partial results kept.");
    }
    for summary in result.summaries() {
        println!(
            "{}: {} trials | mean RT {:.0} ms | accuracy {:.0}%",
            summary.name,
            summary.trials,
            summary.mean_rt_ms,
            summary.mean_correct * 100.0
        );
    }
    for (name, records) in &result.blocks {
        for (tag, (correct, responded)) in condition_accuracy(records) {
            debug!("{name}/{tag}: {correct}/{responded} correct");
        }
    }

    Ok(())
}
