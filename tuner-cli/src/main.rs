//! # Terminal Guitar Tuner
//!
//! A thin shell around `tuner-core`: starts microphone capture, polls
//! complete frames off a channel and renders one meter line per frame.
//! All tuning intelligence lives in the core; this binary only owns
//! display state (cents smoothing and line rendering).

use std::collections::VecDeque;
use std::io::Write;

use anyhow::Result;
use crossbeam_channel::bounded;
use tuner_core::tuning::{self, TuningStatus};
use tuner_core::{DetectorConfig, MusicalNote, PitchDetector, PitchResult, audio};

// Display constants
const SMOOTHING_FRAMES: usize = 5; // Frames of cents history to average
const CHANNEL_CAPACITY: usize = 8; // Frames buffered between capture and display
const LEVEL_METER_WIDTH: usize = 10;

fn main() -> Result<()> {
    eprintln!("[MAIN] Starting guitar tuner...");

    let (sender, receiver) = bounded::<Vec<f32>>(CHANNEL_CAPACITY);
    let (_stream, sample_rate) = audio::start_capture(sender)?;

    let detector = PitchDetector::new(DetectorConfig {
        sample_rate,
        ..DetectorConfig::default()
    })?;

    eprintln!("[MAIN] Listening; play one string at a time. Ctrl-C quits.");

    let mut recent_cents: VecDeque<f32> = VecDeque::with_capacity(SMOOTHING_FRAMES);
    let mut last_midi = 0;
    let mut out = std::io::stdout();

    // Ends when the capture side hangs up.
    for frame in receiver.iter() {
        let result = detector.detect(&frame);

        if !result.is_valid {
            recent_cents.clear();
            render_level(&mut out, result.rms)?;
            continue;
        }

        let note = tuning::map_frequency(result.frequency);
        if !note.is_valid {
            continue;
        }

        // Smoothing only makes sense within one note; a string change
        // starts a fresh history.
        if note.midi_number != last_midi {
            recent_cents.clear();
            last_midi = note.midi_number;
        }
        if recent_cents.len() == SMOOTHING_FRAMES {
            recent_cents.pop_front();
        }
        recent_cents.push_back(note.cents_offset);
        let smoothed = recent_cents.iter().sum::<f32>() / recent_cents.len() as f32;

        render_note(&mut out, &note, smoothed, &result)?;
    }

    eprintln!("[MAIN] Capture stopped.");
    Ok(())
}

/// Rewrites the meter line for a detected note.
fn render_note(
    out: &mut impl Write,
    note: &MusicalNote,
    smoothed_cents: f32,
    result: &PitchResult,
) -> Result<()> {
    let string = tuning::nearest_string(note.actual_frequency)
        .map(|s| s.name)
        .unwrap_or("--");
    write!(
        out,
        "\r{}{:<2} {:>7.2} Hz  {:+6.1} cents ({:<7})  string {}  conf {:.2}   ",
        note.letter_name,
        note.octave,
        note.actual_frequency,
        smoothed_cents,
        TuningStatus::from_cents(smoothed_cents).to_string(),
        string,
        result.confidence,
    )?;
    out.flush()?;
    Ok(())
}

/// Rewrites the meter line with just an input level while no pitch is
/// detected, driven by the RMS that invalid results still carry.
fn render_level(out: &mut impl Write, rms: f32) -> Result<()> {
    let filled = ((rms * 4.0 * LEVEL_METER_WIDTH as f32) as usize).min(LEVEL_METER_WIDTH);
    write!(
        out,
        "\rlistening [{:<width$}]                                        ",
        "#".repeat(filled),
        width = LEVEL_METER_WIDTH,
    )?;
    out.flush()?;
    Ok(())
}
