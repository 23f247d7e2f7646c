//! # Musical Tuning Module
//!
//! Maps detected frequencies onto the equal-tempered chromatic scale.
//! All calculations are relative to the A4 = 440 Hz reference; cents
//! deviations follow the usual convention of 100 cents per semitone
//! with positive values meaning sharp.
//!
//! ## Features
//! - Frequency to nearest-note mapping with MIDI numbers and octaves
//! - Two parallel naming schemes (letter names and solfège)
//! - Signed cents deviation and a three-way tuning status
//! - Open-string reference table for a guitar in standard tuning

use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::fmt;

/// Absolute cents deviation below which a note counts as in tune.
pub const IN_TUNE_CENTS: f32 = 5.0;

const LETTER_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const SOLFEGE_NAMES: [&str; 12] = [
    "DO", "DO#", "RE", "RE#", "MI", "FA", "FA#", "SOL", "SOL#", "LA", "LA#", "SI",
];

/// Coarse tuning verdict derived from the cents deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningStatus {
    InTune,
    Flat,
    Sharp,
}

impl TuningStatus {
    pub fn from_cents(cents: f32) -> Self {
        if cents.abs() < IN_TUNE_CENTS {
            TuningStatus::InTune
        } else if cents < 0.0 {
            TuningStatus::Flat
        } else {
            TuningStatus::Sharp
        }
    }
}

impl fmt::Display for TuningStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            TuningStatus::InTune => "in tune",
            TuningStatus::Flat => "flat",
            TuningStatus::Sharp => "sharp",
        };
        write!(f, "{}", label)
    }
}

/// A frequency mapped onto the nearest equal-tempered note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusicalNote {
    /// Letter-style pitch class name, e.g. "A" or "F#". Empty when invalid.
    pub letter_name: &'static str,
    /// Solfège-style pitch class name, e.g. "LA" or "FA#". Empty when invalid.
    pub solfege_name: &'static str,
    /// Scientific octave number; octave 4 contains A4 = 440 Hz.
    pub octave: i32,
    /// MIDI note number, A4 = 69.
    pub midi_number: i32,
    /// Equal-tempered frequency of the mapped note in Hz.
    pub exact_frequency: f32,
    /// The input frequency that was mapped.
    pub actual_frequency: f32,
    /// Signed deviation from the mapped note in cents; negative is flat.
    pub cents_offset: f32,
    /// False only for non-positive (or non-finite) input frequencies.
    pub is_valid: bool,
}

impl MusicalNote {
    fn invalid() -> Self {
        MusicalNote {
            letter_name: "",
            solfege_name: "",
            octave: 0,
            midi_number: 0,
            exact_frequency: 0.0,
            actual_frequency: 0.0,
            cents_offset: 0.0,
            is_valid: false,
        }
    }

    pub fn is_in_tune(&self) -> bool {
        self.is_valid && self.cents_offset.abs() < IN_TUNE_CENTS
    }

    pub fn tuning_status(&self) -> TuningStatus {
        TuningStatus::from_cents(self.cents_offset)
    }
}

/// Maps a frequency in Hz to the nearest chromatic note.
///
/// Deterministic and referentially transparent: the same frequency
/// always produces the same note. Halfway points between two notes
/// round away from zero semitones (`f32::round` semantics), so e.g.
/// exactly +50 cents above a note maps to the note above.
///
/// Non-positive and non-finite frequencies yield an invalid note with
/// empty names and zeroed numbers.
pub fn map_frequency(frequency: f32) -> MusicalNote {
    if !frequency.is_finite() || frequency <= 0.0 {
        return MusicalNote::invalid();
    }

    let half_steps = 12.0 * (frequency / 440.0).log2();
    let midi_number = half_steps.round() as i32 + 69;
    let exact_frequency = 440.0 * 2.0_f32.powf((midi_number - 69) as f32 / 12.0);
    let cents_offset = 1200.0 * (frequency / exact_frequency).log2();

    // Euclidean remainder keeps the class positive for sub-audio
    // frequencies whose MIDI number goes negative.
    let class = midi_number.rem_euclid(12) as usize;
    let octave = midi_number.div_euclid(12) - 1;

    MusicalNote {
        letter_name: LETTER_NAMES[class],
        solfege_name: SOLFEGE_NAMES[class],
        octave,
        midi_number,
        exact_frequency,
        actual_frequency: frequency,
        cents_offset,
        is_valid: true,
    }
}

/// One open string of a guitar in standard tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuitarString {
    /// Conventional name, lowest string first: "E2" through "E4".
    pub name: &'static str,
    pub midi_number: i32,
    /// Equal-tempered target frequency in Hz.
    pub frequency: f32,
}

/// Open-string targets for a six-string guitar in standard tuning,
/// computed once from their MIDI numbers (E2 A2 D3 G3 B3 E4, roughly
/// 82.41, 110.00, 146.83, 196.00, 246.94 and 329.63 Hz). The shell
/// uses this to tell the player which string is being tuned.
pub static OPEN_STRINGS: Lazy<[GuitarString; 6]> = Lazy::new(|| {
    const STRINGS: [(&str, i32); 6] = [
        ("E2", 40),
        ("A2", 45),
        ("D3", 50),
        ("G3", 55),
        ("B3", 59),
        ("E4", 64),
    ];
    STRINGS.map(|(name, midi_number)| GuitarString {
        name,
        midi_number,
        frequency: 440.0 * 2.0_f32.powf((midi_number - 69) as f32 / 12.0),
    })
});

/// Finds the open string whose target is closest to `frequency`, by
/// absolute distance in Hz. Returns `None` for unusable input.
pub fn nearest_string(frequency: f32) -> Option<&'static GuitarString> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return None;
    }
    OPEN_STRINGS.iter().min_by(|a, b| {
        let da = (a.frequency - frequency).abs();
        let db = (b.frequency - frequency).abs();
        da.partial_cmp(&db).unwrap_or(Ordering::Equal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concert_a_maps_exactly() {
        let note = map_frequency(440.0);
        assert!(note.is_valid);
        assert_eq!(note.letter_name, "A");
        assert_eq!(note.solfege_name, "LA");
        assert_eq!(note.octave, 4);
        assert_eq!(note.midi_number, 69);
        assert_eq!(note.cents_offset, 0.0);
        assert!(note.is_in_tune());
        assert_eq!(note.tuning_status(), TuningStatus::InTune);
    }

    #[test]
    fn octave_above_concert_a() {
        let note = map_frequency(880.0);
        assert_eq!(note.letter_name, "A");
        assert_eq!(note.octave, 5);
        assert_eq!(note.midi_number, 81);
        assert!(note.cents_offset.abs() < 0.01);
    }

    #[test]
    fn well_known_notes_map_to_their_names() {
        // (frequency, letter, solfège, octave)
        let cases = [
            (261.63, "C", "DO", 4),
            (293.66, "D", "RE", 4),
            (329.63, "E", "MI", 4),
            (392.00, "G", "SOL", 4),
            (246.94, "B", "SI", 3),
            (92.50, "F#", "FA#", 2),
        ];
        for (freq, letter, solfege, octave) in cases {
            let note = map_frequency(freq);
            assert_eq!(note.letter_name, letter, "{} Hz", freq);
            assert_eq!(note.solfege_name, solfege, "{} Hz", freq);
            assert_eq!(note.octave, octave, "{} Hz", freq);
            assert!(
                note.cents_offset.abs() < IN_TUNE_CENTS,
                "{} Hz should be near-exact, got {} cents",
                freq,
                note.cents_offset
            );
        }
    }

    #[test]
    fn non_positive_frequencies_are_invalid() {
        for freq in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let note = map_frequency(freq);
            assert!(!note.is_valid, "{} should be invalid", freq);
            assert_eq!(note.letter_name, "");
            assert_eq!(note.solfege_name, "");
            assert_eq!(note.midi_number, 0);
            assert_eq!(note.exact_frequency, 0.0);
            assert!(!note.is_in_tune());
        }
    }

    #[test]
    fn cents_increase_monotonically_up_to_the_boundary() {
        // From A4 toward A#4 the offset climbs from 0 toward +50, then
        // wraps to -50 once the nearest note flips.
        let boundary = 440.0 * 2.0_f32.powf(0.5 / 12.0);
        let mut previous = map_frequency(440.0).cents_offset;
        for step in 1..=20 {
            let freq = 440.0 + (boundary - 441.0) * step as f32 / 20.0;
            let cents = map_frequency(freq).cents_offset;
            assert!(
                cents > previous,
                "cents not monotonic at {} Hz: {} then {}",
                freq,
                previous,
                cents
            );
            assert!((0.0..50.0).contains(&cents));
            previous = cents;
        }
        // Just past the halfway point the mapping flips to A#4.
        let past = map_frequency(boundary + 0.1);
        assert_eq!(past.letter_name, "A#");
        assert!(past.cents_offset < 0.0 && past.cents_offset > -50.0);
    }

    #[test]
    fn sharp_and_flat_statuses() {
        let sharp = map_frequency(445.0);
        assert_eq!(sharp.tuning_status(), TuningStatus::Sharp);
        assert!(!sharp.is_in_tune());

        let flat = map_frequency(435.0);
        assert_eq!(flat.tuning_status(), TuningStatus::Flat);
        assert!(flat.cents_offset < 0.0);

        assert_eq!(format!("{}", TuningStatus::InTune), "in tune");
        assert_eq!(format!("{}", TuningStatus::Flat), "flat");
        assert_eq!(format!("{}", TuningStatus::Sharp), "sharp");
    }

    #[test]
    fn low_e_string_frequency_maps_to_e2() {
        let note = map_frequency(82.41);
        assert_eq!(note.letter_name, "E");
        assert_eq!(note.octave, 2);
        assert!(note.cents_offset.abs() < IN_TUNE_CENTS);
    }

    #[test]
    fn open_string_table_matches_the_note_mapping() {
        let expected = [82.41, 110.0, 146.83, 196.0, 246.94, 329.63];
        for (string, expected) in OPEN_STRINGS.iter().zip(expected) {
            assert!(
                (string.frequency - expected).abs() < 0.01,
                "{} expected near {} Hz, got {}",
                string.name,
                expected,
                string.frequency
            );
            let note = map_frequency(string.frequency);
            assert_eq!(note.midi_number, string.midi_number);
        }
    }

    #[test]
    fn nearest_string_picks_the_closest_target() {
        assert_eq!(nearest_string(84.0).map(|s| s.name), Some("E2"));
        assert_eq!(nearest_string(195.0).map(|s| s.name), Some("G3"));
        assert_eq!(nearest_string(1000.0).map(|s| s.name), Some("E4"));
        assert_eq!(nearest_string(-1.0), None);
        assert_eq!(nearest_string(f32::NAN), None);
    }
}
