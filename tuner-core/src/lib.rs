// tuner-core/src/lib.rs

//! The core logic for the guitar tuner.
//! This crate is responsible for pitch detection, frequency-to-note
//! mapping, and the audio capture plumbing that feeds them. It is
//! completely headless and contains no GUI code.
//!
//! The engine itself is two pure pieces: [`pitch`] estimates a
//! fundamental frequency from a sample buffer, [`tuning`] maps a
//! frequency to the nearest equal-tempered note. The [`audio`] module
//! is plumbing only; neither engine module depends on it.

pub mod audio;
pub mod error;
pub mod pitch;
pub mod tuning;

pub use error::ConfigError;
pub use pitch::{DetectorConfig, PitchDetector, PitchResult};
pub use tuning::{map_frequency, MusicalNote, TuningStatus};
