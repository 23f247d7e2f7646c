//! Error types for tuner-core.

use thiserror::Error;

/// Raised when a [`crate::pitch::PitchDetector`] is constructed from an
/// invalid configuration. Detection itself never fails; silence and
/// unclear signals are reported through the result, not as errors.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("Invalid sample rate: {0}. Must be positive")]
    InvalidSampleRate(u32),

    #[error("Invalid frequency range: min={min}, max={max}. Requires 0 < min < max")]
    InvalidFrequencyRange { min: f32, max: f32 },

    #[error("Max frequency {max_frequency} must be below the sample rate {sample_rate}")]
    RangeExceedsSampleRate { max_frequency: f32, sample_rate: u32 },

    #[error("Invalid signal threshold: {0}. Must be between 0.0 and 1.0")]
    InvalidThreshold(f32),
}
