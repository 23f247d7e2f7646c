//! # Pitch Detection Module
//!
//! This module implements autocorrelation-based fundamental frequency
//! estimation for monophonic guitar signals. Given a buffer of audio
//! samples it finds the lag at which the signal best matches a shifted
//! copy of itself and converts that lag into a frequency.
//!
//! ## Features
//! - Lag-bounded autocorrelation search over a configurable frequency range
//! - RMS amplitude gating to filter out silence
//! - Parabolic interpolation for sub-sample accuracy
//! - Self-similarity confidence scoring with a validity gate

use crate::error::ConfigError;

/// Detection confidence above which a result is considered valid.
const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Immutable detector configuration, validated once at construction.
///
/// The defaults target a six-string guitar captured at CD quality:
/// the 70–1500 Hz range covers every open string and the fretted
/// positions above them with margin on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// Sample rate of the input buffers in Hz.
    pub sample_rate: u32,
    /// Lowest admissible fundamental in Hz.
    pub min_frequency: f32,
    /// Highest admissible fundamental in Hz.
    pub max_frequency: f32,
    /// Minimum RMS amplitude; quieter buffers are treated as silence.
    /// Must lie in `[0, 1]`. 0.1 suits a desktop microphone at normal
    /// gain; noisier or auto-gained capture paths may want 0.05.
    pub signal_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            sample_rate: 44100,
            min_frequency: 70.0,
            max_frequency: 1500.0,
            signal_threshold: 0.1,
        }
    }
}

impl DetectorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        // `!(a > b)` instead of `a <= b` so NaN bounds are rejected too.
        if !(self.min_frequency > 0.0)
            || !self.max_frequency.is_finite()
            || !(self.max_frequency > self.min_frequency)
        {
            return Err(ConfigError::InvalidFrequencyRange {
                min: self.min_frequency,
                max: self.max_frequency,
            });
        }
        // A max frequency at or above the sample rate would allow a
        // zero minimum lag, and lag 0 has no frequency.
        if self.max_frequency >= self.sample_rate as f32 {
            return Err(ConfigError::RangeExceedsSampleRate {
                max_frequency: self.max_frequency,
                sample_rate: self.sample_rate,
            });
        }
        if !(0.0..=1.0).contains(&self.signal_threshold) {
            return Err(ConfigError::InvalidThreshold(self.signal_threshold));
        }
        Ok(())
    }
}

/// The outcome of one [`PitchDetector::detect`] call.
///
/// Silence, out-of-range pitch and low-confidence correlation are all
/// reported here with `is_valid = false`, never as errors, so a shell
/// can poll continuously without exception handling on the common
/// "no clear pitch yet" case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchResult {
    /// Estimated fundamental in Hz, 0.0 if none was found.
    pub frequency: f32,
    /// Normalized correlation strength at the detected period, in `[0, 1]`.
    pub confidence: f32,
    /// True iff signal level, frequency range and confidence all passed.
    pub is_valid: bool,
    /// RMS amplitude of the input buffer, valid or not, so the shell
    /// can drive a level meter even while nothing is detected.
    pub rms: f32,
}

impl PitchResult {
    fn none() -> Self {
        Self::none_with_rms(0.0)
    }

    fn none_with_rms(rms: f32) -> Self {
        PitchResult {
            frequency: 0.0,
            confidence: 0.0,
            is_valid: false,
            rms,
        }
    }
}

/// Autocorrelation pitch detector for monophonic signals.
///
/// The detector is an immutable configuration holder; [`detect`] is a
/// pure function of the sample buffer. It keeps no state between
/// calls, never retains a reference to the buffer, and may be called
/// from any thread, including a real-time audio callback.
///
/// [`detect`]: PitchDetector::detect
#[derive(Debug, Clone, Copy)]
pub struct PitchDetector {
    config: DetectorConfig,
}

impl PitchDetector {
    /// Builds a detector, rejecting invalid configuration up front.
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(PitchDetector { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Estimates the fundamental frequency of `samples`.
    ///
    /// The pipeline: RMS gate, lag-bounded autocorrelation, parabolic
    /// peak refinement, range check, confidence check. The RMS of the
    /// buffer is carried on every result, including invalid ones. A
    /// buffer whose RMS is exactly at the threshold passes the gate
    /// (the comparison is a strict `<`).
    ///
    /// NaN or infinite samples propagate through the sums and produce
    /// a garbage-in garbage-out result rather than a panic.
    pub fn detect(&self, samples: &[f32]) -> PitchResult {
        if samples.is_empty() {
            return PitchResult::none();
        }

        let rms =
            (samples.iter().map(|&s| s * s).sum::<f32>() / samples.len() as f32).sqrt();
        if rms < self.config.signal_threshold {
            return PitchResult::none_with_rms(rms);
        }

        let sample_rate = self.config.sample_rate as f32;
        // Higher frequency means shorter period, so the lag bounds invert.
        let min_lag = (sample_rate / self.config.max_frequency) as usize;
        let max_lag = (sample_rate / self.config.min_frequency) as usize;
        if max_lag >= samples.len() {
            // The buffer is too short to hold even one full period of
            // the lowest configured frequency.
            return PitchResult::none_with_rms(rms);
        }

        let frequency = estimate_frequency(samples, sample_rate, min_lag, max_lag);
        if !frequency.is_finite() || frequency <= 0.0 {
            return PitchResult::none_with_rms(rms);
        }
        if frequency < self.config.min_frequency || frequency > self.config.max_frequency {
            // Report what was found, but flag it unusable.
            return PitchResult {
                frequency,
                confidence: 0.0,
                is_valid: false,
                rms,
            };
        }

        let confidence = self_similarity(samples, sample_rate, frequency);
        PitchResult {
            frequency,
            confidence,
            is_valid: confidence > CONFIDENCE_THRESHOLD,
            rms,
        }
    }
}

/// Finds the autocorrelation peak in `[min_lag, max_lag]` and converts
/// it to a frequency.
///
/// Only the first `min(len, 2 * max_lag)` samples participate, which
/// bounds the cost of the double loop and guarantees the shifted index
/// never leaves the buffer. Ties at the maximum resolve to the
/// smallest lag because the running peak is only replaced on a strict
/// increase while scanning lags in ascending order.
fn estimate_frequency(samples: &[f32], sample_rate: f32, min_lag: usize, max_lag: usize) -> f32 {
    let window = samples.len().min(2 * max_lag);

    let correlations: Vec<f32> = (min_lag..=max_lag)
        .map(|lag| {
            samples[..window - lag]
                .iter()
                .zip(samples[lag..window].iter())
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect();

    let mut peak = 0;
    let mut peak_value = correlations[0];
    for (i, &value) in correlations.iter().enumerate().skip(1) {
        if value > peak_value {
            peak = i;
            peak_value = value;
        }
    }

    let refined_lag = if peak == 0 || peak + 1 >= correlations.len() {
        // No neighbor on one side; keep the integer lag.
        (min_lag + peak) as f32
    } else {
        let alpha = correlations[peak - 1];
        let beta = correlations[peak];
        let gamma = correlations[peak + 1];
        let denominator = alpha - 2.0 * beta + gamma;
        let offset = if denominator == 0.0 {
            // Flat peak, the parabola degenerates to a line.
            0.0
        } else {
            0.5 * (alpha - gamma) / denominator
        };
        (min_lag + peak) as f32 + offset
    };

    sample_rate / refined_lag
}

/// Correlation of the buffer with itself at the detected period,
/// normalized by the buffer's own energy and clamped to `[0, 1]`.
///
/// This is a simplified self-similarity ratio, not a textbook
/// normalized autocorrelation: the displaced window's energy is not
/// divided out. The simplification reads high on harmonically rich
/// signals (real strings) and low on pure sines near the bottom of the
/// range; the `> 0.5` validity gate is calibrated against it, so
/// changing the formula means recalibrating the gate.
fn self_similarity(samples: &[f32], sample_rate: f32, frequency: f32) -> f32 {
    let period = (sample_rate / frequency) as usize;
    if period == 0 || period >= samples.len() / 2 {
        // Not enough buffer left for a second look at the waveform.
        return 0.0;
    }

    let count = (samples.len() - period).min(2 * period);
    let mut shifted = 0.0;
    let mut energy = 0.0;
    for i in 0..count {
        shifted += samples[i] * samples[i + period];
        energy += samples[i] * samples[i];
    }
    if energy == 0.0 {
        return 0.0;
    }
    (shifted / energy).clamp(0.0, 1.0)
}
