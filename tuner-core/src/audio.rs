//! # Audio Capture Module
//!
//! Real-time microphone capture using CPAL (Cross-Platform Audio
//! Library). This is plumbing only: it negotiates an input stream,
//! chops the callback data into fixed-size frames and hands each
//! frame to the analysis side over a channel. The pitch engine never
//! touches this module.
//!
//! ## Features
//! - Default input device selection with mono f32 format negotiation
//! - Fixed-size frame accumulation independent of the device period
//! - Non-blocking hand-off to the analysis thread
//! - Error handling via `anyhow`

use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

/// Samples per analysis frame.
///
/// 4096 samples at 44.1 kHz is roughly 93 ms per frame. The low E
/// string (~82.4 Hz) needs at least two full periods of buffer for
/// autocorrelation, about 1260 samples at that rate, so 4096 leaves a
/// comfortable margin.
pub const FRAME_SIZE: usize = 4096;

/// Preferred capture rate in Hz; the actual rate is negotiated with
/// the device and returned from [`start_capture`].
const TARGET_SAMPLE_RATE: u32 = 44100;

/// Starts capturing from the default input device.
///
/// Each complete [`FRAME_SIZE`] frame is copied out of the stream
/// callback and pushed through `sender` with `try_send`: if the
/// analysis side falls behind, frames are dropped rather than blocking
/// the audio thread. Because every frame crosses the channel by value,
/// the buffer the analysis side receives is always a consistent
/// snapshot.
///
/// Returns the live stream handle (capture stops when it is dropped)
/// together with the negotiated sample rate.
pub fn start_capture(sender: Sender<Vec<f32>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    println!("Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported = pick_input_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No mono f32 input format available"))?;

    // Land as close to the target rate as the device allows.
    let rate = TARGET_SAMPLE_RATE.clamp(
        supported.min_sample_rate().0,
        supported.max_sample_rate().0,
    );
    let config = supported.with_sample_rate(cpal::SampleRate(rate));
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();

    println!("Capturing at {} Hz", sample_rate);

    let err_fn = |err| eprintln!("[AUDIO] Stream error: {}", err);

    // Accumulates callback data until a full frame is available. The
    // device's own period rarely matches FRAME_SIZE.
    let mut pending: Vec<f32> = Vec::with_capacity(FRAME_SIZE * 2);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            pending.extend_from_slice(data);

            while pending.len() >= FRAME_SIZE {
                let frame = pending[..FRAME_SIZE].to_vec();
                let _ = sender.try_send(frame);
                pending.drain(..FRAME_SIZE);
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Picks the mono f32 input configuration whose supported rate range
/// lies closest to `target_rate`.
fn pick_input_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.channels() == 1 && c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let below = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
            let above = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
            below.min(above)
        })
}
