//! Mix step
//!
//! Consumes ready buffers from an instance's queue into the master
//! accumulation buffer, releasing each pool buffer as soon as it is fully
//! consumed. Underflow (a still-playing, non-exhausted instance with no
//! ready audio) is counted once per mix step per instance.

use crate::audio::types::{AudioFrame, I16_SCALE};
use crate::playback::instance::{PlayState, SoundInstance};
use crate::playback::pool::BufferPool;
use crate::playback::stats::StatsHandle;
use tracing::warn;

/// Mix one update's worth of frames from `instance` into `master`.
///
/// Mono sources are duplicated to both output channels; stereo sources are
/// summed channel for channel. Samples are accumulated unclamped; the
/// engine clamps the master buffer once after all instances are mixed.
pub(crate) fn mix_instance(
    instance: &mut SoundInstance,
    pool: &mut BufferPool,
    stats: &StatsHandle,
    master: &mut [AudioFrame],
) {
    if instance.state != PlayState::Playing {
        return;
    }

    let mut out_pos = 0;
    while out_pos < master.len() {
        let Some(front) = instance.queue.front_mut() else {
            if !instance.exhausted && !instance.failed {
                stats.add_buffer_underflow();
                if !instance.underflowed {
                    instance.underflowed = true;
                    warn!("buffer underflow: no ready audio for playing instance");
                }
            }
            break;
        };

        let buffer = pool.get(front.id);
        let channels = buffer.channels() as usize;
        let samples = buffer.samples();

        let available = buffer.frames() - front.cursor_frames;
        let take = available.min(master.len() - out_pos);

        for i in 0..take {
            let base = (front.cursor_frames + i) * channels;
            let frame = if channels == 2 {
                AudioFrame::from_stereo(
                    samples[base] as f32 * I16_SCALE,
                    samples[base + 1] as f32 * I16_SCALE,
                )
            } else {
                AudioFrame::from_mono(samples[base] as f32 * I16_SCALE)
            };
            master[out_pos + i].add(&frame);
        }

        front.cursor_frames += take;
        out_pos += take;

        if front.cursor_frames >= buffer.frames() {
            // Spent; back to the pool for decode-ahead to reuse
            if let Some(spent) = instance.queue.pop_front() {
                pool.release(spent.id);
            }
        }
    }
}
