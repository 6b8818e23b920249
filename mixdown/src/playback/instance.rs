//! Sound instance lifecycle
//!
//! One instance is one playback session against a sound data entry: a
//! decoder handle, a queue of in-flight pool buffers and the play state
//! machine.
//!
//! State machine:
//!
//! ```text
//! Idle --Play--> Playing --(stream end, not looping)--> Stopped
//!                Playing --(stream end, looping)-----> Playing (rewound)
//!                Playing --Stop--> Stopped --Play--> Playing (fresh restart)
//! ```

use crate::audio::decoder::Decoder;
use crate::playback::pool::{BufferId, BufferPool};
use crate::playback::stats::StatsHandle;
use crate::playback::SoundDataHandle;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Playback state of a sound instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    /// Created, never played
    Idle,
    /// Actively decoding and mixing
    Playing,
    /// Stopped explicitly or by reaching end of stream
    Stopped,
}

impl std::fmt::Display for PlayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayState::Idle => write!(f, "idle"),
            PlayState::Playing => write!(f, "playing"),
            PlayState::Stopped => write!(f, "stopped"),
        }
    }
}

/// A checked-out pool buffer awaiting consumption by the mixer.
#[derive(Debug)]
pub(crate) struct QueuedBuffer {
    pub(crate) id: BufferId,
    /// Frames of this buffer already mixed
    pub(crate) cursor_frames: usize,
}

/// Per-playback state machine.
///
/// Owns at most one decoder; the queue depth never exceeds the engine's
/// decode-ahead target.
pub struct SoundInstance {
    pub(crate) data: SoundDataHandle,
    pub(crate) state: PlayState,
    pub(crate) looping: bool,
    /// The decoder returned end of stream and will not be asked again
    pub(crate) exhausted: bool,
    /// A decode error stopped this instance
    pub(crate) failed: bool,
    /// Cumulative: at least one mix step found no ready buffer
    pub(crate) underflowed: bool,
    pub(crate) decoder: Option<Box<dyn Decoder>>,
    pub(crate) queue: VecDeque<QueuedBuffer>,
}

impl SoundInstance {
    pub(crate) fn new(data: SoundDataHandle) -> Self {
        Self {
            data,
            state: PlayState::Idle,
            looping: false,
            exhausted: false,
            failed: false,
            underflowed: false,
            decoder: None,
            queue: VecDeque::new(),
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    /// True while the instance still produces or drains audio.
    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing && (!self.exhausted || self.looping)
    }

    /// Begin playback from frame 0 with a freshly opened decoder.
    ///
    /// Also the restart path: outstanding buffers go back to the pool and
    /// any previous decoder is dropped.
    pub(crate) fn start(&mut self, decoder: Box<dyn Decoder>, pool: &mut BufferPool) {
        self.release_queue(pool);
        self.decoder = Some(decoder);
        self.state = PlayState::Playing;
        self.exhausted = false;
        self.failed = false;
    }

    /// Stop playback, releasing the decoder and every queued buffer
    /// synchronously.
    pub(crate) fn halt(&mut self, pool: &mut BufferPool) {
        self.release_queue(pool);
        self.decoder = None;
        self.state = PlayState::Stopped;
    }

    /// Return all queued buffers to the pool.
    pub(crate) fn release_queue(&mut self, pool: &mut BufferPool) {
        while let Some(queued) = self.queue.pop_front() {
            pool.release(queued.id);
        }
    }

    /// Decode ahead until the queue reaches `target_depth` or the pool runs
    /// dry.
    ///
    /// At end of stream a looping instance rewinds and keeps filling the
    /// same buffer, so the loop seam lands mid-buffer with no gap. A decode
    /// failure stops the instance and releases its resources before
    /// returning.
    pub(crate) fn fill_ahead(
        &mut self,
        pool: &mut BufferPool,
        stats: &StatsHandle,
        target_depth: usize,
        frames_per_buffer: usize,
    ) {
        if self.state != PlayState::Playing || self.failed {
            return;
        }

        while self.queue.len() < target_depth && !self.exhausted {
            let Some(decoder) = self.decoder.as_mut() else {
                return;
            };

            let Some(id) = pool.acquire() else {
                // Throttled, not an error; decode-ahead resumes when the
                // mixer returns buffers
                stats.add_pool_exhaustion();
                return;
            };

            let channels = decoder.info().channels;
            let buffer = pool.get_mut(id);
            buffer.begin_fill(channels);

            let mut filled = 0;
            let mut decode_error = None;
            let mut rewound_without_progress = false;
            while filled < frames_per_buffer {
                let region = buffer.region_mut(filled, frames_per_buffer);
                match decoder.decode(region, frames_per_buffer - filled) {
                    Ok(0) => {
                        // A stream that yields nothing even after a rewind
                        // would spin here forever; treat it as drained
                        if self.looping && !rewound_without_progress {
                            if let Err(e) = decoder.rewind() {
                                decode_error = Some(e);
                                break;
                            }
                            rewound_without_progress = true;
                        } else {
                            self.exhausted = true;
                            break;
                        }
                    }
                    Ok(frames) => {
                        filled += frames;
                        rewound_without_progress = false;
                    }
                    Err(e) => {
                        decode_error = Some(e);
                        break;
                    }
                }
            }
            buffer.set_frames(filled);

            if let Some(e) = decode_error {
                pool.release(id);
                stats.add_decode_error();
                warn!("decode failed, stopping instance: {}", e);
                self.failed = true;
                self.halt(pool);
                return;
            }

            if filled == 0 {
                // Stream ended exactly on a buffer boundary
                pool.release(id);
                return;
            }

            self.queue.push_back(QueuedBuffer {
                id,
                cursor_frames: 0,
            });
        }
    }

    /// Transition to Stopped once an exhausted stream has drained.
    pub(crate) fn settle(&mut self) {
        if self.state == PlayState::Playing && self.exhausted && self.queue.is_empty() {
            debug!("instance drained, stopping");
            self.decoder = None;
            self.state = PlayState::Stopped;
        }
    }
}
