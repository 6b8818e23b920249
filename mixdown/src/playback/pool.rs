//! Fixed-capacity PCM buffer pool
//!
//! All buffers are allocated once at initialization and recycled for the
//! engine's lifetime; the pool never grows, keeping per-update work bounded.
//! `acquire` is non-blocking; an empty free list is a throttling condition
//! for decode-ahead, not an error.

use tracing::error;

/// Identifier of a pool entry. Only ever held by the engine and the
/// instances' buffer queues, never handed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferId(u32);

/// One reusable block of interleaved 16-bit PCM.
pub struct PcmBuffer {
    samples: Box<[i16]>,
    /// Valid frames currently in the buffer
    frames: usize,
    /// Channel layout of the valid region
    channels: u16,
}

impl PcmBuffer {
    fn new(capacity_frames: usize) -> Self {
        Self {
            // Sized for the worst case (stereo)
            samples: vec![0i16; capacity_frames * 2].into_boxed_slice(),
            frames: 0,
            channels: 2,
        }
    }

    /// Prepare the buffer for a fresh decode with the given layout.
    pub fn begin_fill(&mut self, channels: u16) {
        self.channels = channels;
        self.frames = 0;
    }

    /// Writable region from `from_frame` up to `to_frame` (exclusive).
    pub fn region_mut(&mut self, from_frame: usize, to_frame: usize) -> &mut [i16] {
        let ch = self.channels as usize;
        &mut self.samples[from_frame * ch..to_frame * ch]
    }

    /// Mark `frames` frames as valid after a decode pass.
    pub fn set_frames(&mut self, frames: usize) {
        self.frames = frames;
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// The valid interleaved samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples[..self.frames * self.channels as usize]
    }
}

struct PoolEntry {
    buffer: PcmBuffer,
    checked_out: bool,
}

/// Fixed set of reusable PCM buffers.
pub struct BufferPool {
    entries: Vec<PoolEntry>,
    free: Vec<u32>,
}

impl BufferPool {
    /// Allocate `max_buffers` buffers of `capacity_frames` frames each.
    pub fn new(max_buffers: usize, capacity_frames: usize) -> Self {
        let entries = (0..max_buffers)
            .map(|_| PoolEntry {
                buffer: PcmBuffer::new(capacity_frames),
                checked_out: false,
            })
            .collect();
        let free = (0..max_buffers as u32).rev().collect();
        Self { entries, free }
    }

    /// Check out a buffer, or `None` when every entry is in use.
    pub fn acquire(&mut self) -> Option<BufferId> {
        let index = self.free.pop()?;
        self.entries[index as usize].checked_out = true;
        Some(BufferId(index))
    }

    /// Return a buffer to the free list.
    pub fn release(&mut self, id: BufferId) {
        let entry = &mut self.entries[id.0 as usize];
        if !entry.checked_out {
            // Double release would corrupt the free list; drop the request
            error!("buffer {} released twice", id.0);
            debug_assert!(false, "double release of pool buffer");
            return;
        }
        entry.checked_out = false;
        self.free.push(id.0);
    }

    pub fn get(&self, id: BufferId) -> &PcmBuffer {
        &self.entries[id.0 as usize].buffer
    }

    pub fn get_mut(&mut self, id: BufferId) -> &mut PcmBuffer {
        &mut self.entries[id.0 as usize].buffer
    }

    /// Entries currently on the free list.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Total entries, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }
}
