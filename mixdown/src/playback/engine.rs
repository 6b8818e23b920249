//! Sound system engine
//!
//! The explicit engine object owning the buffer pool and the handle
//! registries for sound data and instances. All operations run on one
//! logical thread; `update()` is the cooperative tick that drives
//! decode-ahead and mixing without ever blocking on I/O.
//!
//! Construction replaces global initialization: independent engines can
//! coexist (one per test, for instance) and dropping the engine releases
//! everything it owns.

use crate::audio::decoder::open_decoder;
use crate::audio::types::{AudioFrame, SoundFormat, StreamInfo};
use crate::config::SystemConfig;
use crate::error::{Error, Result};
use crate::output::AudioSink;
use crate::playback::instance::{PlayState, SoundInstance};
use crate::playback::mixer;
use crate::playback::pool::BufferPool;
use crate::playback::slot::SlotArena;
use crate::playback::stats::{SoundStats, StatsHandle};
use crate::playback::{SoundDataHandle, SoundInstanceHandle};
use std::sync::Arc;
use tracing::debug;

/// An asset's encoded bytes plus format tag, shareable across instances.
///
/// The byte buffer is reference counted; decoders opened against it keep
/// their own clone of the `Arc`, so replacing the payload never disturbs
/// an instance that is already playing.
pub struct SoundData {
    format: SoundFormat,
    bytes: Arc<[u8]>,
    /// Populated on first decoder open, cleared when the payload changes
    info: Option<StreamInfo>,
}

impl SoundData {
    /// Format tag, immutable after creation.
    pub fn format(&self) -> SoundFormat {
        self.format
    }

    /// Decoded metadata, if a decoder has been opened since the payload
    /// was last set.
    pub fn info(&self) -> Option<StreamInfo> {
        self.info
    }
}

/// Real-time playback engine.
///
/// Decodes shared sound data into a fixed pool of PCM buffers and mixes
/// every playing instance into the output sink, one caller-paced tick at
/// a time.
///
/// The mixer does not resample: assets are expected to match the
/// configured output rate, and mono assets are up-mixed to the stereo
/// output at mix time.
pub struct SoundSystem {
    config: SystemConfig,
    data: SlotArena<SoundData>,
    instances: SlotArena<SoundInstance>,
    pool: BufferPool,
    stats: StatsHandle,
    master: Vec<AudioFrame>,
}

impl SoundSystem {
    /// Initialize the engine: allocates the buffer pool and the handle
    /// tables up front. No allocation grows after this point.
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;

        debug!(
            "sound system init: {} buffers x {} frames, {} sources",
            config.max_buffers, config.buffer_frames, config.max_sources
        );

        let pool = BufferPool::new(config.max_buffers as usize, config.buffer_frames);
        let data = SlotArena::with_capacity(config.max_sound_data as usize);
        let instances = SlotArena::with_capacity(config.max_sources as usize);
        let master = vec![AudioFrame::zero(); config.mix_frames];

        Ok(Self {
            config,
            data,
            instances,
            pool,
            stats: StatsHandle::new(),
            master,
        })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Sound data
    // ------------------------------------------------------------------

    /// Register an encoded asset. The input bytes are copied; the caller's
    /// buffer can be reused immediately.
    ///
    /// Metadata (channel count, sample rate) is populated lazily on the
    /// first decoder open, so malformed payloads surface at `play`, not
    /// here.
    pub fn new_sound_data(&mut self, bytes: &[u8], format: SoundFormat) -> Result<SoundDataHandle> {
        let entry = SoundData {
            format,
            bytes: Arc::from(bytes),
            info: None,
        };
        let handle = self
            .data
            .insert(entry)
            .ok_or_else(|| Error::OutOfResources("sound data table full".into()))?;
        Ok(SoundDataHandle(handle))
    }

    /// Replace the encoded payload in place, preserving the handle and the
    /// format tag.
    ///
    /// Instances with an open decoder keep playing the old payload (the
    /// decoder owns its own reference-counted copy); the next `play` picks
    /// up the new bytes.
    pub fn set_sound_data(&mut self, handle: SoundDataHandle, bytes: &[u8]) -> Result<()> {
        let entry = self
            .data
            .get_mut(handle.0)
            .ok_or_else(|| Error::StaleHandle("sound data".into()))?;
        entry.bytes = Arc::from(bytes);
        entry.info = None;
        Ok(())
    }

    /// Delete a sound data entry.
    ///
    /// Fails with [`Error::ResourceInUse`] while any live instance still
    /// references the handle; delete the instances first.
    pub fn delete_sound_data(&mut self, handle: SoundDataHandle) -> Result<()> {
        if self.data.get(handle.0).is_none() {
            return Err(Error::StaleHandle("sound data".into()));
        }
        if self.instances.values().any(|i| i.data == handle) {
            return Err(Error::ResourceInUse(
                "sound data still referenced by live instances".into(),
            ));
        }
        self.data.remove(handle.0);
        Ok(())
    }

    /// Access a live sound data entry (format tag, cached metadata).
    pub fn sound_data(&self, handle: SoundDataHandle) -> Result<&SoundData> {
        self.data
            .get(handle.0)
            .ok_or_else(|| Error::StaleHandle("sound data".into()))
    }

    // ------------------------------------------------------------------
    // Instances
    // ------------------------------------------------------------------

    /// Create a playback session against `data`.
    ///
    /// Fails with [`Error::OutOfResources`] when the live-instance count
    /// has reached the configured source limit.
    pub fn new_sound_instance(&mut self, data: SoundDataHandle) -> Result<SoundInstanceHandle> {
        if self.data.get(data.0).is_none() {
            return Err(Error::StaleHandle("sound data".into()));
        }
        let handle = self
            .instances
            .insert(SoundInstance::new(data))
            .ok_or_else(|| Error::OutOfResources("all sources in use".into()))?;
        Ok(SoundInstanceHandle(handle))
    }

    /// Delete an instance in any state.
    ///
    /// Queued buffers and the decoder are released synchronously, so a
    /// following `update` never sees the deleted instance.
    pub fn delete_sound_instance(&mut self, handle: SoundInstanceHandle) -> Result<()> {
        let mut instance = self
            .instances
            .remove(handle.0)
            .ok_or_else(|| Error::StaleHandle("sound instance".into()))?;
        instance.halt(&mut self.pool);
        Ok(())
    }

    /// Start (or restart) playback from frame 0.
    ///
    /// Opens a fresh decoder against the current payload. Calling `play`
    /// on an already-playing instance restarts it from the beginning:
    /// queued buffers are returned to the pool and the old decoder is
    /// dropped.
    pub fn play(&mut self, handle: SoundInstanceHandle) -> Result<()> {
        let data_handle = self
            .instances
            .get(handle.0)
            .ok_or_else(|| Error::StaleHandle("sound instance".into()))?
            .data;

        let entry = self
            .data
            .get_mut(data_handle.0)
            .ok_or_else(|| Error::StaleHandle("sound data deleted under instance".into()))?;
        let decoder = open_decoder(entry.format, Arc::clone(&entry.bytes))?;
        if entry.info.is_none() {
            entry.info = Some(decoder.info());
        }

        let instance = self
            .instances
            .get_mut(handle.0)
            .ok_or_else(|| Error::StaleHandle("sound instance".into()))?;
        instance.start(decoder, &mut self.pool);
        Ok(())
    }

    /// Stop playback, releasing all queued buffers to the pool immediately
    /// (not deferred to the next update).
    pub fn stop(&mut self, handle: SoundInstanceHandle) -> Result<()> {
        let instance = self
            .instances
            .get_mut(handle.0)
            .ok_or_else(|| Error::StaleHandle("sound instance".into()))?;
        instance.halt(&mut self.pool);
        Ok(())
    }

    /// Set the looping flag. Legal in any state; takes effect at end of
    /// stream.
    pub fn set_looping(&mut self, handle: SoundInstanceHandle, looping: bool) -> Result<()> {
        let instance = self
            .instances
            .get_mut(handle.0)
            .ok_or_else(|| Error::StaleHandle("sound instance".into()))?;
        instance.looping = looping;
        Ok(())
    }

    /// True while the instance is playing and either not yet exhausted or
    /// looping.
    pub fn is_playing(&self, handle: SoundInstanceHandle) -> Result<bool> {
        self.instances
            .get(handle.0)
            .map(|i| i.is_playing())
            .ok_or_else(|| Error::StaleHandle("sound instance".into()))
    }

    /// Playback state of an instance.
    pub fn play_state(&self, handle: SoundInstanceHandle) -> Result<PlayState> {
        self.instances
            .get(handle.0)
            .map(|i| i.state())
            .ok_or_else(|| Error::StaleHandle("sound instance".into()))
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// One cooperative tick: for every playing instance, decode ahead into
    /// pool buffers up to the target queue depth, mix ready buffers into
    /// the master buffer, retire consumed buffers, and count underflow
    /// where an instance had nothing ready. The clamped master mix is then
    /// pushed to `sink`.
    ///
    /// Work is bounded by the instance count and the decode-ahead depth;
    /// nothing blocks. Per-instance decode errors stop the failing
    /// instance and are recorded in the stats; they do not fail the
    /// update.
    pub fn update(&mut self, sink: &mut dyn AudioSink) -> Result<()> {
        for frame in self.master.iter_mut() {
            *frame = AudioFrame::zero();
        }

        for handle in self.instances.handles() {
            let Some(instance) = self.instances.get_mut(handle) else {
                continue;
            };

            instance.fill_ahead(
                &mut self.pool,
                &self.stats,
                self.config.decode_ahead,
                self.config.buffer_frames,
            );
            mixer::mix_instance(instance, &mut self.pool, &self.stats, &mut self.master);
            instance.settle();
        }

        for frame in self.master.iter_mut() {
            frame.clamp();
        }
        sink.write(&self.master);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Snapshot of the engine counters.
    pub fn stats(&self) -> SoundStats {
        self.stats.snapshot()
    }

    /// Cloneable counter view for reads from other threads.
    pub fn stats_handle(&self) -> StatsHandle {
        self.stats.clone()
    }

    /// Pool entries currently free. Every acquire is matched by exactly
    /// one release, so this returns to capacity whenever no instance holds
    /// queued buffers.
    pub fn free_buffer_count(&self) -> usize {
        self.pool.free_count()
    }

    /// Live instance count.
    pub fn live_instances(&self) -> usize {
        self.instances.len()
    }

    /// Live sound data count.
    pub fn live_sound_data(&self) -> usize {
        self.data.len()
    }
}
