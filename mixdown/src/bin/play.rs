//! Demo player
//!
//! Plays one WAV or Ogg Vorbis file through the default output device,
//! pacing the engine's cooperative update loop against the wall clock.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mixdown::output::DeviceOutput;
use mixdown::{SoundFormat, SoundSystem, SystemConfig};

/// Command-line arguments for the demo player
#[derive(Parser, Debug)]
#[command(name = "play")]
#[command(about = "Play a WAV or Ogg Vorbis file through the mixdown engine")]
#[command(version)]
struct Args {
    /// Audio file to play (.wav or .ogg)
    file: PathBuf,

    /// Loop playback until interrupted
    #[arg(long)]
    looping: bool,

    /// Optional engine configuration (TOML)
    #[arg(short, long, env = "MIXDOWN_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mixdown=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SystemConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SystemConfig::default(),
    };

    let format = match args
        .file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("wav") => SoundFormat::Wav,
        Some("ogg") => SoundFormat::OggVorbis,
        other => bail!("unsupported file extension {:?} (expected .wav or .ogg)", other),
    };

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    info!("loaded {} ({} bytes, {})", args.file.display(), bytes.len(), format);

    let (device, mut sink) =
        DeviceOutput::open(None).context("failed to open audio output device")?;
    if device.sample_rate() != config.sample_rate {
        warn!(
            "device runs at {} Hz but engine is configured for {} Hz; playback speed will be off",
            device.sample_rate(),
            config.sample_rate
        );
    }

    let mut system = SoundSystem::new(config.clone()).context("failed to initialize engine")?;
    let data = system.new_sound_data(&bytes, format)?;
    let instance = system.new_sound_instance(data)?;
    system.set_looping(instance, args.looping)?;
    system.play(instance)?;

    // Pace updates so the ring stays fed without overrunning
    let tick = Duration::from_secs_f64(config.mix_frames as f64 / config.sample_rate as f64);
    info!("playing ({}ms per update)", tick.as_millis());

    loop {
        let started = Instant::now();
        system.update(&mut sink)?;

        if !system.is_playing(instance)? {
            break;
        }

        if let Some(remaining) = tick.checked_sub(started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    // Let the device drain what we queued before tearing the stream down
    while sink.queued_frames() > 0 {
        std::thread::sleep(Duration::from_millis(10));
    }

    let stats = system.stats();
    info!(
        "done: {} underflows, {} pool stalls, {} device callback underruns",
        stats.buffer_underflow_count,
        stats.pool_exhaustion_count,
        device.underruns()
    );

    Ok(())
}
