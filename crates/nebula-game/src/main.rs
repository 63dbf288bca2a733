//! Nebula viewport demo.
//!
//! Builds a small scenario (a player ship, a locked target, a station and a
//! nebula zone), flies it for a number of frames and draws each one through
//! the 3D viewport. Frames go to the recording backend by default, or to an
//! offscreen wgpu target with `--gpu`.
//!
//! Run with: `cargo run -p nebula-game -- --frames 600 --gpu`

mod flight;
mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;

use bevy_ecs::world::World;
use clap::Parser;
use nebula_config::{CliArgs, Config};
use nebula_render::WgpuBackend;
use nebula_viewport::headless::{HeadlessBackend, ParticleLog, RecordingListener, TextLog};
use nebula_viewport::{FrameStats, RenderBackend, Viewport3D};
use tracing::{debug, error, info, warn};

/// Fixed simulation step.
const FRAME_DT: f32 = 1.0 / 60.0;

/// CLI arguments for the demo binary.
#[derive(Parser, Debug)]
#[command(name = "nebula-game", about = "Nebula space viewport demo")]
struct GameArgs {
    #[command(flatten)]
    viewport: CliArgs,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 300)]
    frames: u32,

    /// Render into an offscreen wgpu target instead of the recording backend.
    #[arg(long)]
    gpu: bool,
}

/// Totals over a whole run.
#[derive(Debug, Default)]
struct RunSummary {
    frames: u32,
    particles: usize,
    dust_uploads: usize,
    reticle_frames: u32,
    callsigns: usize,
    headings: usize,
    zone_frames: u32,
}

impl RunSummary {
    fn record(&mut self, stats: &FrameStats) {
        if !stats.drawn {
            return;
        }
        self.frames += 1;
        self.particles += stats.particles_spawned;
        self.dust_uploads += usize::from(stats.dust_uploaded);
        self.reticle_frames += u32::from(stats.reticle_drawn);
        self.callsigns += stats.callsigns_drawn;
        self.headings += stats.headings_drawn;
        if stats.skybox.as_ref().is_some_and(|s| s.blend > 0.0) {
            self.zone_frames += 1;
        }
    }
}

fn config_dir(args: &CliArgs) -> Option<PathBuf> {
    args.config.clone().or_else(Config::default_dir)
}

fn load_config(args: &CliArgs) -> Result<Config, nebula_config::ConfigError> {
    let mut config = match config_dir(args) {
        Some(dir) => Config::load_or_create(&dir)?,
        None => Config::default(),
    };
    config.apply_cli_overrides(args);
    Ok(config)
}

/// Fly the scenario for `frames` frames through `viewport`.
fn run_frames<B: RenderBackend>(
    viewport: &mut Viewport3D<B, ParticleLog>,
    target: &mut TextLog,
    world: &mut World,
    frames: u32,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for frame in 0..frames {
        flight::step(world, FRAME_DT);
        flight::turn_player(world, FRAME_DT);
        flight::chase_camera(world, &mut viewport.camera);

        target.clear();
        let stats = viewport.draw(target, world);
        debug!(
            frame,
            particles = stats.particles_spawned,
            dust_respawned = stats.dust_respawned,
            callsigns = stats.callsigns_drawn,
            headings = stats.headings_drawn,
            skybox = ?stats.skybox,
            "frame drawn"
        );
        summary.record(&stats);
    }
    summary
}

fn report(summary: &RunSummary, particles: &ParticleLog) {
    info!(
        "Drew {} frames: {} particles spawned ({} recorded), {} dust uploads",
        summary.frames,
        summary.particles,
        particles.spawned.len(),
        summary.dust_uploads,
    );
    info!(
        "Overlays: reticle on {} frames, {} callsigns, {} heading ticks, zone sky on {} frames",
        summary.reticle_frames, summary.callsigns, summary.headings, summary.zone_frames,
    );
}

fn run_headless(config: &Config, world: &mut World, frames: u32) {
    let listener = RecordingListener::default();
    let mut viewport =
        Viewport3D::from_config(HeadlessBackend::default(), ParticleLog::default(), config)
            .with_audio_listener(Box::new(listener.clone()));
    let mut target = TextLog::new(config.window.width, config.window.height);

    let summary = run_frames(&mut viewport, &mut target, world, frames);
    report(&summary, viewport.particles());
    info!(
        "Headless backend: {} skybox draws, {} cubemap loads {:?}, listener at {:?}",
        viewport.backend().skybox_draws.len(),
        viewport.backend().cubemap_loads.len(),
        viewport.backend().cubemap_loads,
        listener.last(),
    );
}

fn run_gpu(config: &Config, world: &mut World, frames: u32) -> Result<(), nebula_render::RenderError> {
    let gpu = nebula_render::init_headless_blocking()?;
    let mut backend = WgpuBackend::new(gpu, config.window.width, config.window.height)?;
    backend.set_clear_color(Some(wgpu::Color::BLACK));
    let mut viewport = Viewport3D::from_config(backend, ParticleLog::default(), config);
    let mut target = TextLog::new(config.window.width, config.window.height);

    let summary = run_frames(&mut viewport, &mut target, world, frames);
    report(&summary, viewport.particles());

    let backend = viewport.backend();
    let lit = backend
        .read_pixels()
        .map(|pixels| pixels.chunks_exact(4).filter(|px| px[..3] != [0, 0, 0]).count());
    info!(
        "GPU backend: {} frames submitted, {:?} lit pixels in the last frame",
        backend.frames_submitted(),
        lit,
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = GameArgs::parse();

    let config = match load_config(&args.viewport) {
        Ok(config) => config,
        Err(e) => {
            nebula_log::init_logging(None, cfg!(debug_assertions), None);
            error!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_dir = config_dir(&args.viewport).map(|dir| dir.join("logs"));
    nebula_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    info!("Nebula viewport demo");
    info!(
        "Viewport: {}x{} | callsigns={} headings={} dust={} ({} segments)",
        config.window.width,
        config.window.height,
        config.viewport.show_callsigns,
        config.viewport.show_headings,
        config.viewport.show_spacedust,
        config.viewport.spacedust_particle_count,
    );

    let mut world = scenario::build_scenario(&config);

    if args.gpu {
        match run_gpu(&config, &mut world, args.frames) {
            Ok(()) => return ExitCode::SUCCESS,
            Err(e) => {
                warn!("GPU backend unavailable ({e}), falling back to headless");
                world = scenario::build_scenario(&config);
            }
        }
    }

    run_headless(&config, &mut world, args.frames);
    ExitCode::SUCCESS
}
