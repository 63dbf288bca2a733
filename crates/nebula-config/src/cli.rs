//! Command-line argument parsing for the viewport.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Preference key holding the main screen's vertical field of view in degrees.
pub const CAMERA_FOV_KEY: &str = "main_screen_camera_fov";

/// Viewport command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "nebula-viewport", about = "Nebula space viewport")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Vertical field of view in degrees.
    #[arg(long)]
    pub fov: Option<f32>,

    /// Draw callsigns.
    #[arg(long)]
    pub show_callsigns: Option<bool>,

    /// Draw heading ticks.
    #[arg(long)]
    pub show_headings: Option<bool>,

    /// Draw space dust.
    #[arg(long)]
    pub show_spacedust: Option<bool>,

    /// Number of space dust segments.
    #[arg(long)]
    pub dust_count: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fov) = args.fov {
            self.preferences.set(CAMERA_FOV_KEY, fov);
        }
        if let Some(show) = args.show_callsigns {
            self.viewport.show_callsigns = show;
        }
        if let Some(show) = args.show_headings {
            self.viewport.show_headings = show;
        }
        if let Some(show) = args.show_spacedust {
            self.viewport.show_spacedust = show;
        }
        if let Some(count) = args.dust_count {
            self.viewport.spacedust_particle_count = count;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
