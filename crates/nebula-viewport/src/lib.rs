//! 3D main-screen viewport for a 2D space game.
//!
//! [`Viewport3D::draw`] renders one frame: the blended skybox, engine
//! exhaust, world geometry (through [`RenderBackend::render_scene`]), the
//! space-dust streaks around the player ship, the target reticle and the
//! HUD text. Graphics, particles, audio and text go through the traits in
//! [`backend`] and [`target`]; [`headless`] provides recording versions of
//! all of them.

pub mod backend;
pub mod camera;
pub mod engine_particles;
pub mod headless;
pub mod hud;
pub mod reticle;
pub mod skybox;
pub mod space_dust;
pub mod target;
mod viewport;
pub mod zone;

pub use backend::{
    AudioListener, Billboard, FrameMatrices, ParticleEngine, ParticleSpawn, RenderBackend,
};
pub use camera::{Camera, ScreenProjector};
pub use skybox::{SkyboxCache, SkyboxSelection};
pub use space_dust::SpaceDust;
pub use target::{Alignment, Font, PixelRect, Rect, RenderTarget, Rgba8};
pub use viewport::{FrameStats, Viewport3D};
