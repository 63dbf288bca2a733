//! Seams to the graphics API, particle engine and audio system.

use bevy_ecs::world::World;
use glam::{Mat4, Vec2, Vec3};

use crate::target::PixelRect;

/// View and projection for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    /// World to view space.
    pub view: Mat4,
    /// View to clip space (wgpu depth range 0..1).
    pub projection: Mat4,
}

impl FrameMatrices {
    /// Combined world to clip transform.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// A camera-facing textured quad.
#[derive(Debug, Clone, PartialEq)]
pub struct Billboard {
    /// Texture name in the texture manager.
    pub texture: &'static str,
    /// Places the quad's center in the world.
    pub model: Mat4,
    /// Color multiplied into the texture.
    pub tint: Vec3,
    /// Edge length of the quad in world units.
    pub size: f32,
    /// Whether the quad is depth tested against world geometry.
    pub depth_test: bool,
}

/// Graphics API operations the viewport issues each frame.
///
/// Calls arrive in frame order: `begin_frame`, skybox, scene, dust,
/// billboards, `end_frame`. `load_cubemap` and the dust uploads may happen
/// anywhere inside that sequence.
pub trait RenderBackend {
    /// Handle to a loaded cubemap texture.
    type Cubemap;

    /// Load the cubemap named `name` (e.g. `skybox/default`).
    fn load_cubemap(&mut self, name: &str) -> Self::Cubemap;

    /// Reserve the dust vertex buffer and upload the per-vertex signs.
    /// Called once; positions start zeroed.
    fn allocate_dust(&mut self, signs: &[f32]);

    /// Start a frame restricted to `viewport`, with a cleared depth buffer.
    fn begin_frame(&mut self, viewport: PixelRect);

    /// Draw the background cube, blending from `global` (slot 0) to `local` (slot 1).
    fn draw_skybox(
        &mut self,
        global: &Self::Cubemap,
        local: &Self::Cubemap,
        blend: f32,
        matrices: &FrameMatrices,
    );

    /// Hand off to the world geometry pipeline.
    fn render_scene(&mut self, world: &mut World, matrices: &FrameMatrices);

    /// Replace the dust endpoint positions.
    fn upload_dust_positions(&mut self, positions: &[Vec3]);

    /// Draw the dust as independent line segments streaked by `velocity`.
    fn draw_dust(&mut self, velocity: Vec2, matrices: &FrameMatrices);

    /// Draw a camera-facing quad.
    fn draw_billboard(&mut self, billboard: &Billboard, matrices: &FrameMatrices);

    /// Finish the frame and restore the full-surface viewport.
    fn end_frame(&mut self);
}

/// A particle spawn request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpawn {
    pub start: Vec3,
    pub end: Vec3,
    pub start_color: Vec3,
    pub end_color: Vec3,
    pub start_size: f32,
    pub end_size: f32,
    /// Seconds until the particle is removed.
    pub lifetime: f32,
}

/// The particle engine.
pub trait ParticleEngine {
    /// Queue a new particle.
    fn spawn(&mut self, particle: ParticleSpawn);

    /// Draw live particles.
    fn render(&mut self, matrices: &FrameMatrices);
}

/// Positional audio listener.
pub trait AudioListener {
    /// Move the listener to `position` on the game plane, facing `rotation_deg`.
    fn set_listener(&mut self, position: Vec2, rotation_deg: f32);
}
