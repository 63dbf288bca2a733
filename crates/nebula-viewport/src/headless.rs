//! Recording implementations of every collaborator seam.
//!
//! Nothing is drawn; every call is counted or stored so a caller can inspect
//! what a frame would have done. Used by tests and by the demo when no GPU
//! is requested.

use std::cell::Cell;
use std::rc::Rc;

use bevy_ecs::world::World;
use glam::{UVec2, Vec2, Vec3};

use crate::backend::{
    AudioListener, Billboard, FrameMatrices, ParticleEngine, ParticleSpawn, RenderBackend,
};
use crate::target::{Alignment, Font, PixelRect, Rect, RenderTarget, Rgba8};

/// One recorded skybox draw.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyboxDraw {
    pub global: String,
    pub local: String,
    pub blend: f32,
}

/// Backend that records calls instead of issuing GPU work.
///
/// Cubemap handles are the names they were loaded under.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    /// Every name passed to `load_cubemap`, in order.
    pub cubemap_loads: Vec<String>,
    /// Signs from `allocate_dust`.
    pub dust_signs: Vec<f32>,
    /// Latest uploaded dust positions.
    pub dust_positions: Vec<Vec3>,
    pub dust_uploads: usize,
    pub dust_draws: usize,
    pub last_dust_velocity: Option<Vec2>,
    pub skybox_draws: Vec<SkyboxDraw>,
    pub billboards: Vec<Billboard>,
    pub scene_renders: usize,
    /// Completed frames.
    pub frames: usize,
    pub last_viewport: Option<PixelRect>,
    in_frame: bool,
}

impl HeadlessBackend {
    /// Whether a frame has begun and not yet ended.
    pub fn in_frame(&self) -> bool {
        self.in_frame
    }
}

impl RenderBackend for HeadlessBackend {
    type Cubemap = String;

    fn load_cubemap(&mut self, name: &str) -> String {
        self.cubemap_loads.push(name.to_string());
        name.to_string()
    }

    fn allocate_dust(&mut self, signs: &[f32]) {
        self.dust_signs = signs.to_vec();
        self.dust_positions = vec![Vec3::ZERO; signs.len()];
    }

    fn begin_frame(&mut self, viewport: PixelRect) {
        self.in_frame = true;
        self.last_viewport = Some(viewport);
    }

    fn draw_skybox(&mut self, global: &String, local: &String, blend: f32, _: &FrameMatrices) {
        self.skybox_draws.push(SkyboxDraw {
            global: global.clone(),
            local: local.clone(),
            blend,
        });
    }

    fn render_scene(&mut self, _: &mut World, _: &FrameMatrices) {
        self.scene_renders += 1;
    }

    fn upload_dust_positions(&mut self, positions: &[Vec3]) {
        self.dust_positions.clear();
        self.dust_positions.extend_from_slice(positions);
        self.dust_uploads += 1;
    }

    fn draw_dust(&mut self, velocity: Vec2, _: &FrameMatrices) {
        self.dust_draws += 1;
        self.last_dust_velocity = Some(velocity);
    }

    fn draw_billboard(&mut self, billboard: &Billboard, _: &FrameMatrices) {
        self.billboards.push(billboard.clone());
    }

    fn end_frame(&mut self) {
        self.in_frame = false;
        self.frames += 1;
    }
}

/// One queued text draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnText {
    pub rect: Rect,
    pub text: String,
    pub alignment: Alignment,
    pub size: f32,
    pub font: Font,
    pub color: Rgba8,
}

/// Render target that stores text and applies a uniform virtual-to-pixel scale.
#[derive(Debug, Clone)]
pub struct TextLog {
    pub texts: Vec<DrawnText>,
    /// Calls to `finish`.
    pub finishes: usize,
    size: UVec2,
    scale: f32,
}

impl TextLog {
    /// A `width` x `height` pixel surface with virtual units equal to pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            texts: Vec::new(),
            finishes: 0,
            size: UVec2::new(width, height),
            scale: 1.0,
        }
    }

    /// Set physical pixels per virtual unit.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Forget recorded text.
    pub fn clear(&mut self) {
        self.texts.clear();
    }
}

impl RenderTarget for TextLog {
    fn virtual_to_pixel(&self, position: Vec2) -> Vec2 {
        position * self.scale
    }

    fn physical_size(&self) -> UVec2 {
        self.size
    }

    fn finish(&mut self) {
        self.finishes += 1;
    }

    fn draw_text(
        &mut self,
        rect: Rect,
        text: &str,
        alignment: Alignment,
        size: f32,
        font: Font,
        color: Rgba8,
    ) {
        self.texts.push(DrawnText {
            rect,
            text: text.to_string(),
            alignment,
            size,
            font,
            color,
        });
    }
}

/// Particle engine that stores spawn requests.
#[derive(Debug, Default)]
pub struct ParticleLog {
    pub spawned: Vec<ParticleSpawn>,
    pub renders: usize,
}

impl ParticleEngine for ParticleLog {
    fn spawn(&mut self, particle: ParticleSpawn) {
        self.spawned.push(particle);
    }

    fn render(&mut self, _: &FrameMatrices) {
        self.renders += 1;
    }
}

/// Audio listener whose last pose is readable through any clone.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    pose: Rc<Cell<Option<(Vec2, f32)>>>,
}

impl RecordingListener {
    /// Last pose set, as `(position, rotation_deg)`.
    pub fn last(&self) -> Option<(Vec2, f32)> {
        self.pose.get()
    }
}

impl AudioListener for RecordingListener {
    fn set_listener(&mut self, position: Vec2, rotation_deg: f32) {
        self.pose.set(Some((position, rotation_deg)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_tracks_frame_bounds() {
        let mut backend = HeadlessBackend::default();
        backend.begin_frame(PixelRect::default());
        assert!(backend.in_frame());
        backend.end_frame();
        assert!(!backend.in_frame());
        assert_eq!(backend.frames, 1);
    }

    #[test]
    fn test_dust_upload_replaces_positions() {
        let mut backend = HeadlessBackend::default();
        backend.allocate_dust(&[-1.0, 1.0]);
        assert_eq!(backend.dust_positions, vec![Vec3::ZERO; 2]);
        backend.upload_dust_positions(&[Vec3::X, Vec3::Y]);
        assert_eq!(backend.dust_positions, vec![Vec3::X, Vec3::Y]);
        assert_eq!(backend.dust_uploads, 1);
    }

    #[test]
    fn test_listener_clones_share_state() {
        let listener = RecordingListener::default();
        let mut handle = listener.clone();
        handle.set_listener(Vec2::new(1.0, 2.0), 30.0);
        assert_eq!(listener.last(), Some((Vec2::new(1.0, 2.0), 30.0)));
    }

    #[test]
    fn test_text_log_scales_positions() {
        let log = TextLog::new(200, 100).with_scale(1.5);
        assert_eq!(log.virtual_to_pixel(Vec2::new(10.0, 20.0)), Vec2::new(15.0, 30.0));
        assert_eq!(log.physical_size(), UVec2::new(200, 100));
    }
}
