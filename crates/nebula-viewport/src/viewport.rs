//! The per-frame draw entry point.

use bevy_ecs::world::World;
use glam::Vec3;
use nebula_config::{CAMERA_FOV_KEY, Config, Preferences};
use nebula_ecs::{Physics, Transform, player_component, player_ship};

use crate::backend::{AudioListener, ParticleEngine, RenderBackend};
use crate::camera::{Camera, DEFAULT_FOV_DEG, ScreenProjector};
use crate::engine_particles::emit_engine_particles;
use crate::hud::{draw_callsigns, draw_headings};
use crate::reticle::target_reticle;
use crate::skybox::{SkyboxCache, SkyboxRenderer, SkyboxSelection};
use crate::space_dust::{SpaceDust, dust_velocity};
use crate::target::{PixelRect, Rect, RenderTarget};

/// What one call to [`Viewport3D::draw`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// False when the frame was skipped for a degenerate rectangle.
    pub drawn: bool,
    pub skybox: Option<SkyboxSelection>,
    pub particles_spawned: usize,
    pub dust_respawned: usize,
    pub dust_uploaded: bool,
    pub reticle_drawn: bool,
    pub callsigns_drawn: usize,
    pub headings_drawn: usize,
}

/// A 3D view of the game world embedded in a GUI rectangle.
pub struct Viewport3D<B: RenderBackend, P: ParticleEngine> {
    /// Placement in virtual GUI coordinates.
    pub rect: Rect,
    pub camera: Camera,
    pub show_callsigns: bool,
    pub show_headings: bool,
    pub show_spacedust: bool,
    preferences: Preferences,
    backend: B,
    particles: P,
    skybox: SkyboxRenderer<B::Cubemap>,
    dust: SpaceDust,
    listener: Option<Box<dyn AudioListener>>,
}

impl<B: RenderBackend, P: ParticleEngine> Viewport3D<B, P> {
    /// Creates a viewport with `dust_pairs` dust segments and all overlays off.
    ///
    /// The dust vertex buffer is allocated on the backend here and never
    /// resized.
    pub fn new(mut backend: B, particles: P, dust_pairs: usize) -> Self {
        let dust = SpaceDust::new(dust_pairs);
        backend.allocate_dust(dust.signs());
        tracing::debug!(dust_pairs, "viewport created");
        Self {
            rect: Rect::default(),
            camera: Camera::default(),
            show_callsigns: false,
            show_headings: false,
            show_spacedust: false,
            preferences: Preferences::new(),
            backend,
            particles,
            skybox: SkyboxRenderer::default(),
            dust,
            listener: None,
        }
    }

    /// Creates a viewport sized and toggled from `config`.
    pub fn from_config(backend: B, particles: P, config: &Config) -> Self {
        let mut viewport = Self::new(
            backend,
            particles,
            config.viewport.spacedust_particle_count as usize,
        );
        viewport.rect = Rect::new(
            0.0,
            0.0,
            config.window.width as f32,
            config.window.height as f32,
        );
        viewport.show_callsigns = config.viewport.show_callsigns;
        viewport.show_headings = config.viewport.show_headings;
        viewport.show_spacedust = config.viewport.show_spacedust;
        viewport.preferences = config.preferences.clone();
        viewport
    }

    /// Attach the positional audio listener the viewport steers each frame.
    pub fn with_audio_listener(mut self, listener: Box<dyn AudioListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn particles(&self) -> &P {
        &self.particles
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    pub fn dust(&self) -> &SpaceDust {
        &self.dust
    }

    pub fn skybox_cache(&self) -> &SkyboxCache<B::Cubemap> {
        self.skybox.cache()
    }

    /// Vertical field of view in degrees, from the preference store.
    pub fn field_of_view(&self) -> f32 {
        self.preferences.get_f32(CAMERA_FOV_KEY, DEFAULT_FOV_DEG)
    }

    /// Draw one frame into `target`.
    ///
    /// A rectangle with non-positive width or height draws nothing and
    /// touches neither the backend nor the target.
    pub fn draw(&mut self, target: &mut dyn RenderTarget, world: &mut World) -> FrameStats {
        let mut stats = FrameStats::default();
        let Some(aspect_ratio) = self.rect.aspect_ratio() else {
            tracing::trace!(rect = ?self.rect, "skipping degenerate viewport");
            return stats;
        };
        stats.drawn = true;

        target.finish();
        self.update_listener(world);

        let top_left = target.virtual_to_pixel(self.rect.position);
        let bottom_right = target.virtual_to_pixel(self.rect.position + self.rect.size);
        self.backend.begin_frame(PixelRect {
            x: top_left.x,
            y: top_left.y,
            width: bottom_right.x - top_left.x,
            height: bottom_right.y - top_left.y,
        });

        let matrices = self.camera.matrices(self.field_of_view(), aspect_ratio);

        stats.skybox = Some(self.skybox.draw(
            &mut self.backend,
            world,
            self.camera.position_2d(),
            &matrices,
        ));

        stats.particles_spawned = emit_engine_particles(world, &mut self.particles);
        self.backend.render_scene(world, &matrices);
        self.particles.render(&matrices);

        if self.show_spacedust && player_ship(world).is_some() {
            let center = player_component::<Transform>(world)
                .map_or(self.camera.position, |t| t.position_3d(0.0));
            let velocity = dust_velocity(player_component::<Physics>(world));

            stats.dust_respawned = self.dust.update(center);
            if self.dust.take_dirty() {
                self.backend.upload_dust_positions(self.dust.positions());
                stats.dust_uploaded = true;
            }
            self.backend.draw_dust(velocity, &matrices);
        }

        if let Some(reticle) = target_reticle(world) {
            self.backend.draw_billboard(&reticle, &matrices);
            stats.reticle_drawn = true;
        }

        let projector = ScreenProjector::new(matrices, self.rect);
        if self.show_callsigns {
            stats.callsigns_drawn = draw_callsigns(world, &projector, target);
        }
        if self.show_headings {
            stats.headings_drawn = draw_headings(world, &projector, target);
        }

        self.backend.end_frame();
        stats
    }

    fn update_listener(&mut self, world: &World) {
        let Some(listener) = self.listener.as_mut() else {
            return;
        };
        match player_component::<Transform>(world) {
            Some(ship) => listener.set_listener(ship.position, ship.rotation),
            None => listener.set_listener(self.camera.position_2d(), self.camera.yaw),
        }
    }
}

impl<B: RenderBackend, P: ParticleEngine> std::fmt::Debug for Viewport3D<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport3D")
            .field("rect", &self.rect)
            .field("camera", &self.camera)
            .field("show_callsigns", &self.show_callsigns)
            .field("show_headings", &self.show_headings)
            .field("show_spacedust", &self.show_spacedust)
            .field("dust_pairs", &self.dust.pair_count())
            .finish_non_exhaustive()
    }
}
