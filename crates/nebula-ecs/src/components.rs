//! Core ECS components for ships, zones and engines.
//!
//! The game world is a plane: positions are 2D on z=0 and rotations are
//! degrees around +Z. Only emitter offsets and camera poses carry a height.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};

/// Position on the game plane plus heading in degrees.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct Transform {
    /// World position on the game plane.
    pub position: Vec2,
    /// Rotation in degrees, counter-clockwise around +Z.
    pub rotation: f32,
}

impl Transform {
    /// Creates a new [`Transform`].
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }

    /// Creates an unrotated [`Transform`] at `(x, y)`.
    pub fn at(x: f32, y: f32) -> Self {
        Self::new(Vec2::new(x, y), 0.0)
    }

    /// Rotate an entity-local 2D offset into world orientation.
    pub fn rotate_offset(&self, offset: Vec2) -> Vec2 {
        Vec2::from_angle(self.rotation.to_radians()).rotate(offset)
    }

    /// Position lifted into 3D at height `z`.
    pub fn position_3d(&self, z: f32) -> Vec3 {
        self.position.extend(z)
    }
}

/// Collision size and planar velocity. `size.x` doubles as the bounding radius.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct Physics {
    /// Bounding size; circular bodies store the radius in both components.
    pub size: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
}

impl Physics {
    /// A circular body at rest.
    pub fn circle(radius: f32) -> Self {
        Self {
            size: Vec2::splat(radius),
            velocity: Vec2::ZERO,
        }
    }

    /// Bounding radius.
    pub fn radius(&self) -> f32 {
        self.size.x
    }
}

/// Name shown above an entity in the HUD.
#[derive(Component, Clone, Debug, PartialEq, Eq, Default)]
pub struct CallSign(pub String);

impl CallSign {
    /// Creates a new [`CallSign`] from anything that converts to `String`.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Weapons/scanner lock. `entity` may point at something already despawned.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Target {
    /// Locked entity, if any.
    pub entity: Option<Entity>,
}

/// Sub-light engine state. `actual` lags behind `request` as the engine spools.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct ImpulseEngine {
    /// Requested thrust in [-1, 1].
    pub request: f32,
    /// Current thrust in [-1, 1]; negative is reverse.
    pub actual: f32,
}

/// One engine exhaust point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmitterDef {
    /// Offset from the ship origin; xy rotate with the ship, z is absolute height.
    pub offset: Vec3,
    /// Particle color.
    pub color: Vec3,
    /// Particle scale at full thrust.
    pub scale: f32,
}

/// Exhaust emitters and the last time they spawned particles.
#[derive(Component, Clone, Debug, PartialEq, Default)]
pub struct EngineEmitter {
    /// Exhaust points.
    pub emitters: Vec<EmitterDef>,
    /// `TimeRes::elapsed` at the last emission, in seconds.
    pub last_emission: f32,
}

impl EngineEmitter {
    /// Creates an emitter set that has never fired.
    pub fn new(emitters: Vec<EmitterDef>) -> Self {
        Self {
            emitters,
            last_emission: 0.0,
        }
    }
}

/// Named polygonal region that can override the background skybox.
#[derive(Component, Clone, Debug, PartialEq, Default)]
pub struct Zone {
    /// Display name.
    pub label: String,
    /// Outline in zone-local coordinates (relative to the zone's [`Transform`]).
    pub outline: Vec<Vec2>,
    /// Skybox name without the `skybox/` prefix; empty means no override.
    pub skybox: String,
    /// Distance from the edge over which the zone skybox fades in. `<= 0` disables fading.
    pub skybox_fade_distance: f32,
}

/// Bundle for a typical ship: transform, body, name, engine and exhaust.
#[derive(Bundle, Default)]
pub struct ShipBundle {
    /// Placement.
    pub transform: Transform,
    /// Body.
    pub physics: Physics,
    /// HUD label.
    pub callsign: CallSign,
    /// Engine state.
    pub impulse: ImpulseEngine,
    /// Exhaust points.
    pub emitter: EngineEmitter,
}
