//! Minimal flight model driving the demo between frames.

use bevy_ecs::world::World;
use glam::{Vec2, Vec3};
use nebula_ecs::{ImpulseEngine, Physics, TimeRes, Transform, player_component};
use nebula_viewport::Camera;

/// Speed at full impulse, in world units per second.
pub const CRUISE_SPEED: f32 = 600.0;
/// Fraction of full impulse gained or lost per second.
pub const SPOOL_RATE: f32 = 0.5;
/// Player yaw rate while sweeping the heading ring, in degrees per second.
pub const PLAYER_TURN_RATE: f32 = 6.0;

/// Chase distance behind the player ship.
const CHASE_DISTANCE: f32 = 900.0;
const CHASE_HEIGHT: f32 = 300.0;
const CHASE_PITCH: f32 = 15.0;

/// Advance time by `dt` and move every ship that has an impulse engine.
pub fn step(world: &mut World, dt: f32) {
    world.resource_mut::<TimeRes>().advance(dt);

    let mut engines = world.query::<(&mut Transform, &mut Physics, &mut ImpulseEngine)>();
    for (mut transform, mut physics, mut impulse) in engines.iter_mut(world) {
        let delta = (impulse.request - impulse.actual).clamp(-SPOOL_RATE * dt, SPOOL_RATE * dt);
        impulse.actual += delta;

        let heading = Vec2::from_angle(transform.rotation.to_radians());
        physics.velocity = heading * impulse.actual * CRUISE_SPEED;
        transform.position += physics.velocity * dt;
    }
}

/// Turn the player ship slowly so the heading overlay sweeps past.
pub fn turn_player(world: &mut World, dt: f32) {
    let Some(player) = nebula_ecs::player_ship(world) else {
        return;
    };
    if let Some(mut transform) = world.get_mut::<Transform>(player) {
        transform.rotation = (transform.rotation + PLAYER_TURN_RATE * dt).rem_euclid(360.0);
    }
}

/// Place the camera behind and above the player ship, looking along its heading.
///
/// Leaves the camera alone without a player ship.
pub fn chase_camera(world: &World, camera: &mut Camera) {
    let Some(transform) = player_component::<Transform>(world) else {
        return;
    };
    let heading = Vec2::from_angle(transform.rotation.to_radians());
    let behind = transform.position - heading * CHASE_DISTANCE;
    camera.position = Vec3::new(behind.x, behind.y, CHASE_HEIGHT);
    camera.yaw = transform.rotation;
    camera.pitch = CHASE_PITCH;
}
