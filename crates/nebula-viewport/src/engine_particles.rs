//! Exhaust particles behind ships under thrust.

use bevy_ecs::world::World;
use nebula_ecs::{EngineEmitter, ImpulseEngine, TimeRes, Transform};

use crate::backend::{ParticleEngine, ParticleSpawn};

/// Minimum seconds between two emissions of the same engine.
pub const EMISSION_INTERVAL: f32 = 0.1;
/// Seconds an exhaust particle lives.
pub const PARTICLE_LIFETIME: f32 = 5.0;

/// Spawn exhaust for every engine with nonzero thrust whose interval elapsed.
///
/// Emission time is read from [`TimeRes::elapsed`]. Returns the number of
/// particles spawned.
pub fn emit_engine_particles(world: &mut World, particles: &mut dyn ParticleEngine) -> usize {
    let now = world
        .get_resource::<TimeRes>()
        .map_or(0.0, |time| time.elapsed);
    let mut spawned = 0;

    let mut engines = world.query::<(&mut EngineEmitter, &Transform, &ImpulseEngine)>();
    for (mut emitter, transform, impulse) in engines.iter_mut(world) {
        if impulse.actual == 0.0 || now - emitter.last_emission <= EMISSION_INTERVAL {
            continue;
        }

        let thrust = impulse.actual.abs();
        for def in &emitter.emitters {
            let planar = transform.position + transform.rotate_offset(def.offset.truncate());
            let position = planar.extend(def.offset.z);
            particles.spawn(ParticleSpawn {
                start: position,
                end: position,
                start_color: def.color,
                end_color: def.color,
                start_size: 0.0,
                end_size: def.scale * thrust,
                lifetime: PARTICLE_LIFETIME,
            });
            spawned += 1;
        }
        emitter.last_emission = now;
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::ParticleLog;
    use glam::{Vec2, Vec3};
    use nebula_ecs::{EmitterDef, create_world};

    fn exhaust(offset: Vec3, scale: f32) -> EmitterDef {
        EmitterDef {
            offset,
            color: Vec3::new(0.2, 0.4, 1.0),
            scale,
        }
    }

    fn spawn_engine(world: &mut World, rotation: f32, thrust: f32) {
        world.spawn((
            Transform::new(Vec2::new(100.0, 50.0), rotation),
            ImpulseEngine {
                request: thrust,
                actual: thrust,
            },
            EngineEmitter::new(vec![
                exhaust(Vec3::new(-20.0, 5.0, 3.0), 4.0),
                exhaust(Vec3::new(-20.0, -5.0, 3.0), 4.0),
            ]),
        ));
    }

    fn advance(world: &mut World, dt: f32) {
        world.resource_mut::<TimeRes>().advance(dt);
    }

    #[test]
    fn test_idle_engine_emits_nothing() {
        let mut world = create_world();
        spawn_engine(&mut world, 0.0, 0.0);
        advance(&mut world, 1.0);
        let mut log = ParticleLog::default();
        assert_eq!(emit_engine_particles(&mut world, &mut log), 0);
    }

    #[test]
    fn test_one_particle_per_emitter() {
        let mut world = create_world();
        spawn_engine(&mut world, 0.0, 1.0);
        advance(&mut world, 0.5);
        let mut log = ParticleLog::default();

        assert_eq!(emit_engine_particles(&mut world, &mut log), 2);
        let first = &log.spawned[0];
        assert_eq!(first.start, Vec3::new(80.0, 55.0, 3.0));
        assert_eq!(first.start, first.end);
        assert_eq!(first.start_color, first.end_color);
        assert_eq!(first.start_size, 0.0);
        assert_eq!(first.end_size, 4.0);
        assert_eq!(first.lifetime, PARTICLE_LIFETIME);
    }

    #[test]
    fn test_offset_rotates_with_ship_but_height_does_not() {
        let mut world = create_world();
        spawn_engine(&mut world, 90.0, -0.5);
        advance(&mut world, 0.5);
        let mut log = ParticleLog::default();
        emit_engine_particles(&mut world, &mut log);

        let first = &log.spawned[0];
        let expected = Vec3::new(95.0, 30.0, 3.0);
        assert!(
            (first.start - expected).length() < 1e-3,
            "got {} expected {expected}",
            first.start
        );
        assert_eq!(first.end_size, 2.0, "reverse thrust scales by magnitude");
    }

    #[test]
    fn test_rate_limited_to_interval() {
        let mut world = create_world();
        spawn_engine(&mut world, 0.0, 1.0);
        let mut log = ParticleLog::default();

        // 60 fps for two seconds.
        let mut emissions = 0;
        for _ in 0..120 {
            advance(&mut world, 1.0 / 60.0);
            if emit_engine_particles(&mut world, &mut log) > 0 {
                emissions += 1;
            }
        }
        assert!(emissions <= 20, "{emissions} emissions in 2s");
        assert!(emissions >= 15, "{emissions} emissions in 2s");
        assert_eq!(log.spawned.len(), emissions * 2);
    }

    #[test]
    fn test_exact_interval_does_not_emit() {
        let mut world = create_world();
        spawn_engine(&mut world, 0.0, 1.0);
        advance(&mut world, EMISSION_INTERVAL);
        let mut log = ParticleLog::default();
        assert_eq!(emit_engine_particles(&mut world, &mut log), 0);
    }
}
