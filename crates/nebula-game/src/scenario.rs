//! Sample scenario: a player ship, a few contacts and one nebula zone.

use bevy_ecs::world::World;
use glam::{Vec2, Vec3};
use nebula_config::Config;
use nebula_ecs::{
    CallSign, EmitterDef, EngineEmitter, ImpulseEngine, Physics, PlayerShip, ScenarioRes,
    ShipBundle, Target, Transform, Zone, create_world,
};

/// Skybox shown inside the sample zone.
pub const ZONE_SKYBOX: &str = "veil";

fn exhaust(offset_x: f32, offset_y: f32, scale: f32) -> EmitterDef {
    EmitterDef {
        offset: Vec3::new(offset_x, offset_y, 0.0),
        color: Vec3::new(0.4, 0.6, 1.0),
        scale,
    }
}

fn ship(name: &str, position: Vec2, rotation: f32, radius: f32) -> ShipBundle {
    ShipBundle {
        transform: Transform::new(position, rotation),
        physics: Physics::circle(radius),
        callsign: CallSign::new(name),
        impulse: ImpulseEngine::default(),
        emitter: EngineEmitter::default(),
    }
}

/// Populate a fresh world.
///
/// The player flies east at full impulse toward a square zone, with a
/// frigate locked as target. One contact sits beyond callsign range.
pub fn build_scenario(config: &Config) -> World {
    let mut world = create_world();
    world.insert_resource(ScenarioRes {
        default_skybox: config.scenario.default_skybox.clone(),
    });

    let mut player = ship("Odin", Vec2::ZERO, 0.0, 200.0);
    player.impulse.request = 1.0;
    player.emitter = EngineEmitter::new(vec![
        exhaust(-220.0, 60.0, 1.0),
        exhaust(-220.0, -60.0, 1.0),
    ]);
    let player = world.spawn(player).id();

    let mut frigate = ship("Raven", Vec2::new(2500.0, 400.0), 180.0, 250.0);
    frigate.impulse.request = 0.3;
    frigate.emitter = EngineEmitter::new(vec![exhaust(-260.0, 0.0, 1.5)]);
    let frigate = world.spawn(frigate).id();

    world.spawn(ship("Deep Space 9", Vec2::new(-4000.0, 3000.0), 0.0, 400.0));
    world.spawn(ship("Distant", Vec2::new(30000.0, -2000.0), 90.0, 150.0));

    world.spawn((
        Transform::at(4000.0, 0.0),
        Zone {
            label: "Veil Nebula".to_string(),
            outline: vec![
                Vec2::new(-2000.0, -2000.0),
                Vec2::new(2000.0, -2000.0),
                Vec2::new(2000.0, 2000.0),
                Vec2::new(-2000.0, 2000.0),
            ],
            skybox: ZONE_SKYBOX.to_string(),
            skybox_fade_distance: 1000.0,
        },
    ));

    world.entity_mut(player).insert(Target {
        entity: Some(frigate),
    });
    world.insert_resource(PlayerShip(Some(player)));
    world
}
