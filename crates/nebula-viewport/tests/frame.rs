//! Multi-frame behavior of the viewport against the headless collaborators.

use bevy_ecs::world::World;
use glam::{Vec2, Vec3};
use nebula_ecs::{
    CallSign, EmitterDef, EngineEmitter, ImpulseEngine, Physics, PlayerShip, ShipBundle, Target,
    TimeRes, Transform, Zone, create_world,
};
use nebula_viewport::headless::{HeadlessBackend, ParticleLog, TextLog};
use nebula_viewport::space_dust::{MAX_DUST_DISTANCE, MIN_DUST_DISTANCE};
use nebula_viewport::{Camera, Rect, Viewport3D};

const DT: f32 = 1.0 / 60.0;

fn viewport(dust_pairs: usize) -> Viewport3D<HeadlessBackend, ParticleLog> {
    let mut viewport =
        Viewport3D::new(HeadlessBackend::default(), ParticleLog::default(), dust_pairs);
    viewport.rect = Rect::new(0.0, 0.0, 1024.0, 768.0);
    viewport
}

fn spawn_player(world: &mut World, velocity: Vec2) -> bevy_ecs::entity::Entity {
    let ship = world
        .spawn(ShipBundle {
            transform: Transform::default(),
            physics: Physics {
                size: Vec2::splat(40.0),
                velocity,
            },
            callsign: CallSign::new("Player"),
            impulse: ImpulseEngine {
                request: 1.0,
                actual: 1.0,
            },
            emitter: EngineEmitter::new(vec![EmitterDef {
                offset: Vec3::new(-30.0, 0.0, 0.0),
                color: Vec3::new(1.0, 0.6, 0.2),
                scale: 6.0,
            }]),
        })
        .id();
    world.insert_resource(PlayerShip(Some(ship)));
    ship
}

fn step(world: &mut World, ship: bevy_ecs::entity::Entity) {
    world.resource_mut::<TimeRes>().advance(DT);
    if let Some(mut transform) = world.get_mut::<Transform>(ship) {
        let velocity = Vec2::new(900.0, 300.0);
        transform.position += velocity * DT;
    }
}

#[test]
fn test_dust_uploads_exactly_on_respawn_frames() {
    let mut viewport = viewport(200);
    viewport.show_spacedust = true;
    let mut world = create_world();
    let ship = spawn_player(&mut world, Vec2::new(900.0, 300.0));
    let mut target = TextLog::new(1024, 768);

    let mut respawn_frames = 0;
    for _ in 0..240 {
        step(&mut world, ship);
        let stats = viewport.draw(&mut target, &mut world);
        assert_eq!(
            stats.dust_uploaded,
            stats.dust_respawned > 0,
            "upload must track respawns"
        );
        if stats.dust_respawned > 0 {
            respawn_frames += 1;
        }
    }
    assert_eq!(viewport.backend().dust_uploads, respawn_frames);
    assert_eq!(viewport.backend().dust_draws, 240);
    assert_eq!(
        viewport.backend().last_dust_velocity,
        Some(Vec2::new(9.0, 3.0))
    );
}

#[test]
fn test_dust_stays_in_band_every_frame() {
    let mut viewport = viewport(300);
    viewport.show_spacedust = true;
    let mut world = create_world();
    let ship = spawn_player(&mut world, Vec2::ZERO);
    let mut target = TextLog::new(1024, 768);

    for _ in 0..120 {
        step(&mut world, ship);
        viewport.draw(&mut target, &mut world);
        let center = world
            .get::<Transform>(ship)
            .map(|t| t.position_3d(0.0))
            .unwrap();
        for point in viewport.dust().positions() {
            let d = point.distance(center);
            assert!(
                (MIN_DUST_DISTANCE - 1e-2..=MAX_DUST_DISTANCE + 1e-2).contains(&d),
                "dust point at distance {d}"
            );
        }
    }
}

#[test]
fn test_uploaded_positions_match_arena() {
    let mut viewport = viewport(50);
    viewport.show_spacedust = true;
    let mut world = create_world();
    spawn_player(&mut world, Vec2::ZERO);
    let mut target = TextLog::new(1024, 768);

    viewport.draw(&mut target, &mut world);
    assert_eq!(viewport.backend().dust_positions, viewport.dust().positions());
}

#[test]
fn test_engine_emission_rate_limited_over_many_frames() {
    let mut viewport = viewport(0);
    let mut world = create_world();
    let ship = spawn_player(&mut world, Vec2::ZERO);
    let mut target = TextLog::new(1024, 768);

    let mut emissions = 0;
    let mut last_emit_time = f32::NEG_INFINITY;
    for _ in 0..300 {
        step(&mut world, ship);
        let stats = viewport.draw(&mut target, &mut world);
        if stats.particles_spawned > 0 {
            let now = world.resource::<TimeRes>().elapsed;
            assert!(now - last_emit_time > 0.1, "emitted twice within 0.1s");
            last_emit_time = now;
            emissions += 1;
        }
    }
    // Five seconds of thrust.
    assert!((40..=50).contains(&emissions), "{emissions} emissions");
    assert_eq!(viewport.particles().spawned.len(), emissions);
}

#[test]
fn test_callsigns_respect_depth_cutoff() {
    let mut viewport = viewport(0);
    viewport.show_callsigns = true;
    let mut world = create_world();
    for (name, x) in [("Near", 1500.0), ("Edge", 9500.0), ("Far", 15000.0), ("Back", -800.0)] {
        world.spawn((CallSign::new(name), Transform::at(x, 0.0), Physics::circle(20.0)));
    }
    let mut target = TextLog::new(1024, 768);

    let stats = viewport.draw(&mut target, &mut world);
    let names: Vec<_> = target.texts.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(stats.callsigns_drawn, 2);
    assert!(names.contains(&"Near"));
    assert!(names.contains(&"Edge"));
    assert!(target.texts.iter().all(|t| t.size > 0.0 && t.color[3] > 0));
}

#[test]
fn test_zero_size_viewport_issues_nothing() {
    let mut viewport = viewport(10);
    viewport.show_spacedust = true;
    viewport.show_callsigns = true;
    viewport.show_headings = true;
    viewport.rect = Rect::new(0.0, 0.0, 300.0, 0.0);
    let mut world = create_world();
    spawn_player(&mut world, Vec2::ZERO);
    world.spawn((CallSign::new("Other"), Transform::at(500.0, 0.0)));
    let mut target = TextLog::new(1024, 768);

    for _ in 0..5 {
        let stats = viewport.draw(&mut target, &mut world);
        assert!(!stats.drawn);
    }
    let backend = viewport.backend();
    assert_eq!(backend.frames, 0);
    assert!(backend.cubemap_loads.is_empty());
    assert!(backend.skybox_draws.is_empty());
    assert_eq!(backend.scene_renders, 0);
    assert_eq!(backend.dust_uploads, 0);
    assert!(backend.last_viewport.is_none());
    assert!(target.texts.is_empty());
    assert_eq!(target.finishes, 0);
    assert!(viewport.particles().spawned.is_empty());
}

#[test]
fn test_each_skybox_loads_once_while_crossing_zones() {
    let mut viewport = viewport(0);
    let mut world = create_world();
    let outline = vec![
        Vec2::new(-500.0, -500.0),
        Vec2::new(500.0, -500.0),
        Vec2::new(500.0, 500.0),
        Vec2::new(-500.0, 500.0),
    ];
    world.spawn((
        Zone {
            label: "Nebula".into(),
            outline,
            skybox: "nebula".into(),
            skybox_fade_distance: 200.0,
        },
        Transform::at(2000.0, 0.0),
    ));
    let mut target = TextLog::new(1024, 768);

    let mut saw_blend = false;
    for x in (0..=4000).step_by(100) {
        viewport.camera = Camera::new(Vec3::new(x as f32, 0.0, 100.0), 0.0, 0.0);
        let stats = viewport.draw(&mut target, &mut world);
        let selection = stats.skybox.unwrap();
        assert!((0.0..=1.0).contains(&selection.blend));
        saw_blend |= selection.blend > 0.0 && selection.blend < 1.0;
    }
    assert!(saw_blend, "crossing a fading zone should blend");
    let loads = &viewport.backend().cubemap_loads;
    assert_eq!(loads, &vec!["skybox/default".to_string(), "skybox/nebula".to_string()]);
    assert_eq!(viewport.skybox_cache().len(), 2);
}

#[test]
fn test_reticle_follows_lock() {
    let mut viewport = viewport(0);
    let mut world = create_world();
    let ship = spawn_player(&mut world, Vec2::ZERO);
    let enemy = world
        .spawn((CallSign::new("Enemy"), Transform::at(1200.0, 300.0), Physics::circle(60.0)))
        .id();
    let mut target = TextLog::new(1024, 768);

    assert!(!viewport.draw(&mut target, &mut world).reticle_drawn);

    world.entity_mut(ship).insert(Target { entity: Some(enemy) });
    assert!(viewport.draw(&mut target, &mut world).reticle_drawn);
    assert_eq!(viewport.backend().billboards[0].size, 150.0);

    world.despawn(enemy);
    assert!(!viewport.draw(&mut target, &mut world).reticle_drawn);
    assert_eq!(viewport.backend().billboards.len(), 1);
}
