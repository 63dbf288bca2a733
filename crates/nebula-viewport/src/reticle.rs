//! Lock-on reticle drawn around the player's target.

use bevy_ecs::world::World;
use glam::{Mat4, Vec3};
use nebula_ecs::{Physics, Transform, locked_target};

use crate::backend::Billboard;

/// Radius assumed for targets without a physics body.
pub const DEFAULT_TARGET_RADIUS: f32 = 300.0;
/// Texture manager name of the reticle image.
pub const RETICLE_TEXTURE: &str = "redicule2.png";
/// Reticle quad size relative to the target radius.
pub const RETICLE_SIZE_FACTOR: f32 = 2.5;
/// Gray tint multiplied into the reticle texture.
pub const RETICLE_TINT: Vec3 = Vec3::splat(0.5);

/// Quad corner UVs, in the order the billboard shader expands corners.
pub const RETICLE_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
/// Two triangles over [`RETICLE_UVS`].
pub const RETICLE_INDICES: [u16; 6] = [0, 2, 1, 0, 3, 2];

/// Radius of `entity` as the overlays see it.
pub fn target_radius(world: &World, entity: bevy_ecs::entity::Entity) -> f32 {
    world
        .get::<Physics>(entity)
        .map_or(DEFAULT_TARGET_RADIUS, Physics::radius)
}

/// Reticle billboard for the player ship's live target, if any.
pub fn target_reticle(world: &World) -> Option<Billboard> {
    let target = locked_target(world)?;
    let position = world
        .get::<Transform>(target)
        .map_or(Vec3::ZERO, |t| t.position_3d(0.0));
    let radius = target_radius(world, target);

    Some(Billboard {
        texture: RETICLE_TEXTURE,
        model: Mat4::from_translation(position),
        tint: RETICLE_TINT,
        size: radius * RETICLE_SIZE_FACTOR,
        depth_test: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use nebula_ecs::{PlayerShip, Target, create_world};

    fn world_with_lock(target_components: impl bevy_ecs::bundle::Bundle) -> World {
        let mut world = create_world();
        let enemy = world.spawn(target_components).id();
        let ship = world
            .spawn((Transform::default(), Target { entity: Some(enemy) }))
            .id();
        world.insert_resource(PlayerShip(Some(ship)));
        world
    }

    #[test]
    fn test_no_player_ship_no_reticle() {
        let world = create_world();
        assert!(target_reticle(&world).is_none());
    }

    #[test]
    fn test_unlocked_ship_no_reticle() {
        let mut world = create_world();
        let ship = world.spawn((Transform::default(), Target::default())).id();
        world.insert_resource(PlayerShip(Some(ship)));
        assert!(target_reticle(&world).is_none());
    }

    #[test]
    fn test_reticle_sized_by_physics_radius() {
        let world = world_with_lock((Transform::at(400.0, -250.0), Physics::circle(80.0)));
        let reticle = target_reticle(&world).expect("locked target should draw a reticle");
        assert_eq!(reticle.size, 200.0);
        assert_eq!(reticle.texture, RETICLE_TEXTURE);
        assert!(!reticle.depth_test, "reticle must draw over geometry");
        assert_eq!(
            reticle.model.transform_point3(Vec3::ZERO),
            Vec3::new(400.0, -250.0, 0.0)
        );
    }

    #[test]
    fn test_reticle_defaults_without_physics_or_transform() {
        let world = world_with_lock(nebula_ecs::CallSign::new("ghost"));
        let reticle = target_reticle(&world).expect("locked target should draw a reticle");
        assert_eq!(reticle.size, DEFAULT_TARGET_RADIUS * RETICLE_SIZE_FACTOR);
        assert_eq!(reticle.model.transform_point3(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_despawned_target_no_reticle() {
        let mut world = world_with_lock(Transform::new(Vec2::new(10.0, 10.0), 0.0));
        let target = locked_target(&world).expect("target should be live");
        world.despawn(target);
        assert!(target_reticle(&world).is_none());
    }

    #[test]
    fn test_quad_indices_cover_all_corners() {
        let mut used = RETICLE_INDICES.to_vec();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used, vec![0, 1, 2, 3]);
    }
}
