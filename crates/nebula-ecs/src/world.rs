//! World factory function and core resource registration.

use bevy_ecs::prelude::*;

use crate::{PlayerShip, ScenarioRes, TimeRes};

/// Registers the viewport's resources into the given world with default values.
pub fn register_core_resources(world: &mut World) {
    world.insert_resource(TimeRes::default());
    world.insert_resource(PlayerShip::default());
    world.insert_resource(ScenarioRes::default());
}

/// Creates a world with [`TimeRes`], [`PlayerShip`] and [`ScenarioRes`] inserted.
pub fn create_world() -> World {
    let mut world = World::new();
    register_core_resources(&mut world);
    world
}
