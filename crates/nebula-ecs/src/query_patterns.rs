//! Query helpers shared by the viewport's overlays.
//!
//! Entity references held in components and resources may outlive the entity
//! they point at; every helper here resolves them against the live world.

use bevy_ecs::prelude::*;
use bevy_ecs::query::QueryFilter;

use crate::{PlayerShip, Target};

/// The player ship, if assigned and still alive.
pub fn player_ship(world: &World) -> Option<Entity> {
    let entity = world.get_resource::<PlayerShip>()?.0?;
    world.entities().contains(entity).then_some(entity)
}

/// Component `T` on the player ship.
pub fn player_component<T: Component>(world: &World) -> Option<&T> {
    world.get::<T>(player_ship(world)?)
}

/// The entity the player ship has locked, if it still exists.
pub fn locked_target(world: &World) -> Option<Entity> {
    let target = player_component::<Target>(world)?.entity?;
    world.entities().contains(target).then_some(target)
}

/// Count entities matching a query filter.
pub fn count_entities<F: QueryFilter>(world: &mut World) -> usize {
    world.query_filtered::<Entity, F>().iter(world).count()
}
