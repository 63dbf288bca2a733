//! ECS world setup and the component types the viewport queries.
//!
//! Provides the [`World`](bevy_ecs::world::World) factory, the ship/zone/engine
//! components, and helpers that resolve the player ship and its target lock.

mod components;
pub mod query_patterns;
mod resources;
mod time;
mod world;

pub use components::{
    CallSign, EmitterDef, EngineEmitter, ImpulseEngine, Physics, ShipBundle, Target, Transform,
    Zone,
};
pub use query_patterns::{count_entities, locked_target, player_component, player_ship};
pub use resources::{PlayerShip, ScenarioRes};
pub use time::TimeRes;
pub use world::{create_world, register_core_resources};
