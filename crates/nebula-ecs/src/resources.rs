//! World-level resources describing the local player and the scenario.

use bevy_ecs::prelude::*;

/// The ship controlled from this station, if one is assigned.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerShip(pub Option<Entity>);

/// Scenario-wide settings.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRes {
    /// Skybox shown outside any zone, without the `skybox/` prefix.
    pub default_skybox: String,
}

impl Default for ScenarioRes {
    fn default() -> Self {
        Self {
            default_skybox: "default".to_string(),
        }
    }
}
