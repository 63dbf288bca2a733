//! Time resource for the ECS world.

use bevy_ecs::prelude::*;

/// Global time resource inserted into the ECS world at creation.
///
/// `elapsed` is the game clock that rate-limited effects (engine exhaust)
/// compare against.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct TimeRes {
    /// Wall-clock seconds elapsed since the previous frame.
    pub delta: f32,
    /// Seconds since the world was created.
    pub elapsed: f32,
}

impl TimeRes {
    /// Advance the clock by `delta` seconds. Negative deltas are ignored.
    pub fn advance(&mut self, delta: f32) {
        let delta = delta.max(0.0);
        self.delta = delta;
        self.elapsed += delta;
    }
}
