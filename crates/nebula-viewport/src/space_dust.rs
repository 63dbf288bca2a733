//! Ambient dust streaks around the player ship.
//!
//! A fixed arena of segment endpoints lives in a GPU vertex buffer. Each
//! frame, pairs that drifted out of the distance band around the ship are
//! respawned in place; the buffer is re-uploaded only on frames where that
//! happened.

use glam::{Vec2, Vec3};
use nebula_ecs::Physics;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pairs closer than this to the ship are respawned.
pub const MIN_DUST_DISTANCE: f32 = 100.0;
/// Pairs farther than this from the ship are respawned.
pub const MAX_DUST_DISTANCE: f32 = 500.0;
/// Ship velocity is divided by this before it reaches the streak shader.
pub const DUST_VELOCITY_DIVISOR: f32 = 100.0;

/// Endpoint arena for the dust field. Pair `n` occupies slots `2n` and `2n + 1`.
pub struct SpaceDust {
    positions: Vec<Vec3>,
    signs: Vec<f32>,
    dirty: bool,
    rng: ChaCha8Rng,
}

impl SpaceDust {
    /// Creates a field of `pair_count` segments seeded from the thread RNG.
    pub fn new(pair_count: usize) -> Self {
        Self::with_seed(pair_count, rand::random())
    }

    /// Creates a deterministic field of `pair_count` segments.
    ///
    /// Positions start zeroed; the first update places every pair.
    pub fn with_seed(pair_count: usize, seed: u64) -> Self {
        let signs = (0..pair_count * 2)
            .map(|i| if i % 2 == 0 { -1.0 } else { 1.0 })
            .collect();
        Self {
            positions: vec![Vec3::ZERO; pair_count * 2],
            signs,
            dirty: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Number of segments.
    pub fn pair_count(&self) -> usize {
        self.positions.len() / 2
    }

    /// Endpoint positions, two per segment.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Endpoint signs: -1 for the start of a segment, +1 for the end.
    pub fn signs(&self) -> &[f32] {
        &self.signs
    }

    /// Respawn every pair outside `[MIN_DUST_DISTANCE, MAX_DUST_DISTANCE]` of `center`.
    ///
    /// Returns the number of respawned pairs and marks the arena dirty when
    /// that number is nonzero.
    pub fn update(&mut self, center: Vec3) -> usize {
        let min_sq = MIN_DUST_DISTANCE * MIN_DUST_DISTANCE;
        let max_sq = MAX_DUST_DISTANCE * MAX_DUST_DISTANCE;
        let mut respawned = 0;

        for n in (0..self.positions.len()).step_by(2) {
            let dist_sq = (self.positions[n] - center).length_squared();
            if dist_sq > max_sq || dist_sq < min_sq {
                let point = center + self.random_offset();
                self.positions[n] = point;
                self.positions[n + 1] = point;
                respawned += 1;
            }
        }

        if respawned > 0 {
            self.dirty = true;
            tracing::trace!(respawned, "space dust respawned");
        }
        respawned
    }

    /// Whether positions changed since the last call; clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Uniform sample from the max-radius sphere, restricted to the valid shell.
    fn random_offset(&mut self) -> Vec3 {
        let min_sq = MIN_DUST_DISTANCE * MIN_DUST_DISTANCE;
        let max_sq = MAX_DUST_DISTANCE * MAX_DUST_DISTANCE;
        loop {
            let offset = Vec3::new(
                self.rng.random_range(-MAX_DUST_DISTANCE..=MAX_DUST_DISTANCE),
                self.rng.random_range(-MAX_DUST_DISTANCE..=MAX_DUST_DISTANCE),
                self.rng.random_range(-MAX_DUST_DISTANCE..=MAX_DUST_DISTANCE),
            );
            let len_sq = offset.length_squared();
            if (min_sq..=max_sq).contains(&len_sq) {
                return offset;
            }
        }
    }
}

/// Streak vector for the dust shader; zero without a physics body.
pub fn dust_velocity(physics: Option<&Physics>) -> Vec2 {
    physics.map_or(Vec2::ZERO, |p| p.velocity / DUST_VELOCITY_DIVISOR)
}
