//! Skybox selection: global cubemap, zone-local cubemap and the blend between them.
//!
//! Cubemaps are loaded through the backend the first time a name is needed
//! and kept in a [`SkyboxCache`] owned by the viewport.

use std::collections::HashMap;

use bevy_ecs::world::World;
use glam::Vec2;
use nebula_ecs::{ScenarioRes, Transform, Zone};

use crate::backend::{FrameMatrices, RenderBackend};
use crate::zone::{distance_to_edge, inside_polygon};

/// Prefix applied to every skybox name before it reaches the texture loader.
pub const SKYBOX_PREFIX: &str = "skybox/";

/// Unit cube corners.
///
/// ```text
///        .2------6
///      .' |    .'|
///     3---+--7'  |
///     |   |  |   |
///     |  .0--+---4
///     |.'    | .'
///     1------5'
/// ```
pub const CUBE_POSITIONS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
];

/// Twelve triangles, two per face: back, left, right, front, top, bottom.
pub const CUBE_INDICES: [u16; 36] = [
    2, 6, 4, 4, 0, 2, //
    3, 2, 0, 0, 1, 3, //
    6, 7, 5, 5, 4, 6, //
    7, 3, 1, 1, 5, 7, //
    6, 2, 3, 3, 7, 6, //
    0, 4, 5, 5, 1, 0, //
];

/// Which cubemaps to draw and how far to blend toward the local one.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyboxSelection {
    /// Scenario-wide cubemap name, prefixed.
    pub global: String,
    /// Zone cubemap name, prefixed; equals `global` outside every zone.
    pub local: String,
    /// 0 shows only `global`, 1 only `local`.
    pub blend: f32,
}

/// Pick the global and local skybox for a camera at `camera_xy`.
///
/// Zones without a skybox are skipped. The first zone (in entity iteration
/// order) whose outline contains the camera wins; overlapping zones have no
/// other precedence.
pub fn select_skyboxes(world: &mut World, camera_xy: Vec2) -> SkyboxSelection {
    let default_name = world
        .get_resource::<ScenarioRes>()
        .map(|scenario| scenario.default_skybox.clone())
        .unwrap_or_else(|| ScenarioRes::default().default_skybox);
    let global = format!("{SKYBOX_PREFIX}{default_name}");

    let mut zones = world.query::<(&Zone, &Transform)>();
    for (zone, transform) in zones.iter(world) {
        if zone.skybox.is_empty() {
            continue;
        }
        let local_point = camera_xy - transform.position;
        if !inside_polygon(&zone.outline, local_point) {
            continue;
        }
        let blend = if zone.skybox_fade_distance <= 0.0 {
            1.0
        } else {
            (distance_to_edge(&zone.outline, local_point) / zone.skybox_fade_distance)
                .clamp(0.0, 1.0)
        };
        return SkyboxSelection {
            global,
            local: format!("{SKYBOX_PREFIX}{}", zone.skybox),
            blend,
        };
    }

    SkyboxSelection {
        local: global.clone(),
        global,
        blend: 0.0,
    }
}

/// Name-keyed cubemap handles. Entries are never evicted.
#[derive(Debug)]
pub struct SkyboxCache<H> {
    textures: HashMap<String, H>,
}

impl<H> Default for SkyboxCache<H> {
    fn default() -> Self {
        Self {
            textures: HashMap::new(),
        }
    }
}

impl<H> SkyboxCache<H> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `name` with `load` unless it is already cached.
    pub fn ensure_loaded(&mut self, name: &str, load: impl FnOnce(&str) -> H) {
        if !self.textures.contains_key(name) {
            tracing::debug!(skybox = name, "loading skybox cubemap");
            let handle = load(name);
            self.textures.insert(name.to_string(), handle);
        }
    }

    /// Cached handle for `name`.
    pub fn get(&self, name: &str) -> Option<&H> {
        self.textures.get(name)
    }

    /// Whether `name` has been loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    /// Number of loaded cubemaps.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Draws the background for one viewport.
#[derive(Debug)]
pub struct SkyboxRenderer<H> {
    cache: SkyboxCache<H>,
}

impl<H> Default for SkyboxRenderer<H> {
    fn default() -> Self {
        Self {
            cache: SkyboxCache::new(),
        }
    }
}

impl<H> SkyboxRenderer<H> {
    /// Loaded cubemaps.
    pub fn cache(&self) -> &SkyboxCache<H> {
        &self.cache
    }

    /// Select, load and draw the skybox for a camera at `camera_xy`.
    pub fn draw<B>(
        &mut self,
        backend: &mut B,
        world: &mut World,
        camera_xy: Vec2,
        matrices: &FrameMatrices,
    ) -> SkyboxSelection
    where
        B: RenderBackend<Cubemap = H>,
    {
        let selection = select_skyboxes(world, camera_xy);

        self.cache
            .ensure_loaded(&selection.global, |name| backend.load_cubemap(name));
        self.cache
            .ensure_loaded(&selection.local, |name| backend.load_cubemap(name));

        if let (Some(global), Some(local)) = (
            self.cache.get(&selection.global),
            self.cache.get(&selection.local),
        ) {
            backend.draw_skybox(global, local, selection.blend, matrices);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_ecs::create_world;

    fn square(half: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ]
    }

    fn spawn_zone(world: &mut World, at: Vec2, half: f32, skybox: &str, fade: f32) {
        world.spawn((
            Zone {
                label: format!("zone-{skybox}"),
                outline: square(half),
                skybox: skybox.to_string(),
                skybox_fade_distance: fade,
            },
            Transform::new(at, 0.0),
        ));
    }

    #[test]
    fn test_no_zone_uses_global_with_zero_blend() {
        let mut world = create_world();
        let selection = select_skyboxes(&mut world, Vec2::new(10.0, 10.0));
        assert_eq!(selection.global, "skybox/default");
        assert_eq!(selection.local, "skybox/default");
        assert_eq!(selection.blend, 0.0);
    }

    #[test]
    fn test_missing_scenario_resource_falls_back_to_default() {
        let mut world = World::new();
        let selection = select_skyboxes(&mut world, Vec2::ZERO);
        assert_eq!(selection.global, "skybox/default");
    }

    #[test]
    fn test_scenario_default_skybox_is_prefixed() {
        let mut world = create_world();
        world.insert_resource(ScenarioRes {
            default_skybox: "orion".to_string(),
        });
        let selection = select_skyboxes(&mut world, Vec2::ZERO);
        assert_eq!(selection.global, "skybox/orion");
        assert_eq!(selection.local, "skybox/orion");
    }

    #[test]
    fn test_zero_fade_zone_blends_fully() {
        let mut world = create_world();
        spawn_zone(&mut world, Vec2::new(1000.0, 0.0), 200.0, "nebula", 0.0);
        let selection = select_skyboxes(&mut world, Vec2::new(1050.0, 20.0));
        assert_eq!(selection.local, "skybox/nebula");
        assert_eq!(selection.blend, 1.0);
    }

    #[test]
    fn test_fade_distance_scales_blend() {
        let mut world = create_world();
        spawn_zone(&mut world, Vec2::ZERO, 200.0, "nebula", 400.0);
        // 50 units from the right edge.
        let selection = select_skyboxes(&mut world, Vec2::new(150.0, 0.0));
        assert!((selection.blend - 0.125).abs() < 1e-5, "blend {}", selection.blend);
    }

    #[test]
    fn test_blend_clamps_to_one_deep_inside() {
        let mut world = create_world();
        spawn_zone(&mut world, Vec2::ZERO, 5000.0, "deep", 10.0);
        let selection = select_skyboxes(&mut world, Vec2::ZERO);
        assert_eq!(selection.blend, 1.0);
    }

    #[test]
    fn test_zone_without_skybox_is_ignored() {
        let mut world = create_world();
        spawn_zone(&mut world, Vec2::ZERO, 200.0, "", 0.0);
        let selection = select_skyboxes(&mut world, Vec2::ZERO);
        assert_eq!(selection.local, selection.global);
        assert_eq!(selection.blend, 0.0);
    }

    #[test]
    fn test_camera_outside_zone_is_ignored() {
        let mut world = create_world();
        spawn_zone(&mut world, Vec2::new(10_000.0, 0.0), 200.0, "far", 0.0);
        let selection = select_skyboxes(&mut world, Vec2::ZERO);
        assert_eq!(selection.local, "skybox/default");
    }

    #[test]
    fn test_blend_always_in_unit_range() {
        let mut world = create_world();
        spawn_zone(&mut world, Vec2::ZERO, 300.0, "a", 120.0);
        spawn_zone(&mut world, Vec2::new(700.0, 0.0), 300.0, "b", -5.0);
        for x in (-1200..=1200).step_by(37) {
            for y in (-400..=400).step_by(53) {
                let selection = select_skyboxes(&mut world, Vec2::new(x as f32, y as f32));
                assert!(
                    (0.0..=1.0).contains(&selection.blend),
                    "blend {} at ({x}, {y})",
                    selection.blend
                );
            }
        }
    }

    #[test]
    fn test_cache_loads_each_name_once() {
        let mut cache = SkyboxCache::new();
        let mut loads = 0;
        for _ in 0..3 {
            cache.ensure_loaded("skybox/default", |name| {
                loads += 1;
                name.len()
            });
        }
        assert_eq!(loads, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("skybox/default"), Some(&14));
    }

    #[test]
    fn test_cube_has_twelve_triangles_over_eight_corners() {
        assert_eq!(CUBE_INDICES.len() / 3, 12);
        assert!(CUBE_INDICES.iter().all(|&i| (i as usize) < CUBE_POSITIONS.len()));
    }
}
