//! Text overlays: callsigns over ships and compass heading ticks around the player.

use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;
use glam::Vec2;
use nebula_ecs::{CallSign, Physics, Transform, player_component, player_ship};

use crate::camera::ScreenProjector;
use crate::reticle::DEFAULT_TARGET_RADIUS;
use crate::target::{Alignment, Font, Rect, RenderTarget};

/// Callsigns farther than this (view-space depth) are not drawn.
pub const CALLSIGN_CUTOFF: f32 = 10_000.0;
/// Callsign text size at zero depth.
pub const CALLSIGN_TEXT_SIZE: f32 = 20.0;
/// Degrees between heading ticks.
pub const HEADING_STEP_DEG: u32 = 30;
/// Distance of the heading ticks from the player ship.
pub const HEADING_DISTANCE: f32 = 2500.0;
/// Heading tick text size.
pub const HEADING_TEXT_SIZE: f32 = 30.0;

const HUD_ALPHA: f32 = 128.0;

/// Draw the callsign of every named entity except the player ship.
///
/// Returns how many labels were queued.
pub fn draw_callsigns(
    world: &mut World,
    projector: &ScreenProjector,
    target: &mut dyn RenderTarget,
) -> usize {
    let player = player_ship(world);
    let mut drawn = 0;

    let mut named = world.query::<(Entity, &CallSign, &Transform, Option<&Physics>)>();
    for (entity, callsign, transform, physics) in named.iter(world) {
        if Some(entity) == player {
            continue;
        }
        let radius = physics.map_or(DEFAULT_TARGET_RADIUS, Physics::radius);
        let screen = projector.world_to_screen(transform.position_3d(radius));
        if screen.z <= 0.0 || screen.z > CALLSIGN_CUTOFF {
            continue;
        }

        let fade = 1.0 - screen.z / CALLSIGN_CUTOFF;
        target.draw_text(
            Rect::point(screen.truncate()),
            &callsign.0,
            Alignment::Center,
            CALLSIGN_TEXT_SIZE * fade,
            Font::Bold,
            [255, 255, 255, (HUD_ALPHA * fade) as u8],
        );
        drawn += 1;
    }
    drawn
}

/// Draw compass heading labels in a ring around the player ship.
///
/// Returns how many labels were queued; zero without a player ship.
pub fn draw_headings(
    world: &World,
    projector: &ScreenProjector,
    target: &mut dyn RenderTarget,
) -> usize {
    let Some(ship) = player_component::<Transform>(world) else {
        return 0;
    };
    let mut drawn = 0;

    for angle in (0..360).step_by(HEADING_STEP_DEG as usize) {
        // Heading 0 points to -Y on the map.
        let direction = Vec2::from_angle((angle as f32 - 90.0).to_radians());
        let point = ship.position + direction * HEADING_DISTANCE;
        let screen = projector.world_to_screen(point.extend(0.0));
        if screen.z <= 0.0 {
            continue;
        }
        target.draw_text(
            Rect::point(screen.truncate()),
            &angle.to_string(),
            Alignment::Center,
            HEADING_TEXT_SIZE,
            Font::Bold,
            [255, 255, 255, HUD_ALPHA as u8],
        );
        drawn += 1;
    }
    drawn
}
