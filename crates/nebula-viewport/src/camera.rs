//! Camera pose, view/projection matrices and world-to-screen projection.

use glam::{Mat4, Vec2, Vec3};

use crate::backend::FrameMatrices;
use crate::target::Rect;

/// Near clip plane distance.
pub const NEAR_PLANE: f32 = 1.0;
/// Far clip plane distance.
pub const FAR_PLANE: f32 = 25_000.0;
/// Field of view used when no preference is set, in degrees.
pub const DEFAULT_FOV_DEG: f32 = 60.0;

/// Free camera above the game plane.
///
/// The owning screen moves it between frames. Yaw 0 looks along +X, positive
/// pitch looks down toward the plane, and world +Z is screen up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    /// World position.
    pub position: Vec3,
    /// Heading in degrees.
    pub yaw: f32,
    /// Elevation in degrees.
    pub pitch: f32,
}

impl Camera {
    /// Creates a camera at `position` with the given yaw and pitch.
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    /// World to view transform.
    ///
    /// The game plane's axes are first turned so Z is up (the mirror keeps
    /// screen-space handedness matching the 2D map), then pitch, then yaw,
    /// then the camera translation.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(90.0_f32.to_radians())
            * Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0))
            * Mat4::from_rotation_x((-self.pitch).to_radians())
            * Mat4::from_rotation_z((-(self.yaw + 90.0)).to_radians())
            * Mat4::from_translation(-self.position)
    }

    /// Perspective projection for a vertical field of view in degrees.
    pub fn projection_matrix(fov_deg: f32, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(fov_deg.to_radians(), aspect_ratio, NEAR_PLANE, FAR_PLANE)
    }

    /// Both matrices for the current pose.
    pub fn matrices(&self, fov_deg: f32, aspect_ratio: f32) -> FrameMatrices {
        FrameMatrices {
            view: self.view_matrix(),
            projection: Self::projection_matrix(fov_deg, aspect_ratio),
        }
    }

    /// World-space direction through the center of the image.
    pub fn forward(&self) -> Vec3 {
        self.view_matrix()
            .inverse()
            .transform_vector3(Vec3::NEG_Z)
            .normalize()
    }

    /// Position projected onto the game plane.
    pub fn position_2d(&self) -> Vec2 {
        self.position.truncate()
    }
}

/// Projects world points into a viewport rectangle for one frame.
#[derive(Debug, Clone, Copy)]
pub struct ScreenProjector {
    matrices: FrameMatrices,
    rect: Rect,
}

impl ScreenProjector {
    /// Creates a projector for `rect` using this frame's matrices.
    pub fn new(matrices: FrameMatrices, rect: Rect) -> Self {
        Self { matrices, rect }
    }

    /// Project `world` into the viewport.
    ///
    /// `x`/`y` are GUI coordinates inside the viewport rectangle (y down).
    /// `z` is the view-space distance in front of the camera: negative
    /// means behind. Callers must cull on `z` before trusting `x`/`y`.
    pub fn world_to_screen(&self, world: Vec3) -> Vec3 {
        let view_pos = self.matrices.view * world.extend(1.0);
        let clip = self.matrices.projection * view_pos;
        let ndc = clip / clip.w;

        let u = ndc.x * 0.5 + 0.5;
        let v = ndc.y * 0.5 + 0.5;
        Vec3::new(
            self.rect.position.x + self.rect.size.x * u,
            self.rect.position.y + self.rect.size.y * (1.0 - v),
            -view_pos.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector_for(camera: &Camera, rect: Rect) -> ScreenProjector {
        let aspect = rect.aspect_ratio().unwrap();
        ScreenProjector::new(camera.matrices(DEFAULT_FOV_DEG, aspect), rect)
    }

    #[test]
    fn test_default_pose_looks_along_positive_x() {
        let forward = Camera::default().forward();
        assert!((forward - Vec3::X).length() < 1e-5, "forward = {forward}");
    }

    #[test]
    fn test_yaw_quarter_turn_looks_along_positive_y() {
        let camera = Camera::new(Vec3::ZERO, 90.0, 0.0);
        let forward = camera.forward();
        assert!((forward - Vec3::Y).length() < 1e-5, "forward = {forward}");
    }

    #[test]
    fn test_positive_pitch_looks_down() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 500.0), 0.0, 30.0);
        assert!(camera.forward().z < 0.0);
    }

    #[test]
    fn test_world_up_projects_upward_on_screen() {
        let camera = Camera::default();
        let rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        let projector = projector_for(&camera, rect);
        let above = projector.world_to_screen(Vec3::new(1000.0, 0.0, 100.0));
        assert!(above.y < 300.0, "point above the horizon landed at y={}", above.y);
    }

    #[test]
    fn test_point_ahead_projects_to_center_for_many_poses() {
        let rect = Rect::new(40.0, 25.0, 1024.0, 640.0);
        let poses = [
            Camera::default(),
            Camera::new(Vec3::new(120.0, -340.0, 50.0), 37.0, 12.0),
            Camera::new(Vec3::new(-5000.0, 8000.0, 2000.0), 210.0, 60.0),
            Camera::new(Vec3::new(0.0, 0.0, -300.0), -75.0, -25.0),
            Camera::new(Vec3::new(9.0, 9.0, 9.0), 359.0, 80.0),
        ];
        for camera in poses {
            let projector = projector_for(&camera, rect);
            let ahead = camera.position + camera.forward() * 750.0;
            let screen = projector.world_to_screen(ahead);
            let center = rect.center();
            assert!(
                (screen.truncate() - center).length() < 0.05,
                "camera {camera:?} projected {screen} instead of {center}"
            );
            assert!((screen.z - 750.0).abs() < 0.05, "depth was {}", screen.z);
        }
    }

    #[test]
    fn test_point_behind_has_negative_depth() {
        let camera = Camera::new(Vec3::ZERO, 45.0, 0.0);
        let projector = projector_for(&camera, Rect::new(0.0, 0.0, 100.0, 100.0));
        let behind = camera.position - camera.forward() * 200.0;
        assert!(projector.world_to_screen(behind).z < 0.0);
    }

    #[test]
    fn test_projection_uses_fixed_clip_planes() {
        let proj = Camera::projection_matrix(60.0, 1.0);
        let near = proj * glam::Vec4::new(0.0, 0.0, -NEAR_PLANE, 1.0);
        let far = proj * glam::Vec4::new(0.0, 0.0, -FAR_PLANE, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_matrices_track_pose_changes() {
        let mut camera = Camera::default();
        let before = camera.matrices(60.0, 1.5);
        camera.position.x += 10.0;
        let after = camera.matrices(60.0, 1.5);
        assert_ne!(before.view, after.view);
        assert_eq!(before.projection, after.projection);
    }
}
