//! Orthographic follow camera.
//!
//! Only the position follows the player; the viewing direction is fixed when
//! the camera is created and never updated afterwards.

use crate::constants::{CAMERA_FAR, CAMERA_NEAR, CAMERA_OFFSET, FRUSTUM_SIZE};
use glam::{Mat4, Vec3};

#[derive(Clone, Debug)]
pub struct OrthoCamera {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub frustum_size: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl OrthoCamera {
    /// Camera at `CAMERA_OFFSET` looking at the origin.
    pub fn new(aspect: f32) -> Self {
        let position = CAMERA_OFFSET;
        Self {
            position,
            direction: (Vec3::ZERO - position).normalize(),
            up: Vec3::Y,
            aspect,
            frustum_size: FRUSTUM_SIZE,
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let half_h = self.frustum_size / 2.0;
        let half_w = self.frustum_size * self.aspect / 2.0;
        Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.direction, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_center_initially() {
        let cam = OrthoCamera::new(16.0 / 9.0);
        let p = cam.view_proj().project_point3(Vec3::ZERO);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn moving_position_keeps_direction() {
        let mut cam = OrthoCamera::new(1.0);
        let dir = cam.direction;
        cam.position += Vec3::new(0.0, 0.0, -3.0);
        assert_eq!(cam.direction, dir);
    }
}
