use glam::{Mat3, Mat4, Quat, Vec3};

/// Local translation/rotation/scale of a scene node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Unit vector of the node's local +Z axis in parent space.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Move along the local +Z axis.
    #[inline]
    pub fn translate_z(&mut self, distance: f32) {
        self.translation += self.forward() * distance;
    }

    /// Rotate so the local +Z axis points at `target`.
    ///
    /// Objects (unlike cameras) face their target with +Z. A target at the
    /// current position leaves the rotation untouched.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let z = target - self.translation;
        if z.length_squared() <= f32::EPSILON * f32::EPSILON {
            return;
        }
        let z = z.normalize();
        let mut x = up.cross(z);
        if x.length_squared() <= f32::EPSILON {
            // target straight above/below: nudge z to get a usable basis
            x = up.cross(z + Vec3::new(0.0001, 0.0, 0.0)).normalize_or_zero();
            if x == Vec3::ZERO {
                return;
            }
        } else {
            x = x.normalize();
        }
        let y = z.cross(x);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize();
    }
}
