use std::f64::consts::TAU;

use glam::{DVec3, EulerRot, Mat4, Quat, Vec3};

/// Position, XYZ-order Euler rotation (radians) and uniform scale.
///
/// The fields are public because the animation code mutates individual
/// components (`rotation.x += ...`) rather than whole transforms.
///
/// Rotations are accumulated without bound, so they are kept in `f64`; an
/// `f32` angle stops changing once it grows past a few hundred thousand
/// radians. They are wrapped to one turn before narrowing for the GPU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: DVec3,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: DVec3::ZERO,
        scale: 1.0,
    };

    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn rotation_quat(&self) -> Quat {
        let wrap = |angle: f64| angle.rem_euclid(TAU) as f32;

        Quat::from_euler(
            EulerRot::XYZ,
            wrap(self.rotation.x),
            wrap(self.rotation.y),
            wrap(self.rotation.z),
        )
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation_quat(),
            self.position,
        )
    }

    pub fn rotate(&mut self, delta: DVec3) {
        self.rotation += delta;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translation_moves_origin() {
        let transform = Transform::from_translation(Vec3::new(-10.0, 0.0, 30.0));
        let origin = transform.matrix().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(-10.0, 0.0, 30.0), 1e-6));
    }

    #[test]
    fn rotation_about_y_turns_x_into_negative_z() {
        let mut transform = Transform::default();
        transform.rotate(DVec3::new(0.0, FRAC_PI_2, 0.0));

        let rotated = transform.matrix().transform_vector3(Vec3::X);
        assert!(rotated.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn euler_order_applies_z_first() {
        // XYZ order composes as Rx * Ry * Rz, so Rz acts on the vector first.
        let transform = Transform {
            rotation: DVec3::new(FRAC_PI_2, 0.0, FRAC_PI_2),
            ..Transform::IDENTITY
        };

        let rotated = transform.matrix().transform_vector3(Vec3::X);
        // Rz: X -> Y, then Rx: Y -> Z
        assert!(rotated.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn scale_is_uniform() {
        let transform = Transform {
            scale: 2.0,
            ..Transform::IDENTITY
        };

        let scaled = transform.matrix().transform_vector3(Vec3::ONE);
        assert!(scaled.abs_diff_eq(Vec3::splat(2.0), 1e-6));
    }

    #[test]
    fn large_angles_keep_accumulating() {
        let mut transform = Transform {
            rotation: DVec3::splat(131_072.0),
            ..Transform::IDENTITY
        };

        transform.rotate(DVec3::new(0.01, 0.005, 0.01));

        assert!(transform.rotation.y > 131_072.0);
        assert!((transform.rotation.y - 131_072.005).abs() < 1e-9);
    }

    #[test]
    fn full_turns_do_not_change_the_matrix() {
        let turned = Transform {
            rotation: DVec3::new(0.3, 10.0 * TAU + 0.3, 0.0),
            ..Transform::IDENTITY
        };
        let plain = Transform {
            rotation: DVec3::new(0.3, 0.3, 0.0),
            ..Transform::IDENTITY
        };

        assert!(turned.matrix().abs_diff_eq(plain.matrix(), 1e-5));
    }
}
