use glam::Vec3;

use crate::scene_graph::material::hex_to_linear;

#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub color: u32,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: u32,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Lights {
    pub point: PointLight,
    pub ambient: AmbientLight,
}

impl PointLight {
    pub fn radiance(&self) -> Vec3 {
        hex_to_linear(self.color) * self.intensity
    }
}

impl AmbientLight {
    pub fn radiance(&self) -> Vec3 {
        hex_to_linear(self.color) * self.intensity
    }
}

impl Default for Lights {
    /// No contribution from either light.
    fn default() -> Self {
        Self {
            point: PointLight {
                position: Vec3::ZERO,
                color: 0x000000,
                intensity: 0.0,
            },
            ambient: AmbientLight {
                color: 0x000000,
                intensity: 0.0,
            },
        }
    }
}
