use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Unlit: color times base color map.
    Basic,
    /// Lit by the scene's point and ambient lights.
    Standard,
}

/// Material description. Textures are referenced by asset file name and
/// resolved against the asset directory by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    /// sRGB color as `0xRRGGBB`.
    pub color: u32,
    pub map: Option<String>,
    pub normal_map: Option<String>,
}

impl Material {
    pub fn basic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Basic,
            color: 0xffffff,
            map: None,
            normal_map: None,
        }
    }

    pub fn standard(name: impl Into<String>, color: u32) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Standard,
            color,
            map: None,
            normal_map: None,
        }
    }

    pub fn with_map(mut self, asset: impl Into<String>) -> Self {
        self.map = Some(asset.into());
        self
    }

    pub fn with_normal_map(mut self, asset: impl Into<String>) -> Self {
        self.normal_map = Some(asset.into());
        self
    }

    pub fn is_lit(&self) -> bool {
        self.kind == MaterialKind::Standard
    }

    pub fn linear_color(&self) -> Vec3 {
        hex_to_linear(self.color)
    }
}

/// Converts a `0xRRGGBB` sRGB color to linear RGB.
pub fn hex_to_linear(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_and_black_are_exact() {
        assert_eq!(hex_to_linear(0xffffff), Vec3::ONE);
        assert_eq!(hex_to_linear(0x000000), Vec3::ZERO);
    }

    #[test]
    fn channels_are_extracted_in_rgb_order() {
        let color = hex_to_linear(0x004680);
        assert_eq!(color.x, 0.0);
        assert!(color.y > 0.0 && color.y < color.z);
        assert!((color.z - 0.2158605).abs() < 1e-4);
    }

    #[test]
    fn builders_set_textures() {
        let moon = Material::standard("Moon", 0xffffff)
            .with_map("moon.jpg")
            .with_normal_map("normal.jpg");

        assert!(moon.is_lit());
        assert_eq!(moon.map.as_deref(), Some("moon.jpg"));
        assert_eq!(moon.normal_map.as_deref(), Some("normal.jpg"));
        assert!(!Material::basic("Avatar").is_lit());
    }
}
