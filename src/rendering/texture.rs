use std::path::Path;

use anyhow::Context;
use wgpu::{util::DeviceExt, TextureDescriptor};
use winit::dpi::PhysicalSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    /// Base color or background; stored as sRGB.
    Color,
    /// Tangent-space normal map; stored linearly.
    Normal,
}

impl TextureType {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            TextureType::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureType::Normal => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    /// Texel used when an asset is missing: white for colors, "straight up" for normals.
    pub fn default_texel(self) -> [u8; 4] {
        match self {
            TextureType::Color => [255, 255, 255, 255],
            TextureType::Normal => [128, 128, 255, 255],
        }
    }
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("Failed to load texture {}", path.display()))?
            .to_rgba8();

        let (width, height) = image.dimensions();

        Ok(Self {
            width,
            height,
            pixels: image.into_raw(),
        })
    }

    pub fn solid(texel: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: texel.to_vec(),
        }
    }
}

pub struct Texture {
    _texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl Texture {
    pub fn from_wgpu_texture(texture: wgpu::Texture) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _texture: texture,
            view,
        }
    }

    pub fn from_data(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        texture_type: TextureType,
        data: &TextureData,
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: data.width,
                    height: data.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: texture_type.format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::wgt::TextureDataOrder::default(),
            &data.pixels,
        );

        Self::from_wgpu_texture(texture)
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

pub struct DepthTexture {
    texture: Texture,
    label: String,
}

impl DepthTexture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, size: PhysicalSize<u32>, label: impl Into<String>) -> Self {
        let label: String = label.into();
        let texture = Self::create_wgpu_texture(device, size, &label);

        DepthTexture {
            texture: Texture::from_wgpu_texture(texture),
            label,
        }
    }

    fn create_wgpu_texture(
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        label: &str,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.texture =
            Texture::from_wgpu_texture(Self::create_wgpu_texture(device, size, &self.label));
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.texture.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_asset_is_an_error() {
        let result = TextureData::load(Path::new("definitely/not/here/moon.jpg"));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("moon.jpg"), "{message}");
    }

    #[test]
    fn decodes_to_rgba8() {
        let path = std::env::temp_dir().join(format!(
            "scrollscape-texture-{}.png",
            std::process::id()
        ));
        image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let data = TextureData::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.pixels.len(), 3 * 2 * 4);
        assert_eq!(&data.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn defaults_are_single_texels() {
        let normal = TextureData::solid(TextureType::Normal.default_texel());
        assert_eq!((normal.width, normal.height), (1, 1));
        assert_eq!(normal.pixels, vec![128, 128, 255, 255]);
        assert!(TextureType::Color.format().is_srgb());
        assert!(!TextureType::Normal.format().is_srgb());
    }
}
