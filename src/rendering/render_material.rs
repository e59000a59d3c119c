use std::{collections::HashMap, path::PathBuf};

use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use log::{info, warn};
use wgpu::util::DeviceExt;

use crate::{
    rendering::texture::{Texture, TextureData, TextureType},
    scene_graph::Material,
};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MaterialUniform {
    pub color: Vec4,
    /// x: lit, y: has normal map
    pub flags: [u32; 4],
}

impl MaterialUniform {
    pub fn new(material: &Material) -> Self {
        Self {
            color: material.linear_color().extend(1.0),
            flags: [
                material.is_lit() as u32,
                material.normal_map.is_some() as u32,
                0,
                0,
            ],
        }
    }
}

pub struct RenderMaterial {
    _uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// Loads texture assets on demand and builds per-material bind groups.
///
/// Textures are cached by asset name, so the same file referenced by several
/// materials is decoded and uploaded once.
pub struct RenderMaterialManager {
    device: wgpu::Device,
    queue: wgpu::Queue,
    asset_dir: PathBuf,

    textures: HashMap<(String, TextureType), Texture>,
    default_color: Texture,
    default_normal: Texture,

    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl RenderMaterialManager {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, asset_dir: PathBuf) -> Self {
        let default_color = Self::create_default_texture(device, queue, TextureType::Color);
        let default_normal = Self::create_default_texture(device, queue, TextureType::Normal);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            device: device.clone(),
            queue: queue.clone(),
            asset_dir,
            textures: HashMap::new(),
            default_color,
            default_normal,
            sampler,
            bind_group_layout,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Returns the view of a texture asset, loading it on first use. `None` if
    /// the asset could not be loaded; the failure is logged.
    pub fn texture_view(&mut self, asset: &str, texture_type: TextureType) -> Option<wgpu::TextureView> {
        let key = (asset.to_string(), texture_type);

        if let Some(texture) = self.textures.get(&key) {
            return Some(texture.view().clone());
        }

        let path = self.asset_dir.join(asset);
        let data = match TextureData::load(&path) {
            Ok(data) => data,
            Err(e) => {
                warn!("{:#}", e);
                return None;
            }
        };

        info!(
            "Loaded texture {} ({}x{}, {:?})",
            asset, data.width, data.height, texture_type
        );

        let texture = Texture::from_data(&self.device, &self.queue, asset, texture_type, &data);
        let view = texture.view().clone();
        self.textures.insert(key, texture);

        Some(view)
    }

    pub fn create_material(&mut self, material: &Material) -> RenderMaterial {
        let base_color = material
            .map
            .as_deref()
            .and_then(|asset| self.texture_view(asset, TextureType::Color))
            .unwrap_or_else(|| self.default_color.view().clone());

        let normal = material
            .normal_map
            .as_deref()
            .and_then(|asset| self.texture_view(asset, TextureType::Normal))
            .unwrap_or_else(|| self.default_normal.view().clone());

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Material uniform ({})", material.name)),
                contents: bytemuck::cast_slice(&[MaterialUniform::new(material)]),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Material bind group ({})", material.name)),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&base_color),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&normal),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        RenderMaterial {
            _uniform_buffer: uniform_buffer,
            bind_group,
        }
    }

    fn create_default_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_type: TextureType,
    ) -> Texture {
        Texture::from_data(
            device,
            queue,
            &format!("Default texture ({:?})", texture_type),
            texture_type,
            &TextureData::solid(texture_type.default_texel()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_flags_follow_material() {
        let moon = MaterialUniform::new(
            &Material::standard("Moon", 0xffffff)
                .with_map("moon.jpg")
                .with_normal_map("normal.jpg"),
        );
        assert_eq!(moon.flags, [1, 1, 0, 0]);
        assert_eq!(moon.color, Vec4::ONE);

        let avatar = MaterialUniform::new(&Material::basic("Avatar").with_map("nimrod.jpg"));
        assert_eq!(avatar.flags, [0, 0, 0, 0]);
    }

    #[test]
    fn uniform_is_two_vec4s() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }
}
