use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::{camera::Camera, scene_graph::Lights};

/// Per-frame shader inputs shared by every draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniformState {
    pub view_proj: Mat4,
    pub camera_position: Vec4,
    pub light_position: Vec4,
    pub light_color: Vec4,
    pub ambient_color: Vec4,
}

impl FrameUniformState {
    pub fn new(camera: &Camera, lights: &Lights) -> Self {
        Self {
            view_proj: camera.get_vp_matrix(),
            camera_position: camera.transform.position.extend(1.0),
            light_position: lights.point.position.extend(1.0),
            light_color: lights.point.radiance().extend(1.0),
            ambient_color: lights.ambient.radiance().extend(1.0),
        }
    }
}

pub struct FrameUniform {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl FrameUniform {
    pub fn new(device: &wgpu::Device, initial_state: FrameUniformState) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame uniform buffer"),
            contents: bytemuck::cast_slice(&[initial_state]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame uniform bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame uniform bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, state: FrameUniformState) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[state]));
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::scene_graph::{AmbientLight, PointLight};

    #[test]
    fn layout_matches_wgsl_struct() {
        // mat4x4 + four vec4s, no padding
        assert_eq!(std::mem::size_of::<FrameUniformState>(), 64 + 4 * 16);
    }

    #[test]
    fn captures_camera_and_lights() {
        let mut camera = Camera::perspective(75.0, 1.0, 0.1, 1000.0);
        camera.transform.position = Vec3::new(0.2, 0.0, 10.0);
        let lights = Lights {
            point: PointLight {
                position: Vec3::new(5.0, 5.0, 5.0),
                color: 0xffffff,
                intensity: 2.0,
            },
            ambient: AmbientLight {
                color: 0xffffff,
                intensity: 0.5,
            },
        };

        let state = FrameUniformState::new(&camera, &lights);

        assert_eq!(state.camera_position, Vec4::new(0.2, 0.0, 10.0, 1.0));
        assert_eq!(state.light_position, Vec4::new(5.0, 5.0, 5.0, 1.0));
        assert_eq!(state.light_color, Vec4::new(2.0, 2.0, 2.0, 1.0));
        assert_eq!(state.ambient_color, Vec4::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(state.view_proj, camera.get_vp_matrix());
    }
}
