use wgpu::SurfaceConfiguration;
use winit::dpi::PhysicalSize;

use crate::rendering::frame_uniform::{FrameUniform, FrameUniformState};

pub struct RenderCommon {
    /// Fixed for the lifetime of the window; there is no resize handling.
    pub output_surface_config: SurfaceConfiguration,
    pub frame_uniform: FrameUniform,
}

impl RenderCommon {
    pub fn new(
        device: &wgpu::Device,
        adapter: &wgpu::Adapter,
        surface: &wgpu::Surface,
        size: PhysicalSize<u32>,
        initial_frame: FrameUniformState,
    ) -> Self {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let output_surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            // The frame ticker runs once per display refresh.
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(device, &output_surface_config);

        let frame_uniform = FrameUniform::new(device, initial_frame);

        Self {
            output_surface_config,
            frame_uniform,
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.output_surface_config.format
    }
}
