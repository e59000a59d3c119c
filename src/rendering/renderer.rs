use std::sync::Arc;

use anyhow::Context;
use id_arena::Arena;
use log::info;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    config::DemoConfig,
    demo::DemoState,
    engine::FrameRenderer,
    rendering::{
        frame_uniform::FrameUniformState,
        instance::gather_instances,
        passes::{
            background_pass::BackgroundPass,
            mesh_pass::{MeshPass, MeshTextureViews},
        },
        render_common::RenderCommon,
        render_material::RenderMaterialManager,
        render_model::RenderModel,
        shader_loader::{PipelineCacheBuilder, ShaderLoader},
        texture::{DepthTexture, TextureType},
    },
};

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: RenderCommon,
    depth_texture: DepthTexture,
    render_models: Arena<RenderModel>,
    materials: RenderMaterialManager,

    shader_loader: ShaderLoader,

    background_pass: BackgroundPass,
    mesh_pass: MeshPass,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        demo_state: &DemoState,
        config: &DemoConfig,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;

        info!("Using adapter {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let common = RenderCommon::new(
            &device,
            &adapter,
            &surface,
            size,
            FrameUniformState::new(&demo_state.camera, &demo_state.scene.lights),
        );

        let depth_texture = DepthTexture::new(&device, size, "Depth Texture");
        let materials = RenderMaterialManager::new(&device, &queue, config.asset_dir.clone());

        let mut cache_builder = PipelineCacheBuilder::new();

        let background_pass = BackgroundPass::create(&device, &common, &mut cache_builder)?;
        let mesh_pass = MeshPass::create(
            &device,
            &common,
            &mut cache_builder,
            materials.bind_group_layout(),
        )?;

        let shader_loader = ShaderLoader::new(
            device.clone(),
            cache_builder,
            &config.shader_dir,
            &config.shared_shader_dir(),
        )?;

        Ok(Self {
            window,
            size,
            surface,
            device,
            queue,
            common,
            depth_texture,
            render_models: Arena::new(),
            materials,
            shader_loader,
            background_pass,
            mesh_pass,
        })
    }

    /// Uploads meshes, materials and the background. Called once, before the
    /// first frame; the scene never gains models afterwards.
    pub fn load_scene(&mut self, demo_state: &mut DemoState) {
        let scene = &mut demo_state.scene;

        for (model_id, scene_model) in scene.models.iter() {
            let max_instances = scene.objects_using_model(model_id).count();
            let material = self.materials.create_material(&scene_model.material);
            let render_model = RenderModel::from_mesh(
                &self.device,
                &scene_model.name,
                &scene_model.mesh,
                material,
                max_instances,
            );

            info!(
                "Loaded model {} ({} triangles, {} instances)",
                render_model.name,
                scene_model.mesh.triangle_count(),
                max_instances
            );

            self.render_models.alloc(render_model);
        }

        // Render models were allocated in the same order as the scene models.
        for ((_, scene_model), (render_model_id, _)) in
            scene.models.iter_mut().zip(self.render_models.iter())
        {
            scene_model.render_model = Some(render_model_id);
        }

        let background = scene
            .background
            .as_deref()
            .and_then(|asset| self.materials.texture_view(asset, TextureType::Color));
        self.background_pass.set_background(
            &self.device,
            background.as_ref(),
            self.materials.sampler(),
        );
    }

    /// Reconfigures the surface at its startup size after it was lost or
    /// became outdated.
    pub fn reconfigure(&mut self) {
        self.surface
            .configure(&self.device, &self.common.output_surface_config);
        self.depth_texture.resize(&self.device, self.size);
    }

    pub fn render(&mut self, demo_state: &DemoState) -> Result<(), wgpu::SurfaceError> {
        self.shader_loader.load_pending_shaders();

        self.common.frame_uniform.update(
            &self.queue,
            FrameUniformState::new(&demo_state.camera, &demo_state.scene.lights),
        );

        gather_instances(&demo_state.scene, &mut self.render_models);
        for (_, render_model) in self.render_models.iter() {
            render_model
                .instances
                .write_to_buffer(&self.queue, &render_model.instance_buffer);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let pipeline_cache = &self.shader_loader.cache;

        self.background_pass
            .render(&view, &mut encoder, pipeline_cache);

        self.mesh_pass.render(
            &MeshTextureViews {
                color: &view,
                depth: self.depth_texture.view(),
            },
            &mut encoder,
            pipeline_cache,
            &self.common,
            &self.render_models,
        );

        self.queue.submit([encoder.finish()]);
        self.window.pre_present_notify();
        output.present();

        Ok(())
    }
}

impl FrameRenderer for Renderer {
    type Error = wgpu::SurfaceError;

    fn render_frame(&mut self, state: &DemoState) -> Result<(), Self::Error> {
        self.render(state)
    }
}
