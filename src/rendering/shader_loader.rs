use std::{
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, channel},
        Arc, RwLock,
    },
    time::Duration,
};

use anyhow::Context;
use id_arena::{Arena, Id};
use log::{error, info, warn};
use naga::{
    back::wgsl::WriterFlags,
    valid::{Capabilities, ValidationFlags},
};
use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
};
use notify_debouncer_mini::{
    new_debouncer_opt,
    notify::{RecommendedWatcher, RecursiveMode, Watcher},
    DebounceEventResult, DebouncedEventKind, Debouncer,
};
use pollster::block_on;
use wgpu::PollType;

type PipelineFactory = Box<
    dyn Sync
        + Send
        + Fn(&wgpu::Device, &ShaderDefinition, &str) -> anyhow::Result<wgpu::RenderPipeline>,
>;

#[derive(Debug, Clone)]
pub(crate) struct ShaderDefinition {
    pub name: &'static str,
    /// Relative to the shader directory.
    pub path: &'static str,
}

struct ShaderEntry {
    pipeline_id: PipelineId,
    def: ShaderDefinition,
    factory: PipelineFactory,
}

pub type PipelineId = Id<PipelineCacheEntry>;

#[derive(Default)]
pub struct PipelineCacheEntry(Option<wgpu::RenderPipeline>);

pub struct PipelineCacheBuilder {
    shaders: Arena<ShaderEntry>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCacheBuilder {
    pub fn new() -> Self {
        Self {
            shaders: Arena::new(),
            pipelines: Arena::new(),
        }
    }

    pub(crate) fn add_shader(
        &mut self,
        shader_def: ShaderDefinition,
        factory: PipelineFactory,
    ) -> PipelineId {
        let pipeline_id = self.pipelines.alloc(PipelineCacheEntry::default());
        self.shaders.alloc(ShaderEntry {
            pipeline_id,
            def: shader_def,
            factory,
        });
        pipeline_id
    }
}

pub struct PipelineCache {
    shaders: Arc<Arena<ShaderEntry>>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCache {
    /// `None` only before the initial compilation, which `ShaderLoader::new`
    /// performs before handing out the cache.
    pub fn get(&self, id: PipelineId) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(id).and_then(|entry| entry.0.as_ref())
    }

    fn set(&mut self, id: PipelineId, pipeline: wgpu::RenderPipeline) {
        if let Some(entry) = self.pipelines.get_mut(id) {
            entry.0 = Some(pipeline);
        }
    }
}

struct ShaderPaths {
    root: PathBuf,
    shared: PathBuf,
}

/// Compiles every registered shader up front, then watches the shader
/// directory and recompiles changed files on the watcher thread. Finished
/// pipelines are swapped in by `load_pending_shaders` on the render thread.
pub(crate) struct ShaderLoader {
    pub cache: PipelineCache,
    receiver: mpsc::Receiver<(&'static str, PipelineId, wgpu::RenderPipeline)>,
    _debouncer: Option<Debouncer<RecommendedWatcher>>,
}

impl ShaderLoader {
    pub fn new(
        device: wgpu::Device,
        cache_builder: PipelineCacheBuilder,
        shader_dir: &Path,
        shared_shader_dir: &Path,
    ) -> anyhow::Result<Self> {
        let paths = Arc::new(ShaderPaths {
            root: shader_dir.to_path_buf(),
            shared: shared_shader_dir.to_path_buf(),
        });

        let composer = create_composer(&paths.shared)?;
        let composer = Arc::new(RwLock::new(composer));

        let mut cache = PipelineCache {
            shaders: Arc::new(cache_builder.shaders),
            pipelines: cache_builder.pipelines,
        };

        for (_, shader) in cache.shaders.clone().iter() {
            let pipeline = compile_file(&device, &paths.root, &shader.def, &shader.factory, &composer)
                .with_context(|| format!("Failed to compile shader: {}", shader.def.name))?;
            cache.set(shader.pipeline_id, pipeline);
        }

        let (sender, receiver) = channel();
        let debouncer = watch_shaders(device, cache.shaders.clone(), paths, composer, sender)
            .inspect_err(|e| warn!("Shader hot reload disabled: {:#}", e))
            .ok();

        Ok(Self {
            cache,
            receiver,
            _debouncer: debouncer,
        })
    }

    pub(crate) fn load_pending_shaders(&mut self) {
        while let Ok((name, pipeline_id, pipeline)) = self.receiver.try_recv() {
            info!("Shader reloaded: {}", name);
            self.cache.set(pipeline_id, pipeline);
        }
    }
}

fn watch_shaders(
    device: wgpu::Device,
    shaders: Arc<Arena<ShaderEntry>>,
    paths: Arc<ShaderPaths>,
    composer: Arc<RwLock<Composer>>,
    sender: mpsc::Sender<(&'static str, PipelineId, wgpu::RenderPipeline)>,
) -> anyhow::Result<Debouncer<RecommendedWatcher>> {
    let absolute_shader_dir = paths
        .root
        .canonicalize()
        .with_context(|| format!("Shader directory {} not found", paths.root.display()))?;

    let mut debouncer: Debouncer<RecommendedWatcher> = new_debouncer_opt(
        notify_debouncer_mini::Config::default().with_timeout(Duration::from_millis(100)),
        move |res: DebounceEventResult| match res {
            Ok(events) => {
                for event in events {
                    if event.kind != DebouncedEventKind::Any {
                        continue;
                    }

                    let Some((_, entry)) = shaders
                        .iter()
                        .find(|(_, entry)| event.path.ends_with(entry.def.path))
                    else {
                        continue;
                    };

                    match compile_file(&device, &paths.root, &entry.def, &entry.factory, &composer)
                    {
                        Ok(pipeline) => {
                            if sender
                                .send((entry.def.name, entry.pipeline_id, pipeline))
                                .is_err()
                            {
                                // Render thread is gone; nothing left to reload for.
                                return;
                            }
                        }
                        Err(e) => error!("Failed to reload shader {}: {:#}", entry.def.name, e),
                    }
                }
            }
            Err(e) => error!("Error debouncing shader changes: {}", e),
        },
    )
    .context("Failed to create shader watcher")?;

    debouncer
        .watcher()
        .watch(&absolute_shader_dir, RecursiveMode::Recursive)
        .context("Failed to watch shader directory")?;

    Ok(debouncer)
}

fn compile_file(
    device: &wgpu::Device,
    shader_dir: &Path,
    shader_def: &ShaderDefinition,
    factory: &PipelineFactory,
    composer: &RwLock<Composer>,
) -> anyhow::Result<wgpu::RenderPipeline> {
    let path = shader_dir.join(shader_def.path);
    let shader_code = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read shader file {}", path.display()))?;

    let file_path = path.to_string_lossy().to_string();

    let module = {
        let mut composer = composer
            .write()
            .map_err(|_| anyhow::anyhow!("Shader composer lock poisoned"))?;

        composer
            .make_naga_module(NagaModuleDescriptor {
                file_path: &file_path,
                source: &shader_code,
                ..Default::default()
            })
            .with_context(|| format!("Failed to compose {}", file_path))?
    };

    // Only needed to produce the module info for the WGSL writer; wgpu
    // validates again when the module is created.
    let info = naga::valid::Validator::new(ValidationFlags::empty(), Capabilities::all())
        .validate(&module)
        .context("Failed to validate Naga module")?;

    let shader_code = naga::back::wgsl::write_string(&module, &info, WriterFlags::empty())
        .context("Failed to convert Naga module to WGSL string")?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = factory(device, shader_def, &shader_code);

    device
        .poll(PollType::Wait)
        .context("Failed to poll device after shader compilation.")?;

    if let Some(error) = block_on(device.pop_error_scope()) {
        anyhow::bail!("Shader compilation failed for {}: {}", shader_def.name, error);
    }

    pipeline
}

fn create_composer(shared_dir: &Path) -> anyhow::Result<Composer> {
    let mut composer = Composer::default();

    let shared_files = std::fs::read_dir(shared_dir).with_context(|| {
        format!(
            "Failed to read shared shader modules directory {}",
            shared_dir.display()
        )
    })?;

    for entry in shared_files {
        let path = entry?.path();

        if !path.is_file() || path.extension().map_or(true, |ext| ext != "wgsl") {
            continue;
        }

        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read shared shader module {}", path.display()))?;

        let file_path = path.to_string_lossy().to_string();

        composer
            .add_composable_module(ComposableModuleDescriptor {
                source: &source,
                file_path: &file_path,
                language: ShaderLanguage::Wgsl,
                ..Default::default()
            })
            .with_context(|| format!("Failed to add shared shader module: {}", file_path))?;

        info!("Added shared shader module {}", file_path);
    }

    Ok(composer)
}
