pub mod frame_uniform;
pub mod instance;
pub mod passes;
pub mod render_common;
pub mod render_material;
pub mod render_model;
pub mod renderer;
pub mod shader_loader;
pub mod texture;
