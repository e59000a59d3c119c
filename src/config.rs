use std::path::PathBuf;

use winit::dpi::LogicalSize;

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub window_title: String,
    /// The window is created at this size and never resized.
    pub window_size: LogicalSize<u32>,
    pub asset_dir: PathBuf,
    pub shader_dir: PathBuf,

    pub star_count: usize,
    /// Stars are placed uniformly in `[-star_spread, star_spread]` on every axis.
    /// Only the magnitude is used; it must be finite.
    pub star_spread: f32,

    /// Scrollable height of the virtual page in pixels.
    pub scroll_extent: f32,
    /// Pixels scrolled per mouse wheel line.
    pub wheel_line_height: f32,
}

impl DemoConfig {
    pub fn shared_shader_dir(&self) -> PathBuf {
        self.shader_dir.join("shared")
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.window_size.width as f32 / self.window_size.height as f32
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window_title: String::from("scrollscape"),
            window_size: LogicalSize::new(1280, 720),
            asset_dir: PathBuf::from("assets"),
            shader_dir: PathBuf::from("assets/shaders"),
            star_count: 400,
            star_spread: 100.0,
            scroll_extent: 5000.0,
            wheel_line_height: 40.0,
        }
    }
}
