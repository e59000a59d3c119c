use anyhow::Result;

use crate::config::DemoConfig;

mod camera;
mod config;
mod demo;
mod engine;
mod geometry;
mod rendering;
mod scene_graph;
mod scroll;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = DemoConfig::default();
    pollster::block_on(window::run(config))?;

    Ok(())
}
