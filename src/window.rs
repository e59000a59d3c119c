use std::sync::Arc;

use anyhow::Context;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    config::DemoConfig,
    demo::DemoState,
    engine::{CancellationToken, FrameTicker},
    rendering::renderer::Renderer,
    scroll::PageScroll,
};

struct App {
    config: DemoConfig,
    renderer: Option<Renderer>,
    demo_state: DemoState,
    page_scroll: PageScroll,
    ticker: FrameTicker,
}

impl App {
    fn new(config: DemoConfig, demo_state: DemoState) -> Self {
        Self {
            page_scroll: PageScroll::from_config(&config),
            config,
            renderer: None,
            demo_state,
            ticker: FrameTicker::new(CancellationToken::new()),
        }
    }

    fn create_renderer(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<Renderer> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.window_title.clone())
            .with_inner_size(self.config.window_size)
            .with_resizable(false);

        let window = event_loop
            .create_window(window_attributes)
            .context("Failed to create window")?;

        let size = window.inner_size();
        self.demo_state.set_viewport(size.width, size.height);

        let mut renderer = pollster::block_on(Renderer::new(
            Arc::new(window),
            &self.demo_state,
            &self.config,
        ))?;
        renderer.load_scene(&mut self.demo_state);

        Ok(renderer)
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        self.ticker.cancellation_token().cancel();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        match self.create_renderer(event_loop) {
            Ok(renderer) => {
                // Place the camera for the initial scroll offset before the
                // first frame is drawn.
                self.demo_state.start(&self.page_scroll);
                renderer.window.request_redraw();
                self.renderer = Some(renderer);
            }
            Err(e) => {
                error!("Failed to start renderer: {:#}", e);
                self.stop(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!(
                    "Closing after {} frames and {} scroll events",
                    self.demo_state.frames(),
                    self.demo_state.scroll_events()
                );
                self.stop(event_loop);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.demo_state.on_wheel(&mut self.page_scroll, delta);
            }
            WindowEvent::RedrawRequested => {
                match self.ticker.on_frame(&mut self.demo_state, renderer) {
                    Ok(flow) => {
                        if flow.is_continue() {
                            renderer.window.request_redraw();
                        }
                        return;
                    }
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("Out of memory");
                        self.stop(event_loop);
                        return;
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        warn!("Timeout");
                    }
                    Err(other) => {
                        error!("Unexpected error: {:?}", other);
                    }
                }

                renderer.window.request_redraw();
            }
            _ => (),
        }
    }
}

pub async fn run(config: DemoConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let demo_state = DemoState::new(&config).context("Failed to create demo state")?;
    let mut app = App::new(config, demo_state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
