use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::demo::DemoState;

/// Consumes the scene and camera and draws one frame.
pub trait FrameRenderer {
    type Error;

    fn render_frame(&mut self, state: &DemoState) -> Result<(), Self::Error>;
}

/// Shared stop flag for the frame ticker.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Drives the per-refresh update: advance rotations, render, then ask to be
/// scheduled again unless cancelled.
pub struct FrameTicker {
    cancel: CancellationToken,
}

impl FrameTicker {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs one refresh. `Continue` means the caller should schedule the next
    /// refresh; `Break` means the chain has ended and nothing was drawn.
    ///
    /// A render error is returned after the rotations have already advanced;
    /// the caller decides whether the chain survives it.
    pub fn on_frame<R: FrameRenderer>(
        &mut self,
        state: &mut DemoState,
        renderer: &mut R,
    ) -> Result<ControlFlow<()>, R::Error> {
        if self.cancel.is_cancelled() {
            return Ok(ControlFlow::Break(()));
        }

        state.tick();
        renderer.render_frame(state)?;

        if self.cancel.is_cancelled() {
            Ok(ControlFlow::Break(()))
        } else {
            Ok(ControlFlow::Continue(()))
        }
    }

    /// Back-to-back refreshes without a display, until cancelled or `max_frames`
    /// have been drawn. Returns the number of frames drawn.
    ///
    /// The windowed app drives `on_frame` from redraw requests instead.
    #[allow(dead_code)]
    pub fn run<R: FrameRenderer>(
        &mut self,
        state: &mut DemoState,
        renderer: &mut R,
        max_frames: Option<u64>,
    ) -> Result<u64, R::Error> {
        let first_frame = state.frames();

        loop {
            if max_frames.is_some_and(|max| state.frames() - first_frame >= max) {
                break;
            }

            if self.on_frame(state, renderer)?.is_break() {
                break;
            }
        }

        Ok(state.frames() - first_frame)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::config::DemoConfig;

    /// Remembers the torus rotation it was asked to draw on every frame.
    #[derive(Default)]
    struct RecordingRenderer {
        torus_x: Vec<f64>,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl FrameRenderer for RecordingRenderer {
        type Error = String;

        fn render_frame(&mut self, state: &DemoState) -> Result<(), Self::Error> {
            self.torus_x.push(state.torus().rotation.x);

            if let Some((after, token)) = &self.cancel_after {
                if self.torus_x.len() >= *after {
                    token.cancel();
                }
            }

            Ok(())
        }
    }

    struct FailingRenderer;

    impl FrameRenderer for FailingRenderer {
        type Error = &'static str;

        fn render_frame(&mut self, _state: &DemoState) -> Result<(), Self::Error> {
            Err("surface lost")
        }
    }

    fn demo() -> DemoState {
        DemoState::with_rng(&DemoConfig::default(), &mut StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn each_frame_advances_then_renders() {
        let mut state = demo();
        let mut renderer = RecordingRenderer::default();
        let mut ticker = FrameTicker::new(CancellationToken::new());

        let outcome = ticker.on_frame(&mut state, &mut renderer).unwrap();

        assert!(outcome.is_continue());
        assert_eq!(renderer.torus_x.len(), 1);
        assert!((renderer.torus_x[0] - 0.01).abs() < 1e-6);
    }

    #[test]
    fn bounded_run_draws_exactly_the_budget() {
        let mut state = demo();
        let mut renderer = RecordingRenderer::default();
        let mut ticker = FrameTicker::new(CancellationToken::new());

        let frames = ticker.run(&mut state, &mut renderer, Some(100)).unwrap();

        assert_eq!(frames, 100);
        assert_eq!(renderer.torus_x.len(), 100);
        assert!((state.torus().rotation.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn cancelled_ticker_draws_nothing() {
        let mut state = demo();
        let mut renderer = RecordingRenderer::default();
        let token = CancellationToken::new();
        let mut ticker = FrameTicker::new(token.clone());

        token.cancel();
        let outcome = ticker.on_frame(&mut state, &mut renderer).unwrap();

        assert!(outcome.is_break());
        assert!(renderer.torus_x.is_empty());
        assert_eq!(state.torus().rotation.x, 0.0);
    }

    #[test]
    fn cancellation_mid_run_stops_the_chain() {
        let mut state = demo();
        let token = CancellationToken::new();
        let mut renderer = RecordingRenderer {
            cancel_after: Some((7, token.clone())),
            ..Default::default()
        };
        let mut ticker = FrameTicker::new(token);

        let frames = ticker.run(&mut state, &mut renderer, None).unwrap();

        assert_eq!(frames, 7);
        assert!(ticker.cancellation_token().is_cancelled());
    }

    #[test]
    fn render_errors_are_returned_after_the_update() {
        let mut state = demo();
        let mut ticker = FrameTicker::new(CancellationToken::new());

        let result = ticker.on_frame(&mut state, &mut FailingRenderer);

        assert_eq!(result, Err("surface lost"));
        assert_eq!(state.frames(), 1);
    }

    #[test]
    fn scroll_between_frames_is_seen_by_the_next_render() {
        let mut state = demo();
        let mut renderer = RecordingRenderer::default();
        let mut ticker = FrameTicker::new(CancellationToken::new());

        ticker.on_frame(&mut state, &mut renderer).unwrap();
        state.move_camera(-1000.0);
        ticker.on_frame(&mut state, &mut renderer).unwrap();

        assert!((state.camera.transform.position.z - 10.0).abs() < 1e-4);
        assert!((state.moon().rotation.x - (0.005 * 2.0 + 0.05)).abs() < 1e-5);
    }
}
