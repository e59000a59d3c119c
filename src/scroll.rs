use winit::event::MouseScrollDelta;

use crate::config::DemoConfig;

/// Scroll position of a virtual page of fixed height.
///
/// The offset follows the bounding-rect convention of a document body: it is
/// the distance of the page top from the viewport top, so it starts at `0.0`
/// and goes negative as the page scrolls down, bottoming out at
/// `-extent`.
#[derive(Debug, Clone)]
pub struct PageScroll {
    offset: f32,
    extent: f32,
    line_height: f32,
}

impl PageScroll {
    pub fn new(extent: f32, line_height: f32) -> Self {
        Self {
            offset: 0.0,
            extent: extent.max(0.0),
            line_height,
        }
    }

    pub fn from_config(config: &DemoConfig) -> Self {
        Self::new(config.scroll_extent, config.wheel_line_height)
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Moves the page by `delta` pixels (positive scrolls towards the top).
    ///
    /// Returns the new offset if the page actually moved. Scrolling past either
    /// end of the page is clamped and produces no event, the same way a browser
    /// does not fire `scroll` when the page is already at its limit.
    pub fn scroll_by(&mut self, delta: f32) -> Option<f32> {
        let next = (self.offset + delta).clamp(-self.extent, 0.0);

        if next == self.offset {
            return None;
        }

        self.offset = next;
        Some(next)
    }

    pub fn apply_wheel(&mut self, delta: MouseScrollDelta) -> Option<f32> {
        let pixels = match delta {
            MouseScrollDelta::LineDelta(_, lines) => lines * self.line_height,
            MouseScrollDelta::PixelDelta(position) => position.y as f32,
        };

        self.scroll_by(pixels)
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalPosition;

    use super::*;

    #[test]
    fn starts_at_page_top() {
        let scroll = PageScroll::new(1000.0, 40.0);
        assert_eq!(scroll.offset(), 0.0);
    }

    #[test]
    fn wheel_down_moves_offset_negative() {
        let mut scroll = PageScroll::new(1000.0, 40.0);

        let offset = scroll.apply_wheel(MouseScrollDelta::LineDelta(0.0, -3.0));

        assert_eq!(offset, Some(-120.0));
        assert_eq!(scroll.offset(), -120.0);
    }

    #[test]
    fn pixel_delta_is_used_as_is() {
        let mut scroll = PageScroll::new(1000.0, 40.0);

        scroll.apply_wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -75.0)));

        assert_eq!(scroll.offset(), -75.0);
    }

    #[test]
    fn clamps_at_both_ends_without_events() {
        let mut scroll = PageScroll::new(100.0, 40.0);

        assert_eq!(scroll.scroll_by(10.0), None);
        assert_eq!(scroll.offset(), 0.0);

        assert_eq!(scroll.scroll_by(-500.0), Some(-100.0));
        assert_eq!(scroll.scroll_by(-1.0), None);
        assert_eq!(scroll.offset(), -100.0);
    }

    #[test]
    fn horizontal_wheel_is_ignored() {
        let mut scroll = PageScroll::new(100.0, 40.0);

        assert_eq!(scroll.apply_wheel(MouseScrollDelta::LineDelta(5.0, 0.0)), None);
    }
}
