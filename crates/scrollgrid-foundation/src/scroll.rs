//! Viewport measurements reported by the host.
//!
//! The grid never reads layout itself. After a scroll event, or after the
//! host has laid out a fresh render, the host reports the scroll container's
//! dimensions as [`ScrollMetrics`].

/// Scroll container dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Total height of the scrollable content.
    pub scroll_height: f32,

    /// Height of the visible area.
    pub client_height: f32,

    /// Current scroll offset from the top.
    pub scroll_top: f32,
}

impl ScrollMetrics {
    pub fn new(scroll_height: f32, client_height: f32, scroll_top: f32) -> Self {
        Self {
            scroll_height,
            client_height,
            scroll_top,
        }
    }

    /// Distance left to scroll before reaching the bottom.
    pub fn remaining(&self) -> f32 {
        self.scroll_height - self.client_height - self.scroll_top
    }

    /// Whether the content overflows the visible area.
    ///
    /// Content that merely fits is not scrollable, so no scroll event can
    /// ever request more of it.
    pub fn is_scrollable(&self) -> bool {
        self.scroll_height > self.client_height
    }

    /// Whether the remaining distance is inside `threshold`.
    pub fn should_prefetch(&self, threshold: f32) -> bool {
        self.remaining() < threshold
    }

    /// Largest valid `scroll_top` for these dimensions.
    pub fn max_scroll_top(&self) -> f32 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}
