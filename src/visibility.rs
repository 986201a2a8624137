//! Viewport geometry for the lazy trigger.
//!
//! Only the block (vertical) axis is considered: pages scroll vertically and
//! every managed element spans the inline axis of its container.

use serde::{Deserialize, Serialize};

/// Default distance, in CSS pixels, ahead of the viewport edge at which a
/// lazy image starts loading.
pub const DEFAULT_PRELOAD_MARGIN: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Vertical scroll offset of the viewport's top edge.
    pub scroll: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll: 0.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Whether an element spanning `[top, top + height]` intersects the
/// viewport grown by `margin` on both edges. Touching edges count, so a
/// zero-height element sitting exactly on the boundary is visible.
pub fn intersects(top: f64, height: f64, viewport: &Viewport, margin: u32) -> bool {
    let margin = margin as f64;
    let start = viewport.scroll - margin;
    let end = viewport.scroll + viewport.height + margin;
    let bottom = top + height.max(0.0);
    top <= end && bottom >= start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_inside_viewport_intersects() {
        let vp = Viewport::new(1000.0, 800.0);
        assert!(intersects(100.0, 200.0, &vp, 0));
    }

    #[test]
    fn margin_pulls_below_the_fold_element_in() {
        let vp = Viewport::new(1000.0, 800.0);
        assert!(!intersects(1101.0, 50.0, &vp, 300));
        assert!(intersects(1100.0, 50.0, &vp, 300));
    }

    #[test]
    fn element_scrolled_past_is_outside() {
        let mut vp = Viewport::new(1000.0, 800.0);
        vp.scroll = 2000.0;
        assert!(!intersects(100.0, 200.0, &vp, 300));
        assert!(intersects(1500.0, 200.0, &vp, 300));
    }

    #[test]
    fn zero_height_element_on_edge_counts() {
        let vp = Viewport::new(1000.0, 800.0);
        assert!(intersects(800.0, 0.0, &vp, 0));
    }
}
