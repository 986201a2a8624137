//! Pure calculation functions for candidate selection.
//!
//! All functions here are pure and testable without a host.

use crate::types::{AspectRatio, Dimensions};

/// Density factor applied to the available box.
///
/// Scaling is capped by the larger of `1` and the declared multiplier, and
/// never exceeds the actual device density. A non-finite or non-positive
/// device ratio counts as `1`.
///
/// # Examples
/// ```
/// # use srcset_resolver::selection::effective_multiplier;
/// assert_eq!(effective_multiplier(3.0, Some(2.0)), 2.0);
/// assert_eq!(effective_multiplier(1.5, Some(4.0)), 1.5);
/// assert_eq!(effective_multiplier(1.0, None), 1.0);
/// ```
pub fn effective_multiplier(device_pixel_ratio: f64, declared: Option<f64>) -> f64 {
    let cap = declared.unwrap_or(1.0).max(1.0);
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(cap)
    } else {
        1.0
    }
}

/// Space available to the image: the larger of its own box and its parent's
/// box on each axis. An image that has not loaded yet may report zero, so the
/// parent is consulted too.
pub fn available_box(own: Dimensions, parent: Dimensions) -> Dimensions {
    Dimensions::new(own.width.max(parent.width), own.height.max(parent.height))
}

/// Where the height of a candidate comes from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightPolicy {
    /// Cover mode: the container's proportions.
    Cover(Dimensions),
    /// Explicit `data-ratio`.
    Ratio(AspectRatio),
    /// Proportions of the declared `width`/`height`.
    Declared(Dimensions),
    /// Nothing known until the image loads.
    Natural,
}

impl HeightPolicy {
    pub fn resolve(
        cover: bool,
        parent: Dimensions,
        ratio: Option<AspectRatio>,
        declared: Option<Dimensions>,
    ) -> Self {
        if cover && parent.is_positive() {
            return Self::Cover(parent);
        }
        if let Some(ratio) = ratio {
            return Self::Ratio(ratio);
        }
        match declared {
            Some(d) if d.is_positive() => Self::Declared(d),
            _ => Self::Natural,
        }
    }

    /// Unrounded height for `width`, or `None` under [`HeightPolicy::Natural`].
    pub fn height_for(&self, width: u32) -> Option<f64> {
        let w = width as f64;
        match self {
            Self::Cover(b) | Self::Declared(b) => Some(w * b.height as f64 / b.width as f64),
            Self::Ratio(r) => Some(r.height_for(w)),
            Self::Natural => None,
        }
    }

    /// Height written to the element for a display width, rounded.
    pub fn display_height(&self, width: u32) -> Option<u32> {
        self.height_for(width).map(|h| h.round() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // effective_multiplier
    // =========================================================================

    #[test]
    fn multiplier_capped_by_declared() {
        assert_eq!(effective_multiplier(3.0, Some(2.0)), 2.0);
    }

    #[test]
    fn multiplier_capped_by_device() {
        assert_eq!(effective_multiplier(1.5, Some(4.0)), 1.5);
    }

    #[test]
    fn multiplier_defaults_to_one() {
        assert_eq!(effective_multiplier(1.0, None), 1.0);
        assert_eq!(effective_multiplier(2.0, None), 1.0);
    }

    #[test]
    fn declared_below_one_is_raised_to_one() {
        assert_eq!(effective_multiplier(2.0, Some(0.5)), 1.0);
    }

    #[test]
    fn zoomed_out_device_scales_down() {
        assert_eq!(effective_multiplier(0.5, Some(2.0)), 0.5);
    }

    #[test]
    fn broken_device_ratio_counts_as_one() {
        assert_eq!(effective_multiplier(f64::NAN, Some(2.0)), 1.0);
        assert_eq!(effective_multiplier(0.0, Some(2.0)), 1.0);
    }

    // =========================================================================
    // available_box
    // =========================================================================

    #[test]
    fn unloaded_image_uses_parent_box() {
        let b = available_box(Dimensions::new(0, 0), Dimensions::new(640, 360));
        assert_eq!(b, Dimensions::new(640, 360));
    }

    #[test]
    fn overflowing_image_beats_parent_per_axis() {
        let b = available_box(Dimensions::new(500, 900), Dimensions::new(640, 360));
        assert_eq!(b, Dimensions::new(640, 900));
    }

    // =========================================================================
    // HeightPolicy
    // =========================================================================

    #[test]
    fn cover_wins_over_ratio_and_declared() {
        let p = HeightPolicy::resolve(
            true,
            Dimensions::new(400, 100),
            Some(AspectRatio::new(16, 9)),
            Some(Dimensions::new(4, 3)),
        );
        assert_eq!(p, HeightPolicy::Cover(Dimensions::new(400, 100)));
        assert_eq!(p.height_for(800), Some(200.0));
    }

    #[test]
    fn cover_without_parent_box_falls_to_ratio() {
        let p = HeightPolicy::resolve(
            true,
            Dimensions::new(0, 100),
            Some(AspectRatio::new(16, 9)),
            None,
        );
        assert_eq!(p, HeightPolicy::Ratio(AspectRatio::new(16, 9)));
    }

    #[test]
    fn ratio_wins_over_declared() {
        let p = HeightPolicy::resolve(
            false,
            Dimensions::new(400, 100),
            Some(AspectRatio::new(1, 1)),
            Some(Dimensions::new(4, 3)),
        );
        assert_eq!(p.display_height(333), Some(333));
    }

    #[test]
    fn declared_dimensions_used_last() {
        let p = HeightPolicy::resolve(false, Dimensions::default(), None, Some(Dimensions::new(4, 3)));
        // 500 * 3 / 4 = 375
        assert_eq!(p.display_height(500), Some(375));
    }

    #[test]
    fn zero_declared_dimension_means_natural() {
        let p = HeightPolicy::resolve(false, Dimensions::default(), None, Some(Dimensions::new(4, 0)));
        assert_eq!(p, HeightPolicy::Natural);
        assert_eq!(p.height_for(500), None);
    }

    #[test]
    fn display_height_rounds_to_nearest() {
        // 500 * 9 / 16 = 281.25
        let p = HeightPolicy::Ratio(AspectRatio::new(16, 9));
        assert_eq!(p.display_height(500), Some(281));
        // 501 * 9 / 16 = 281.8125
        assert_eq!(p.display_height(501), Some(282));
    }
}
