//! Centralized parsing for responsive image style names.
//!
//! Derivative styles encode their geometry in their name, so no separate
//! catalog file is needed:
//!
//! - `responsive_16_9_640w` → crop to 16:9 at 640px wide (height 360)
//! - `responsive_1500w` → scale to 1500px wide, original proportions
//!
//! Every other name (including `thumbnail`, `responsive_wide`, or a ratio
//! style with a zero term) is not a responsive style and is ignored.

use crate::types::AspectRatio;

const PREFIX: &str = "responsive";

/// Geometry parsed from a style name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleGeometry {
    /// Cropped to an exact aspect ratio.
    Ratio {
        aspect: AspectRatio,
        width: u32,
        height: u32,
    },
    /// Scaled to a width, proportions preserved.
    Scale { width: u32 },
}

impl StyleGeometry {
    pub fn width(&self) -> u32 {
        match self {
            Self::Ratio { width, .. } | Self::Scale { width } => *width,
        }
    }
}

/// Parse a style name following the `responsive_…` convention.
///
/// Handles these patterns:
/// - `"responsive_16_9_640w"` → Ratio { 16:9, width 640, height 360 }
/// - `"responsive_1_1_100w"` → Ratio { 1:1, width 100, height 100 }
/// - `"responsive_1500w"` → Scale { width 1500 }
/// - `"large"`, `"responsive_wide"` → None
pub fn parse_style_name(name: &str) -> Option<StyleGeometry> {
    let parts: Vec<&str> = name.split('_').collect();
    if parts.first() != Some(&PREFIX) {
        return None;
    }
    match parts.as_slice() {
        [_, aspect_w, aspect_h, width] => {
            let aspect_w: u32 = aspect_w.parse().ok()?;
            let aspect_h: u32 = aspect_h.parse().ok()?;
            if aspect_w == 0 || aspect_h == 0 {
                return None;
            }
            let width = parse_width(width)?;
            let height = (width as f64 / aspect_w as f64 * aspect_h as f64).round() as u32;
            Some(StyleGeometry::Ratio {
                aspect: AspectRatio::new(aspect_w, aspect_h),
                width,
                height,
            })
        }
        [_, width] => Some(StyleGeometry::Scale {
            width: parse_width(width)?,
        }),
        _ => None,
    }
}

/// `"640w"` → 640.
fn parse_width(token: &str) -> Option<u32> {
    token.strip_suffix('w')?.parse().ok()
}
