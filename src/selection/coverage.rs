//! Which candidate serves which layout width, across device pixel ratios.
//!
//! Each ratio is capped by the element's multiplier exactly as the resolver
//! caps it, so a 2x screen without a multiplier gets the 1x pick. Rows are
//! independent so the grid is evaluated with rayon.

use super::calculations::{HeightPolicy, effective_multiplier};
use super::selector::choose_candidate;
use crate::candidate::{ImageCandidate, SourceSet};
use crate::types::Dimensions;
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRow {
    /// Available layout width in CSS pixels.
    pub width: u32,
    /// Device pixel ratio this row was evaluated at.
    pub dpr: f64,
    /// `dpr` after the multiplier cap.
    pub density: f64,
    pub candidate: ImageCandidate,
    /// Candidate width over required pixel width. Below 1.0 means the
    /// largest candidate is upscaled.
    pub fill: f64,
}

/// Evaluate every `(width, dpr)` pair, ordered by width then ratio.
/// `multiplier` is the element's declared `data-multiplier`.
pub fn coverage(
    sources: &SourceSet,
    widths: &[u32],
    dprs: &[f64],
    multiplier: Option<f64>,
) -> Vec<CoverageRow> {
    let grid: Vec<(u32, f64)> = widths
        .iter()
        .flat_map(|w| dprs.iter().map(move |d| (*w, *d)))
        .collect();
    grid.par_iter()
        .map(|&(width, dpr)| {
            let density = effective_multiplier(dpr, multiplier);
            let available = Dimensions::new(width, 0);
            let candidate =
                choose_candidate(sources, available, density, false, HeightPolicy::Natural);
            let required = width as f64 * density;
            let fill = if required > 0.0 {
                candidate.width as f64 / required
            } else {
                f64::INFINITY
            };
            CoverageRow {
                width,
                dpr,
                density,
                candidate: candidate.clone(),
                fill,
            }
        })
        .collect()
}

/// `start..=end` in `step` increments; `end` is always included.
pub fn width_range(start: u32, end: u32, step: u32) -> Vec<u32> {
    if step == 0 || start > end {
        return vec![start.min(end)];
    }
    let mut widths: Vec<u32> = (start..=end).step_by(step as usize).collect();
    if widths.last() != Some(&end) {
        widths.push(end);
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> SourceSet {
        "/a.jpg 320w, /b.jpg 640w, /c.jpg 1280w".parse().unwrap()
    }

    #[test]
    fn rows_follow_input_order() {
        let rows = coverage(&list(), &[300, 600], &[1.0, 2.0], Some(2.0));
        let picks: Vec<(u32, f64, &str)> = rows
            .iter()
            .map(|r| (r.width, r.density, r.candidate.path.as_str()))
            .collect();
        assert_eq!(
            picks,
            vec![
                (300, 1.0, "/a.jpg"),
                (300, 2.0, "/b.jpg"),
                (600, 1.0, "/b.jpg"),
                (600, 2.0, "/c.jpg"),
            ]
        );
    }

    #[test]
    fn fill_below_one_marks_upscaling() {
        let rows = coverage(&list(), &[1000], &[2.0], Some(2.0));
        assert_eq!(rows[0].candidate.path, "/c.jpg");
        assert!((rows[0].fill - 0.64).abs() < 1e-9);
    }

    #[test]
    fn dense_screen_without_multiplier_gets_1x_pick() {
        let rows = coverage(&list(), &[500], &[2.0], None);
        assert_eq!(rows[0].dpr, 2.0);
        assert_eq!(rows[0].density, 1.0);
        assert_eq!(rows[0].candidate.path, "/b.jpg");
    }

    #[test]
    fn multiplier_caps_the_ratio() {
        let rows = coverage(&list(), &[300], &[3.0], Some(2.0));
        assert_eq!(rows[0].density, 2.0);
        assert_eq!(rows[0].candidate.path, "/b.jpg");
        assert!((rows[0].fill - 640.0 / 600.0).abs() < 1e-9);
    }

    #[test]
    fn width_range_includes_end() {
        assert_eq!(width_range(320, 1000, 320), vec![320, 640, 960, 1000]);
        assert_eq!(width_range(100, 300, 100), vec![100, 200, 300]);
        assert_eq!(width_range(500, 500, 0), vec![500]);
    }
}
