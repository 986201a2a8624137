//! The candidate scan.

use super::calculations::{HeightPolicy, available_box};
use super::params::{Decision, Selection, SelectionRequest};
use crate::candidate::{ImageCandidate, SourceSet};
use crate::types::Dimensions;

/// Decide what to do for one element.
///
/// The smallest sufficient candidate wins, where "smallest" means first in
/// declaration order: producers are expected to list candidates ascending by
/// width and nothing here sorts.
///
/// # Examples
/// ```
/// # use srcset_resolver::candidate::SourceSet;
/// # use srcset_resolver::selection::{Decision, SelectionRequest, select};
/// # use srcset_resolver::types::Dimensions;
/// let sources: SourceSet = "/a.jpg 320w, /b.jpg 640w, /c.jpg 1280w".parse().unwrap();
/// let request = SelectionRequest {
///     sources: &sources,
///     current: None,
///     own: Dimensions::new(0, 0),
///     parent: Dimensions::new(500, 300),
///     density: 1.0,
///     cover: false,
///     ratio: None,
///     declared: None,
/// };
/// let Decision::Apply(selection) = select(&request) else { panic!() };
/// assert_eq!(selection.candidate.path, "/b.jpg");
/// assert_eq!(selection.width, 500);
/// ```
pub fn select(request: &SelectionRequest<'_>) -> Decision {
    let available = available_box(request.own, request.parent);

    if request.current.is_some() {
        if let Some(declared) = request.declared {
            if declared.width > available.width && declared.height > available.height {
                return Decision::AlreadySufficient;
            }
        }
    }

    let policy = HeightPolicy::resolve(
        request.cover,
        request.parent,
        request.ratio,
        request.declared,
    );
    let candidate = choose_candidate(
        request.sources,
        available,
        request.density,
        request.cover,
        policy,
    );

    if request.current == Some(candidate.path.as_str()) {
        return Decision::Unchanged {
            path: candidate.path.clone(),
        };
    }

    Decision::Apply(Selection {
        candidate: candidate.clone(),
        width: available.width,
        height: policy.display_height(available.width),
    })
}

/// First candidate meeting the target box, else the last one.
///
/// The width must reach `available.width × density`. In cover mode the
/// candidate's implied height (floored) must also reach
/// `available.height × density`; a candidate with no implied height passes.
pub fn choose_candidate<'a>(
    sources: &'a SourceSet,
    available: Dimensions,
    density: f64,
    cover: bool,
    policy: HeightPolicy,
) -> &'a ImageCandidate {
    let target_width = available.width as f64 * density;
    let target_height = available.height as f64 * density;

    sources
        .iter()
        .find(|candidate| {
            if (candidate.width as f64) < target_width {
                return false;
            }
            if !cover {
                return true;
            }
            match policy.height_for(candidate.width) {
                Some(height) => height.floor() >= target_height,
                None => true,
            }
        })
        .unwrap_or_else(|| sources.last())
}
