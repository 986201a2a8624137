//! Input and output types for a selection pass.
//!
//! A [`SelectionRequest`] is everything measured and read for one element at
//! one moment; [`Decision`] is what the orchestrator should do about it.

use crate::candidate::{ImageCandidate, SourceSet};
use crate::element::ElementSnapshot;
use crate::types::{AspectRatio, BoxSize, Dimensions};

/// One element's inputs to the selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRequest<'a> {
    pub sources: &'a SourceSet,
    pub current: Option<&'a str>,
    /// Own rendered box, floored.
    pub own: Dimensions,
    /// Parent rendered box, floored.
    pub parent: Dimensions,
    /// Effective density multiplier.
    pub density: f64,
    pub cover: bool,
    pub ratio: Option<AspectRatio>,
    pub declared: Option<Dimensions>,
}

impl<'a> SelectionRequest<'a> {
    /// Build a request from a snapshot and the host's current measurements.
    pub fn from_snapshot(
        snapshot: &'a ElementSnapshot,
        own: BoxSize,
        parent: BoxSize,
        device_pixel_ratio: f64,
    ) -> Self {
        Self {
            sources: &snapshot.sources,
            current: snapshot.current.as_deref(),
            own: own.floor(),
            parent: parent.floor(),
            density: super::effective_multiplier(device_pixel_ratio, snapshot.multiplier),
            cover: snapshot.cover,
            ratio: snapshot.ratio,
            declared: snapshot.declared,
        }
    }
}

/// The chosen candidate plus the box to reserve for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub candidate: ImageCandidate,
    /// Display width: the available width.
    pub width: u32,
    /// Display height, when a height policy applies.
    pub height: Option<u32>,
}

/// Outcome of a selection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The applied image's declared box already exceeds the available box.
    AlreadySufficient,
    /// The best candidate is the one already applied.
    Unchanged { path: String },
    /// A different candidate should be applied.
    Apply(Selection),
}
