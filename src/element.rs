//! Reading a managed element's attributes into a typed snapshot.
//!
//! Parsing is forgiving in the same places a browser would be: an unparsable
//! multiplier counts as `1x`, an unparsable ratio or a non-numeric
//! `width`/`height` is ignored. Only the source list is mandatory.

use crate::candidate::{CandidateError, SourceSet};
use crate::host::{Host, attr};
use crate::types::{AspectRatio, Dimensions};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("element has no data-srcset attribute")]
    MissingSourceList,
    #[error("invalid data-srcset: {0}")]
    SourceList(#[from] CandidateError),
}

/// Everything the selector needs from one element, read in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSnapshot {
    pub sources: SourceSet,
    /// Currently applied `src`, if any.
    pub current: Option<String>,
    /// Declared density multiplier (`"2x"` → `2.0`).
    pub multiplier: Option<f64>,
    pub cover: bool,
    pub ratio: Option<AspectRatio>,
    /// `width`/`height` attributes, only when both are present.
    pub declared: Option<Dimensions>,
    pub lazy: bool,
}

impl ElementSnapshot {
    pub fn read<H: Host>(host: &H, node: H::Node) -> Result<Self, AttributeError> {
        let sources: SourceSet = host
            .attribute(node, attr::SRCSET)
            .ok_or(AttributeError::MissingSourceList)?
            .parse()?;

        let current = host
            .attribute(node, attr::SRC)
            .filter(|src| !src.trim().is_empty());

        let multiplier = host
            .attribute(node, attr::MULTIPLIER)
            .and_then(|m| parse_multiplier(&m));

        let ratio = host
            .attribute(node, attr::RATIO)
            .and_then(|r| r.parse::<AspectRatio>().ok());

        let declared = match (
            host.attribute(node, attr::WIDTH).and_then(|w| parse_length(&w)),
            host.attribute(node, attr::HEIGHT).and_then(|h| parse_length(&h)),
        ) {
            (Some(width), Some(height)) => Some(Dimensions::new(width, height)),
            _ => None,
        };

        Ok(Self {
            sources,
            current,
            multiplier,
            cover: host.has_attribute(node, attr::COVER),
            ratio,
            declared,
            lazy: is_lazy(host, node),
        })
    }

    /// Cover mode or an explicit ratio pins the displayed proportions.
    pub fn has_fixed_ratio(&self) -> bool {
        self.cover || self.ratio.is_some()
    }
}

/// `loading="lazy"` marks an element for deferred loading.
pub fn is_lazy<H: Host>(host: &H, node: H::Node) -> bool {
    host.attribute(node, attr::LOADING)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("lazy"))
}

/// Parse a density token such as `"2x"`, `"1.5x"` or `"2"`.
pub fn parse_multiplier(token: &str) -> Option<f64> {
    let token = token.trim();
    let number = token.strip_suffix(['x', 'X']).unwrap_or(token);
    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|m| m.is_finite() && *m > 0.0)
}

/// Parse a `width`/`height` attribute. Fractions are truncated.
fn parse_length(value: &str) -> Option<u32> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u32)
}
