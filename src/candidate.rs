//! Candidate source lists: the `"path 320w, path 640w"` wire format.
//!
//! A [`SourceSet`] is never empty, so the selector can always fall back to
//! its last entry. Declaration order is preserved; nothing here sorts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    #[error("source list is empty")]
    Empty,
    #[error("candidate {0:?} has no width descriptor")]
    MissingWidth(String),
    #[error("candidate {0:?} has an invalid width descriptor (expected e.g. \"640w\")")]
    InvalidWidth(String),
}

/// One entry from a source list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageCandidate {
    pub path: String,
    /// Intrinsic width in pixels, from the `w` descriptor.
    pub width: u32,
}

impl ImageCandidate {
    pub fn new(path: impl Into<String>, width: u32) -> Self {
        Self {
            path: path.into(),
            width,
        }
    }
}

impl fmt::Display for ImageCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}w", self.path, self.width)
    }
}

impl FromStr for ImageCandidate {
    type Err = CandidateError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        let mut parts = token.split_whitespace();
        let path = parts.next().ok_or(CandidateError::Empty)?;
        let descriptor = parts
            .next()
            .ok_or_else(|| CandidateError::MissingWidth(token.to_string()))?;
        let width = descriptor
            .strip_suffix('w')
            .and_then(|w| w.parse::<u32>().ok())
            .ok_or_else(|| CandidateError::InvalidWidth(token.to_string()))?;
        Ok(Self::new(path, width))
    }
}

/// A non-empty, declaration-ordered list of candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ImageCandidate>", into = "Vec<ImageCandidate>")]
pub struct SourceSet {
    candidates: Vec<ImageCandidate>,
}

impl SourceSet {
    pub fn new(candidates: Vec<ImageCandidate>) -> Result<Self, CandidateError> {
        if candidates.is_empty() {
            return Err(CandidateError::Empty);
        }
        Ok(Self { candidates })
    }

    pub fn candidates(&self) -> &[ImageCandidate] {
        &self.candidates
    }

    /// The fallback candidate: last in declaration order.
    pub fn last(&self) -> &ImageCandidate {
        &self.candidates[self.candidates.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageCandidate> {
        self.candidates.iter()
    }

    pub fn find(&self, path: &str) -> Option<&ImageCandidate> {
        self.candidates.iter().find(|c| c.path == path)
    }

    /// The list without `path`. A list that would become empty is
    /// returned whole.
    pub fn excluding(&self, path: &str) -> Self {
        let candidates: Vec<ImageCandidate> = self
            .candidates
            .iter()
            .filter(|c| c.path != path)
            .cloned()
            .collect();
        Self::new(candidates).unwrap_or_else(|_| self.clone())
    }
}

impl TryFrom<Vec<ImageCandidate>> for SourceSet {
    type Error = CandidateError;

    fn try_from(candidates: Vec<ImageCandidate>) -> Result<Self, Self::Error> {
        Self::new(candidates)
    }
}

impl From<SourceSet> for Vec<ImageCandidate> {
    fn from(set: SourceSet) -> Self {
        set.candidates
    }
}

impl<'a> IntoIterator for &'a SourceSet {
    type Item = &'a ImageCandidate;
    type IntoIter = std::slice::Iter<'a, ImageCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

impl FromStr for SourceSet {
    type Err = CandidateError;

    /// Parse a comma-separated source list. Blank tokens are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let candidates = s
            .split(',')
            .filter(|token| !token.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<ImageCandidate>, _>>()?;
        Self::new(candidates)
    }
}

impl fmt::Display for SourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, candidate) in self.candidates.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{candidate}")?;
        }
        Ok(())
    }
}
