//! Shared geometry types used by the selector, the resolver and the host.
//!
//! Boxes reported by a host are fractional CSS pixels ([`BoxSize`]); every
//! value the resolver writes back is whole pixels ([`Dimensions`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Whole-pixel width and height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both edges are non-zero, so the pair can act as a ratio.
    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = DimensionsError;

    /// Parse `"500x300"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DimensionsError(s.to_string());
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(err)?;
        Ok(Self::new(
            w.trim().parse().map_err(|_| err())?,
            h.trim().parse().map_err(|_| err())?,
        ))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("box must look like \"WIDTHxHEIGHT\", got {0:?}")]
pub struct DimensionsError(String);

/// Rendered client box as a host measures it (may be fractional).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

impl BoxSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Floor to whole pixels. Negative or NaN measurements become zero.
    pub fn floor(&self) -> Dimensions {
        let edge = |v: f64| if v.is_finite() && v > 0.0 { v.floor() as u32 } else { 0 };
        Dimensions::new(edge(self.width), edge(self.height))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatioError {
    #[error("aspect ratio must look like \"w:h\", got {0:?}")]
    Format(String),
    #[error("aspect ratio terms must be non-zero, got {0:?}")]
    Zero(String),
}

/// An explicit `w:h` aspect ratio, e.g. `16:9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height for a given width under this ratio (unrounded).
    pub fn height_for(&self, width: f64) -> f64 {
        width * self.height as f64 / self.width as f64
    }
}

impl FromStr for AspectRatio {
    type Err = RatioError;

    /// Parse `"16:9"`. Whitespace around either term is tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| RatioError::Format(s.to_string()))?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| RatioError::Format(s.to_string()))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| RatioError::Format(s.to_string()))?;
        if width == 0 || height == 0 {
            return Err(RatioError::Zero(s.to_string()));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}
