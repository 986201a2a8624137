//! Producing candidate lists from image style names.
//!
//! A [`StyleCatalog`] groups the responsive styles a site defines by aspect
//! ratio (plus one group of plain scaling styles). Given a source image it
//! yields one [`StyledSource`] per style, ascending by width, which is the
//! order the selector expects.
//!
//! ## Derivative URLs
//!
//! With `styles.derivative` set to `webp` or `avif`, the last occurrence of
//! the source's extension in each URL gets the alternate extension appended:
//! `/styles/responsive_640w/public/photo.jpg` becomes
//! `/styles/responsive_640w/public/photo.jpg.webp`. External sources and
//! sources without an extension are left alone.

use crate::candidate::{CandidateError, ImageCandidate, SourceSet};
use crate::config::{Derivative, StylesConfig};
use crate::naming::{StyleGeometry, parse_style_name};
use crate::types::AspectRatio;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("no responsive styles defined for aspect ratio {0}")]
    UnknownRatio(AspectRatio),
    #[error("no responsive scaling styles defined")]
    NoScaleStyles,
    #[error(transparent)]
    Candidates(#[from] CandidateError),
}

/// A style from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    pub name: String,
    pub width: u32,
    /// Only ratio styles know their height up front.
    pub height: Option<u32>,
}

/// One derivative URL of a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSource {
    pub url: String,
    pub width: u32,
    pub height: Option<u32>,
}

impl From<&StyledSource> for ImageCandidate {
    fn from(source: &StyledSource) -> Self {
        ImageCandidate::new(source.url.clone(), source.width)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleCatalog {
    ratios: BTreeMap<AspectRatio, Vec<StyleEntry>>,
    scale: Vec<StyleEntry>,
}

impl StyleCatalog {
    /// Build a catalog from style names. Names that are not responsive
    /// styles are skipped; each group ends up sorted by width.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();
        for name in names {
            let name = name.as_ref().trim();
            match parse_style_name(name) {
                Some(StyleGeometry::Ratio {
                    aspect,
                    width,
                    height,
                }) => catalog.ratios.entry(aspect).or_default().push(StyleEntry {
                    name: name.to_string(),
                    width,
                    height: Some(height),
                }),
                Some(StyleGeometry::Scale { width }) => catalog.scale.push(StyleEntry {
                    name: name.to_string(),
                    width,
                    height: None,
                }),
                None => {}
            }
        }
        for group in catalog.ratios.values_mut() {
            group.sort_by_key(|s| s.width);
        }
        catalog.scale.sort_by_key(|s| s.width);
        catalog
    }

    /// Aspect ratios with at least one style, ascending.
    pub fn aspect_ratios(&self) -> Vec<AspectRatio> {
        self.ratios.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty() && self.scale.is_empty()
    }

    /// Derivatives of `source` cropped to `ratio`, ascending by width.
    pub fn by_aspect_ratio(
        &self,
        source: &str,
        ratio: AspectRatio,
        styles: &StylesConfig,
    ) -> Result<Vec<StyledSource>, StyleError> {
        let group = self
            .ratios
            .get(&ratio)
            .ok_or(StyleError::UnknownRatio(ratio))?;
        Ok(styled_sources(group, source, styles))
    }

    /// Scaled derivatives of `source`, ascending by width.
    pub fn by_scale(
        &self,
        source: &str,
        styles: &StylesConfig,
    ) -> Result<Vec<StyledSource>, StyleError> {
        if self.scale.is_empty() {
            return Err(StyleError::NoScaleStyles);
        }
        Ok(styled_sources(&self.scale, source, styles))
    }
}

fn styled_sources(group: &[StyleEntry], source: &str, styles: &StylesConfig) -> Vec<StyledSource> {
    group
        .iter()
        .map(|style| {
            let url = style_url(&styles.url_pattern, &style.name, source);
            StyledSource {
                url: derivative_url(&url, source, styles.derivative),
                width: style.width,
                height: style.height,
            }
        })
        .collect()
}

/// Fill `{style}` and `{path}` in a URL pattern. The source's leading slash
/// is dropped so patterns read naturally.
pub fn style_url(pattern: &str, style: &str, source: &str) -> String {
    pattern
        .replace("{style}", style)
        .replace("{path}", source.trim_start_matches('/'))
}

/// Rewrite `url` to point at an alternate encoding of `source`.
pub fn derivative_url(url: &str, source: &str, derivative: Derivative) -> String {
    let Some(alt) = derivative.extension() else {
        return url.to_string();
    };
    if is_external(source) {
        return url.to_string();
    }
    let Some(ext) = extension(source) else {
        return url.to_string();
    };
    let original = format!(".{ext}");
    match url.rfind(&original) {
        Some(pos) => {
            let end = pos + original.len();
            format!("{}.{alt}{}", &url[..end], &url[end..])
        }
        None => url.to_string(),
    }
}

fn is_external(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://") || source.starts_with("//")
}

fn extension(source: &str) -> Option<&str> {
    let file = source.rsplit('/').next().unwrap_or(source);
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// The candidate list for a set of derivatives.
pub fn source_set(sources: &[StyledSource]) -> Result<SourceSet, CandidateError> {
    SourceSet::new(sources.iter().map(ImageCandidate::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &[
        "responsive_16_9_1280w",
        "responsive_16_9_320w",
        "responsive_16_9_640w",
        "responsive_1_1_400w",
        "responsive_1500w",
        "responsive_500w",
        "thumbnail",
    ];

    fn styles(derivative: Derivative) -> StylesConfig {
        StylesConfig {
            derivative,
            ..StylesConfig::default()
        }
    }

    #[test]
    fn catalog_groups_and_sorts() {
        let catalog = StyleCatalog::from_names(NAMES);
        assert_eq!(
            catalog.aspect_ratios(),
            vec![AspectRatio::new(1, 1), AspectRatio::new(16, 9)]
        );
        let sources = catalog
            .by_aspect_ratio("/photos/a.jpg", AspectRatio::new(16, 9), &StylesConfig::default())
            .unwrap();
        let widths: Vec<u32> = sources.iter().map(|s| s.width).collect();
        assert_eq!(widths, vec![320, 640, 1280]);
        assert_eq!(sources[0].height, Some(180));
        assert_eq!(
            sources[0].url,
            "/styles/responsive_16_9_320w/public/photos/a.jpg"
        );
    }

    #[test]
    fn scale_group_has_no_heights() {
        let catalog = StyleCatalog::from_names(NAMES);
        let sources = catalog.by_scale("a.jpg", &StylesConfig::default()).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].width, 500);
        assert!(sources.iter().all(|s| s.height.is_none()));
    }

    #[test]
    fn unknown_ratio_is_an_error() {
        let catalog = StyleCatalog::from_names(NAMES);
        let err = catalog
            .by_aspect_ratio("a.jpg", AspectRatio::new(4, 3), &StylesConfig::default())
            .unwrap_err();
        assert_eq!(err, StyleError::UnknownRatio(AspectRatio::new(4, 3)));
    }

    #[test]
    fn missing_scale_styles_is_an_error() {
        let catalog = StyleCatalog::from_names(["responsive_1_1_100w"]);
        assert_eq!(
            catalog.by_scale("a.jpg", &StylesConfig::default()),
            Err(StyleError::NoScaleStyles)
        );
    }

    #[test]
    fn empty_catalog() {
        assert!(StyleCatalog::from_names(["large", "medium"]).is_empty());
    }

    #[test]
    fn source_set_uses_wire_format() {
        let catalog = StyleCatalog::from_names(["responsive_500w", "responsive_1000w"]);
        let sources = catalog.by_scale("/a.png", &StylesConfig::default()).unwrap();
        let set = source_set(&sources).unwrap();
        assert_eq!(
            set.to_string(),
            "/styles/responsive_500w/public/a.png 500w, /styles/responsive_1000w/public/a.png 1000w"
        );
    }

    #[test]
    fn webp_derivative_appends_extension() {
        let url = "/styles/responsive_500w/public/a.jpg?itok=xyz";
        assert_eq!(
            derivative_url(url, "/a.jpg", Derivative::Webp),
            "/styles/responsive_500w/public/a.jpg.webp?itok=xyz"
        );
    }

    #[test]
    fn avif_derivative_uses_last_occurrence() {
        let url = "/styles/a.jpg/public/a.jpg";
        assert_eq!(
            derivative_url(url, "a.jpg", Derivative::Avif),
            "/styles/a.jpg/public/a.jpg.avif"
        );
    }

    #[test]
    fn external_and_extensionless_sources_are_untouched() {
        let url = "/styles/s/public/x";
        assert_eq!(derivative_url(url, "https://cdn.example/x.jpg", Derivative::Webp), url);
        assert_eq!(derivative_url(url, "/images/x", Derivative::Webp), url);
        assert_eq!(derivative_url(url, "/images/.hidden", Derivative::Webp), url);
    }

    #[test]
    fn none_derivative_is_identity() {
        assert_eq!(derivative_url("/a.jpg", "/a.jpg", Derivative::None), "/a.jpg");
    }

    #[test]
    fn catalog_applies_configured_derivative() {
        let catalog = StyleCatalog::from_names(["responsive_500w"]);
        let sources = catalog.by_scale("/a.jpg", &styles(Derivative::Avif)).unwrap();
        assert_eq!(sources[0].url, "/styles/responsive_500w/public/a.jpg.avif");
    }
}
