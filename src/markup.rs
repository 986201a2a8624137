//! `<img>` markup for the resolver to pick up.
//!
//! The server side only has to get the placeholder box right: `width` and
//! `height` are set from the smallest candidate so the browser reserves the
//! correct proportions before the resolver has measured anything.
//!
//! | Handling | Placeholder height | Extra attributes |
//! |---|---|---|
//! | Aspect ratio | `floor(w × rh / rw)` | `data-ratio="rw:rh"` |
//! | Scale | `floor(w × oh / ow)` from the original size | none |

use crate::candidate::SourceSet;
use crate::srcset::StyledSource;
use crate::types::{AspectRatio, Dimensions};
use maud::{Markup, html};

/// How the derivatives relate to the original image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handling {
    /// Cropped to a fixed ratio.
    AspectRatio(AspectRatio),
    /// Scaled; the original size gives the proportions.
    Scale { original: Option<Dimensions> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImgOptions {
    pub alt: String,
    pub handling: Handling,
    /// Density multiplier token, e.g. `"2x"`.
    pub multiplier: Option<String>,
    pub cover: bool,
    pub lazy: bool,
}

/// Placeholder box for the first (smallest) derivative.
pub fn placeholder_box(first: &StyledSource, handling: Handling) -> Option<Dimensions> {
    let width = first.width;
    let height = match handling {
        Handling::AspectRatio(ratio) => ratio.height_for(width as f64).floor() as u32,
        Handling::Scale {
            original: Some(original),
        } if original.is_positive() => {
            (width as f64 * original.height as f64 / original.width as f64).floor() as u32
        }
        Handling::Scale { .. } => return None,
    };
    Some(Dimensions::new(width, height))
}

/// Render the `<img>` element for a list of derivatives.
///
/// Returns `None` when `sources` is empty.
pub fn render_img(sources: &[StyledSource], options: &ImgOptions) -> Option<Markup> {
    let first = sources.first()?;
    let set = crate::srcset::source_set(sources).ok()?;
    let placeholder = placeholder_box(first, options.handling);
    let ratio = match options.handling {
        Handling::AspectRatio(ratio) => Some(ratio.to_string()),
        Handling::Scale { .. } => None,
    };
    Some(img_element(
        &set,
        (!options.lazy).then_some(first.url.as_str()),
        placeholder,
        ratio.as_deref(),
        options,
    ))
}

fn img_element(
    set: &SourceSet,
    src: Option<&str>,
    placeholder: Option<Dimensions>,
    ratio: Option<&str>,
    options: &ImgOptions,
) -> Markup {
    let srcset = set.to_string();
    html! {
        img
            src=[src]
            data-srcset=(srcset)
            width=[placeholder.map(|d| d.width)]
            height=[placeholder.map(|d| d.height)]
            data-ratio=[ratio]
            data-multiplier=[options.multiplier.as_deref()]
            data-cover=[options.cover.then_some("1")]
            loading=[options.lazy.then_some("lazy")]
            alt=(options.alt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> Vec<StyledSource> {
        vec![
            StyledSource {
                url: "/s/320/a.jpg".into(),
                width: 320,
                height: Some(180),
            },
            StyledSource {
                url: "/s/640/a.jpg".into(),
                width: 640,
                height: Some(360),
            },
        ]
    }

    fn options(handling: Handling) -> ImgOptions {
        ImgOptions {
            alt: "Harbour at dusk".into(),
            handling,
            multiplier: None,
            cover: false,
            lazy: false,
        }
    }

    #[test]
    fn ratio_placeholder_is_floored() {
        let first = &sources()[0];
        // 320 * 9 / 16 = 180
        assert_eq!(
            placeholder_box(first, Handling::AspectRatio(AspectRatio::new(16, 9))),
            Some(Dimensions::new(320, 180))
        );
        // 320 * 2 / 3 = 213.33
        assert_eq!(
            placeholder_box(first, Handling::AspectRatio(AspectRatio::new(3, 2))),
            Some(Dimensions::new(320, 213))
        );
    }

    #[test]
    fn scale_placeholder_uses_original_proportions() {
        let first = &sources()[0];
        let handling = Handling::Scale {
            original: Some(Dimensions::new(4000, 3000)),
        };
        assert_eq!(placeholder_box(first, handling), Some(Dimensions::new(320, 240)));
        assert_eq!(placeholder_box(first, Handling::Scale { original: None }), None);
    }

    #[test]
    fn renders_eager_ratio_image() {
        let html = render_img(
            &sources(),
            &options(Handling::AspectRatio(AspectRatio::new(16, 9))),
        )
        .unwrap()
        .into_string();
        assert!(html.starts_with("<img"));
        assert!(html.contains(r#"src="/s/320/a.jpg""#));
        assert!(html.contains(r#"data-srcset="/s/320/a.jpg 320w, /s/640/a.jpg 640w""#));
        assert!(html.contains(r#"width="320""#));
        assert!(html.contains(r#"height="180""#));
        assert!(html.contains(r#"data-ratio="16:9""#));
        assert!(html.contains(r#"alt="Harbour at dusk""#));
        assert!(!html.contains("loading="));
        assert!(!html.contains("data-cover"));
    }

    #[test]
    fn lazy_image_has_no_src() {
        let mut opts = options(Handling::Scale { original: None });
        opts.lazy = true;
        opts.cover = true;
        opts.multiplier = Some("2x".into());
        let html = render_img(&sources(), &opts).unwrap().into_string();
        assert!(!html.contains(" src="));
        assert!(html.contains(r#"loading="lazy""#));
        assert!(html.contains(r#"data-cover="1""#));
        assert!(html.contains(r#"data-multiplier="2x""#));
        assert!(!html.contains("height="));
    }

    #[test]
    fn empty_sources_render_nothing() {
        assert!(render_img(&[], &options(Handling::Scale { original: None })).is_none());
    }
}
