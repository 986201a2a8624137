//! CLI output formatting for every command.
//!
//! # Element-First Display
//!
//! Output is organised around elements, not around the order things were
//! computed in. Each element leads with its label (the `id` attribute, or
//! `tag#index`); what happened to it follows as indented context lines.
//!
//! # Output Format
//!
//! ## Select
//!
//! ```text
//! Available 500x300 at 2x
//!     Target: 1000px wide
//! Apply /c.jpg (1280w)
//!     Display: 500x281
//! ```
//!
//! ## Coverage
//!
//! ```text
//! 320px
//!     1x   /a.jpg (320w)
//!     2x   /b.jpg (640w)
//!     3x   /b.jpg (640w)  capped at 2x
//! 1000px
//!     2x   /c.jpg (1280w)  upscaled to 64%
//! ```
//!
//! ## Simulate
//!
//! ```text
//! Scene gallery
//!     Events
//!         hero: attached
//!         hero: apply /b.jpg (500xauto)
//!         hero: deferred
//!         hero: loaded /b.jpg (500x375)
//!     Images
//!         hero: loaded /b.jpg 500x375, 1 request
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::candidate::SourceSet;
use crate::resolver::ResolverEvent;
use crate::selection::{CoverageRow, Decision, SelectionRequest, available_box};
use crate::simulate::{ImageReport, SceneReport};
use crate::state::Status;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn box_text(width: u32, height: Option<u32>) -> String {
    match height {
        Some(h) => format!("{}x{}", width, h),
        None => format!("{}xauto", width),
    }
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Idle => "idle",
        Status::Updating => "loading",
        Status::Loaded => "loaded",
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// ============================================================================
// select
// ============================================================================

/// Format one selector run: the measured box, then the decision.
pub fn format_decision(request: &SelectionRequest<'_>, decision: &Decision) -> Vec<String> {
    let available = available_box(request.own, request.parent);
    let mut lines = vec![
        format!("Available {} at {}x", available, request.density),
        format!(
            "{}Target: {}px wide",
            indent(1),
            (available.width as f64 * request.density).ceil()
        ),
    ];
    match decision {
        Decision::AlreadySufficient => {
            lines.push("Already sufficient".to_string());
            if let (Some(current), Some(declared)) = (request.current, request.declared) {
                lines.push(format!("{}Current: {} ({})", indent(1), current, declared));
            }
        }
        Decision::Unchanged { path } => {
            lines.push(format!("Unchanged {}", path));
        }
        Decision::Apply(selection) => {
            lines.push(format!(
                "Apply {} ({}w)",
                selection.candidate.path, selection.candidate.width
            ));
            lines.push(format!(
                "{}Display: {}",
                indent(1),
                box_text(selection.width, selection.height)
            ));
        }
    }
    lines
}

pub fn print_decision(request: &SelectionRequest<'_>, decision: &Decision) {
    for line in format_decision(request, decision) {
        println!("{}", line);
    }
}

// ============================================================================
// coverage
// ============================================================================

/// Format a coverage grid, one header per layout width.
pub fn format_coverage(rows: &[CoverageRow]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_width = None;
    for row in rows {
        if current_width != Some(row.width) {
            current_width = Some(row.width);
            lines.push(format!("{}px", row.width));
        }
        let dpr = format!("{}x", row.dpr);
        let mut line = format!(
            "{}{:<5}{} ({}w)",
            indent(1),
            dpr,
            row.candidate.path,
            row.candidate.width
        );
        if row.density != row.dpr {
            line.push_str(&format!("  capped at {}x", row.density));
        }
        if row.fill < 1.0 {
            line.push_str(&format!("  upscaled to {:.0}%", row.fill * 100.0));
        }
        lines.push(line);
    }
    lines
}

pub fn print_coverage(rows: &[CoverageRow]) {
    for line in format_coverage(rows) {
        println!("{}", line);
    }
}

// ============================================================================
// simulate
// ============================================================================

/// One-line description of a resolver event.
pub fn format_event(event: &ResolverEvent<String>) -> String {
    let node = event.node();
    match event {
        ResolverEvent::Attached { lazy: true, .. } => format!("{}: attached (lazy)", node),
        ResolverEvent::Attached { lazy: false, .. } => format!("{}: attached", node),
        ResolverEvent::Visible { .. } => format!("{}: visible", node),
        ResolverEvent::Deferred { .. } => format!("{}: deferred", node),
        ResolverEvent::Skipped { reason, .. } => format!("{}: skipped: {}", node, reason),
        ResolverEvent::AlreadySufficient { .. } => format!("{}: already sufficient", node),
        ResolverEvent::Unchanged { path, .. } => format!("{}: unchanged {}", node, path),
        ResolverEvent::Applied {
            path,
            width,
            height,
            ..
        } => format!("{}: apply {} ({})", node, path, box_text(*width, *height)),
        ResolverEvent::Loaded {
            path, corrected, ..
        } => match corrected {
            Some(d) => format!("{}: loaded {} ({})", node, path, d),
            None => format!("{}: loaded {}", node, path),
        },
        ResolverEvent::LoadFailed { path, released, .. } => {
            let what = path.as_deref().unwrap_or("(no src)");
            let outcome = if *released { "released" } else { "stalled" };
            format!("{}: failed {}, {}", node, what, outcome)
        }
    }
}

fn image_line(image: &ImageReport) -> String {
    let mut line = format!("{}: {}", image.label, status_label(image.status));
    if let Some(src) = &image.src {
        line.push(' ');
        line.push_str(src);
    }
    if let Some(width) = &image.width {
        let height = image.height.as_deref().unwrap_or("auto");
        line.push_str(&format!(" {}x{}", width, height));
    }
    line.push_str(&format!(", {}", plural(image.requests, "request")));
    if image.pending {
        line.push_str(", update pending");
    }
    line
}

/// Format a finished scene: the event trace, then the final element states.
pub fn format_scene_report(report: &SceneReport) -> Vec<String> {
    let mut lines = vec![format!("Scene {}", report.name)];
    lines.push(format!("{}Events", indent(1)));
    for event in &report.events {
        lines.push(format!("{}{}", indent(2), format_event(event)));
    }
    lines.push(format!("{}Images", indent(1)));
    if report.images.is_empty() {
        lines.push(format!("{}(none)", indent(2)));
    }
    for image in &report.images {
        lines.push(format!("{}{}", indent(2), image_line(image)));
    }
    lines
}

pub fn print_scene_report(report: &SceneReport) {
    for line in format_scene_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// srcset
// ============================================================================

/// Format a generated source list and its `<img>` markup.
pub fn format_srcset(set: &SourceSet, markup: &str) -> Vec<String> {
    let mut lines = vec!["Sources".to_string()];
    for candidate in set {
        lines.push(format!("{}{}", indent(1), candidate));
    }
    lines.push(String::new());
    lines.push("Markup".to_string());
    lines.push(format!("{}{}", indent(1), markup));
    lines
}

pub fn print_srcset(set: &SourceSet, markup: &str) {
    for line in format_srcset(set, markup) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::ImageCandidate;
    use crate::selection::{Selection, select};
    use crate::types::Dimensions;

    fn list() -> SourceSet {
        "/a.jpg 320w, /b.jpg 640w, /c.jpg 1280w".parse().unwrap()
    }

    fn request(sources: &SourceSet) -> SelectionRequest<'_> {
        SelectionRequest {
            sources,
            current: None,
            own: Dimensions::default(),
            parent: Dimensions::new(500, 300),
            density: 2.0,
            cover: false,
            ratio: None,
            declared: None,
        }
    }

    #[test]
    fn decision_apply() {
        let sources = list();
        let req = request(&sources);
        let lines = format_decision(&req, &select(&req));
        assert_eq!(
            lines,
            vec![
                "Available 500x300 at 2x",
                "    Target: 1000px wide",
                "Apply /c.jpg (1280w)",
                "    Display: 500xauto",
            ]
        );
    }

    #[test]
    fn decision_unchanged() {
        let sources = list();
        let req = request(&sources);
        let lines = format_decision(
            &req,
            &Decision::Unchanged {
                path: "/c.jpg".into(),
            },
        );
        assert_eq!(lines[2], "Unchanged /c.jpg");
    }

    #[test]
    fn decision_already_sufficient_shows_current() {
        let sources = list();
        let mut req = request(&sources);
        req.current = Some("/c.jpg");
        req.declared = Some(Dimensions::new(1280, 720));
        let lines = format_decision(&req, &Decision::AlreadySufficient);
        assert_eq!(lines[2], "Already sufficient");
        assert_eq!(lines[3], "    Current: /c.jpg (1280x720)");
    }

    #[test]
    fn decision_with_height() {
        let sources = list();
        let req = request(&sources);
        let decision = Decision::Apply(Selection {
            candidate: ImageCandidate::new("/b.jpg", 640),
            width: 500,
            height: Some(281),
        });
        assert_eq!(format_decision(&req, &decision)[3], "    Display: 500x281");
    }

    #[test]
    fn coverage_groups_by_width() {
        let rows = vec![
            CoverageRow {
                width: 320,
                dpr: 1.0,
                density: 1.0,
                candidate: ImageCandidate::new("/a.jpg", 320),
                fill: 1.0,
            },
            CoverageRow {
                width: 320,
                dpr: 1.5,
                density: 1.5,
                candidate: ImageCandidate::new("/b.jpg", 640),
                fill: 1.33,
            },
            CoverageRow {
                width: 320,
                dpr: 3.0,
                density: 2.0,
                candidate: ImageCandidate::new("/b.jpg", 640),
                fill: 1.0,
            },
            CoverageRow {
                width: 1000,
                dpr: 2.0,
                density: 2.0,
                candidate: ImageCandidate::new("/c.jpg", 1280),
                fill: 0.64,
            },
        ];
        assert_eq!(
            format_coverage(&rows),
            vec![
                "320px",
                "    1x   /a.jpg (320w)",
                "    1.5x /b.jpg (640w)",
                "    3x   /b.jpg (640w)  capped at 2x",
                "1000px",
                "    2x   /c.jpg (1280w)  upscaled to 64%",
            ]
        );
    }

    #[test]
    fn event_lines() {
        let hero = || "hero".to_string();
        assert_eq!(
            format_event(&ResolverEvent::Attached {
                node: hero(),
                lazy: true
            }),
            "hero: attached (lazy)"
        );
        assert_eq!(
            format_event(&ResolverEvent::Applied {
                node: hero(),
                path: "/b.jpg".into(),
                width: 500,
                height: None
            }),
            "hero: apply /b.jpg (500xauto)"
        );
        assert_eq!(
            format_event(&ResolverEvent::Loaded {
                node: hero(),
                path: "/b.jpg".into(),
                corrected: Some(Dimensions::new(500, 375))
            }),
            "hero: loaded /b.jpg (500x375)"
        );
        assert_eq!(
            format_event(&ResolverEvent::LoadFailed {
                node: hero(),
                path: None,
                released: false
            }),
            "hero: failed (no src), stalled"
        );
        assert_eq!(
            format_event(&ResolverEvent::Skipped {
                node: hero(),
                reason: "bad".into()
            }),
            "hero: skipped: bad"
        );
    }

    #[test]
    fn scene_report_lists_events_then_images() {
        let report = SceneReport {
            name: "gallery".into(),
            events: vec![ResolverEvent::Deferred {
                node: "hero".to_string(),
            }],
            images: vec![
                ImageReport {
                    label: "hero".into(),
                    src: Some("/b.jpg".into()),
                    width: Some("500".into()),
                    height: Some("375".into()),
                    status: Status::Loaded,
                    pending: false,
                    requests: 1,
                },
                ImageReport {
                    label: "img#4".into(),
                    src: None,
                    width: None,
                    height: None,
                    status: Status::Idle,
                    pending: false,
                    requests: 0,
                },
            ],
        };
        assert_eq!(
            format_scene_report(&report),
            vec![
                "Scene gallery",
                "    Events",
                "        hero: deferred",
                "    Images",
                "        hero: loaded /b.jpg 500x375, 1 request",
                "        img#4: idle, 0 requests",
            ]
        );
    }

    #[test]
    fn pending_update_is_shown() {
        let image = ImageReport {
            label: "pic".into(),
            src: Some("/b.jpg".into()),
            width: Some("500".into()),
            height: None,
            status: Status::Updating,
            pending: true,
            requests: 1,
        };
        assert_eq!(
            image_line(&image),
            "pic: loading /b.jpg 500xauto, 1 request, update pending"
        );
    }

    #[test]
    fn srcset_sections() {
        let set: SourceSet = "/a.jpg 320w, /b.jpg 640w".parse().unwrap();
        let lines = format_srcset(&set, "<img>");
        assert_eq!(
            lines,
            vec!["Sources", "    /a.jpg 320w", "    /b.jpg 640w", "", "Markup", "    <img>"]
        );
    }
}
