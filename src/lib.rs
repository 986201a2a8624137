//! # srcset-resolver
//!
//! Responsive image source selection and lazy loading. Images declare a
//! list of candidates of increasing width; the resolver measures the box
//! each image has to fill and points it at the smallest candidate that
//! covers that box at the device's pixel density.
//!
//! # Architecture: Pure Selection, Stateful Orchestration
//!
//! ```text
//! host (DOM)  ──attributes, boxes──▶  ElementSnapshot ─▶ SelectionRequest
//!      ▲                                                        │
//!      │                                               selection::select
//!      │                                                        ▼
//!      └──── src / width / height ◀──── Resolver ◀──────── Decision
//! ```
//!
//! The selector is a pure function from measurements to a [`selection::Decision`].
//! Everything that depends on time (which element is mid-load, which
//! containers are observed, which lazy images have been seen) lives in the
//! [`resolver::Resolver`] and its per-element [`state::ElementState`]. The
//! document itself is behind the [`host::Host`] trait, so the same resolver
//! drives a browser binding or the in-memory [`host::MemoryDocument`] used by
//! the tests and the `simulate` command.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Geometry shared by every module (`Dimensions`, `BoxSize`, `AspectRatio`) |
//! | [`candidate`] | The `"path 640w, ..."` candidate list and its parser |
//! | [`element`] | Reads one element's attributes into an `ElementSnapshot` |
//! | [`selection`] | Pure candidate selection, plus the coverage report |
//! | [`state`] | Per-element status, pending flag and applied source |
//! | [`resolver`] | Attach, update, and the load/intersection/resize handlers |
//! | [`host`] | The `Host` trait and the in-memory document |
//! | [`visibility`] | Viewport geometry for the lazy trigger |
//! | [`naming`] | `responsive_16_9_640w` style-name parser |
//! | [`srcset`] | Candidate lists from style names, with webp/avif derivatives |
//! | [`markup`] | Server-side `<img>` markup rendered with Maud |
//! | [`simulate`] | JSON scenes replayed through the in-memory document |
//! | [`config`] | `srcset-resolver.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## No Polling
//!
//! An update that arrives while an element's image is still loading sets a
//! single pending flag on the element. The load (or failure) handler runs
//! the update again once. Any number of triggers during one load collapse
//! into that one re-run, and none are lost.
//!
//! ## Width First, Then Height
//!
//! Candidates are compared by width against `available width × density`.
//! Height only matters in cover mode, where a candidate must also be tall
//! enough once cropped to the container's proportions. When nothing is large
//! enough the last (largest) candidate is used.
//!
//! ## Typed Failures
//!
//! A malformed candidate list is a [`candidate::CandidateError`], not a
//! silently zero-width candidate. The resolver logs it, reports the element
//! as skipped, and leaves the element untouched.

pub mod candidate;
pub mod config;
pub mod element;
pub mod host;
pub mod markup;
pub mod naming;
pub mod output;
pub mod resolver;
pub mod selection;
pub mod simulate;
pub mod srcset;
pub mod state;
pub mod types;
pub mod visibility;

#[cfg(test)]
pub(crate) mod test_helpers;
