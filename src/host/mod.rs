//! The seam between the resolver and whatever owns the elements.
//!
//! A [`Host`] plays the role of the DOM: it stores attributes, measures
//! rendered boxes, and delivers visibility and resize notifications. The
//! resolver never holds on to host data between calls; every decision is
//! made from a fresh read.
//!
//! Notifications flow the other way. A host that registered an element via
//! [`Host::observe_intersection`] calls
//! [`Resolver::handle_intersection`](crate::resolver::Resolver::handle_intersection)
//! when it comes near the viewport, and so on for resize, load and error
//! events.
//!
//! The in-memory implementation is [`MemoryDocument`], used by the
//! simulator and the test suite.

pub mod memory;

pub use memory::{MemoryDocument, Mutation, NodeId};

use crate::types::BoxSize;
use std::fmt::Debug;
use std::hash::Hash;

/// Attribute names read and written on managed elements.
pub mod attr {
    /// Serialized candidate list. Elements without it are never managed.
    pub const SRCSET: &str = "data-srcset";
    pub const SRC: &str = "src";
    pub const MULTIPLIER: &str = "data-multiplier";
    /// Presence-only flag.
    pub const COVER: &str = "data-cover";
    pub const RATIO: &str = "data-ratio";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    /// `loading="lazy"` doubles as the lazy-mode signal.
    pub const LOADING: &str = "loading";
    /// Output marker set once the applied image is final.
    pub const LOADED: &str = "data-loaded";
}

/// Operations the resolver needs from the element tree.
pub trait Host {
    /// Element identity. Cheap to copy, stable for the element's lifetime.
    type Node: Copy + Eq + Hash + Debug;

    /// Descendants of `context` carrying a source list, in document order.
    fn images_within(&self, context: Self::Node) -> Vec<Self::Node>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    fn has_attribute(&self, node: Self::Node, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// Set an attribute. Setting `src` starts a load; its outcome comes back
    /// through the resolver's load and error handlers.
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    fn remove_attribute(&mut self, node: Self::Node, name: &str);

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Rendered client box of an element.
    fn client_box(&self, node: Self::Node) -> BoxSize;

    fn device_pixel_ratio(&self) -> f64;

    /// Start reporting when `node` comes within `margin` px of the viewport.
    fn observe_intersection(&mut self, node: Self::Node, margin: u32);

    fn unobserve_intersection(&mut self, node: Self::Node);

    /// Start reporting size changes of `container`.
    fn observe_resize(&mut self, container: Self::Node);

    fn unobserve_resize(&mut self, container: Self::Node);
}
