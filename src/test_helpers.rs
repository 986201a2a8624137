//! Shared test utilities for the srcset-resolver test suite.
//!
//! Builders for small in-memory documents and a resolver with stock
//! settings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let (mut doc, container, img) = single_image(LIST, BoxSize::new(500.0, 300.0));
//! let mut resolver = resolver();
//! let root = doc.root();
//! resolver.attach(&mut doc, root);
//! assert_eq!(doc.get(img, attr::SRC), Some("/b.jpg"));
//! ```

use crate::config::ResolverConfig;
use crate::host::{MemoryDocument, NodeId, attr};
use crate::resolver::Resolver;
use crate::types::BoxSize;

/// Resolver with stock settings.
pub fn resolver() -> Resolver<NodeId> {
    Resolver::new(ResolverConfig::default())
}

/// Append an unloaded (zero-size) image carrying `srcset` under `parent`.
pub fn managed_image(doc: &mut MemoryDocument, parent: NodeId, srcset: &str) -> NodeId {
    let img = doc.append(parent, "img", BoxSize::default());
    doc.seed_attribute(img, attr::SRCSET, srcset);
    img
}

/// Document with one container of `container_box` holding one image.
///
/// Returns `(document, container, image)`.
pub fn single_image(srcset: &str, container_box: BoxSize) -> (MemoryDocument, NodeId, NodeId) {
    let mut doc = MemoryDocument::new(1.0);
    let container = doc.append(doc.root(), "div", container_box);
    let img = managed_image(&mut doc, container, srcset);
    (doc, container, img)
}
