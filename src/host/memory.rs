//! In-memory element tree implementing [`Host`].
//!
//! Boxes are fixed by whoever builds the document (nothing is laid out), and
//! every attribute write made through the [`Host`] trait is appended to a
//! mutation log so tests can assert exactly what the resolver touched.
//! Setup writes go through [`MemoryDocument::seed_attribute`] and are not
//! logged.
//!
//! Notifications are queued rather than delivered: the driver drains
//! [`MemoryDocument::take_resize_notifications`] and
//! [`MemoryDocument::take_intersections`] and forwards them to the resolver.
//! Like a browser observer, registering a resize observation queues one
//! initial notification.

use super::{Host, attr};
use crate::types::BoxSize;
use crate::visibility::{self, Viewport};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Index of a node inside a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One attribute write performed through the [`Host`] trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Set {
        node: NodeId,
        name: String,
        value: String,
    },
    Removed {
        node: NodeId,
        name: String,
    },
}

#[derive(Debug)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    size: BoxSize,
    /// Document-space offset of the top edge.
    top: f64,
}

#[derive(Debug)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    device_pixel_ratio: f64,
    viewport: Viewport,
    intersection_margins: BTreeMap<NodeId, u32>,
    resize_observed: BTreeSet<NodeId>,
    resize_queue: Vec<NodeId>,
    mutations: Vec<Mutation>,
}

impl MemoryDocument {
    /// A document holding a single `body` root node.
    pub fn new(device_pixel_ratio: f64) -> Self {
        Self {
            nodes: vec![Node {
                tag: "body".to_string(),
                attributes: BTreeMap::new(),
                parent: None,
                children: Vec::new(),
                size: BoxSize::default(),
                top: 0.0,
            }],
            device_pixel_ratio,
            viewport: Viewport::default(),
            intersection_margins: BTreeMap::new(),
            resize_observed: BTreeSet::new(),
            resize_queue: Vec::new(),
            mutations: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a child element and return its id.
    pub fn append(&mut self, parent: NodeId, tag: &str, size: BoxSize) -> NodeId {
        let id = NodeId(self.nodes.len());
        let top = self.nodes[parent.0].top;
        self.nodes.push(Node {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            parent: Some(parent),
            children: Vec::new(),
            size,
            top,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Set an attribute without recording a mutation.
    pub fn seed_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn set_top(&mut self, node: NodeId, top: f64) {
        self.nodes[node.0].top = top;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.viewport.scroll = y;
    }

    /// Change a node's rendered box. Queues a notification when the node is
    /// under resize observation and the box actually changed.
    pub fn resize(&mut self, node: NodeId, size: BoxSize) {
        let changed = self.nodes[node.0].size != size;
        self.nodes[node.0].size = size;
        if changed && self.resize_observed.contains(&node) {
            self.resize_queue.push(node);
        }
    }

    /// Drain queued resize notifications, oldest first, without duplicates.
    pub fn take_resize_notifications(&mut self) -> Vec<NodeId> {
        let mut seen = BTreeSet::new();
        std::mem::take(&mut self.resize_queue)
            .into_iter()
            .filter(|node| seen.insert(*node))
            .collect()
    }

    /// Observed nodes currently within their margin of the viewport.
    pub fn take_intersections(&self) -> Vec<NodeId> {
        self.intersection_margins
            .iter()
            .filter(|(node, margin)| {
                let n = &self.nodes[node.0];
                visibility::intersects(n.top, n.size.height, &self.viewport, **margin)
            })
            .map(|(node, _)| *node)
            .collect()
    }

    pub fn is_intersection_observed(&self, node: NodeId) -> bool {
        self.intersection_margins.contains_key(&node)
    }

    pub fn is_resize_observed(&self, node: NodeId) -> bool {
        self.resize_observed.contains(&node)
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn clear_mutations(&mut self) {
        self.mutations.clear();
    }

    /// Every `src` the resolver assigned, in order: the image requests a
    /// browser would have issued.
    pub fn requests(&self) -> Vec<&str> {
        self.mutations
            .iter()
            .filter_map(|m| match m {
                Mutation::Set { name, value, .. } if name == attr::SRC => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn requests_for(&self, node: NodeId) -> usize {
        self.mutations
            .iter()
            .filter(|m| matches!(m, Mutation::Set { node: n, name, .. } if *n == node && name == attr::SRC))
            .count()
    }

    pub fn get(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attributes.get(name).map(String::as_str)
    }

    /// First node whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.attributes.get("id").is_some_and(|v| v == id))
            .map(NodeId)
    }

    /// Human-readable name: the `id` attribute, or `tag#index`.
    pub fn label(&self, node: NodeId) -> String {
        let n = &self.nodes[node.0];
        match n.attributes.get("id") {
            Some(id) => id.clone(),
            None => format!("{}{}", n.tag, node),
        }
    }

    fn descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node.0].children {
            out.push(*child);
            self.descendants(*child, out);
        }
    }
}

impl Host for MemoryDocument {
    type Node = NodeId;

    fn images_within(&self, context: NodeId) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.descendants(context, &mut all);
        all.retain(|n| self.nodes[n.0].attributes.contains_key(attr::SRCSET));
        all
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.get(node, name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.seed_attribute(node, name, value);
        self.mutations.push(Mutation::Set {
            node,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if self.nodes[node.0].attributes.remove(name).is_some() {
            self.mutations.push(Mutation::Removed {
                node,
                name: name.to_string(),
            });
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn client_box(&self, node: NodeId) -> BoxSize {
        self.nodes[node.0].size
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn observe_intersection(&mut self, node: NodeId, margin: u32) {
        self.intersection_margins.insert(node, margin);
    }

    fn unobserve_intersection(&mut self, node: NodeId) {
        self.intersection_margins.remove(&node);
    }

    fn observe_resize(&mut self, container: NodeId) {
        if self.resize_observed.insert(container) {
            self.resize_queue.push(container);
        }
    }

    /// Also drops notifications already queued for `container`.
    fn unobserve_resize(&mut self, container: NodeId) {
        if self.resize_observed.remove(&container) {
            self.resize_queue.retain(|node| *node != container);
        }
    }
}
