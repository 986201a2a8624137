//! Scene simulation: drive the resolver against an in-memory document.
//!
//! A scene is a JSON file describing an element tree, a viewport, and a
//! sequence of host events. Running it attaches the resolver to the root,
//! delivers every queued notification until the document is quiet, then
//! replays the events one by one, settling after each.
//!
//! ```json
//! {
//!   "name": "gallery",
//!   "device_pixel_ratio": 2.0,
//!   "viewport": { "width": 1280, "height": 800 },
//!   "root": {
//!     "children": [
//!       { "id": "grid", "width": 640, "height": 480, "children": [
//!         { "id": "hero", "tag": "img",
//!           "attributes": { "data-srcset": "/a.jpg 320w, /b.jpg 1280w" } }
//!       ] }
//!     ]
//!   },
//!   "events": [
//!     { "type": "load", "id": "hero", "width": 1280, "height": 960 },
//!     { "type": "resize", "id": "grid", "width": 320, "height": 240 }
//!   ]
//! }
//! ```

use crate::config::ResolverConfig;
use crate::host::{MemoryDocument, NodeId};
use crate::resolver::{Resolver, ResolverEvent};
use crate::state::Status;
use crate::types::{BoxSize, Dimensions};
use crate::visibility::Viewport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Upper bound on notification rounds per settle, guarding against a host
/// that keeps re-queuing.
const MAX_SETTLE_ROUNDS: usize = 64;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("scene refers to unknown element id {0:?}")]
    UnknownId(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_ratio")]
    pub device_pixel_ratio: f64,
    #[serde(default)]
    pub viewport: Viewport,
    pub root: SceneNode,
    #[serde(default)]
    pub events: Vec<SceneEvent>,
}

fn default_ratio() -> f64 {
    1.0
}

fn default_tag() -> String {
    "div".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Document-space top edge. Children default to their parent's.
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

/// A host event replayed against the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneEvent {
    Resize { id: String, width: f64, height: f64 },
    Scroll { y: f64 },
    /// Applied source finished loading with this natural size.
    Load { id: String, width: u32, height: u32 },
    Error { id: String },
    /// Another attach pass, over the root or the given subtree.
    Attach {
        #[serde(default)]
        id: Option<String>,
    },
    /// Direct update call.
    Update { id: String },
}

/// Final state of one managed image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageReport {
    pub label: String,
    pub src: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub status: Status,
    pub pending: bool,
    /// Number of `src` assignments made.
    pub requests: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneReport {
    pub name: String,
    #[serde(skip)]
    pub events: Vec<ResolverEvent<String>>,
    pub images: Vec<ImageReport>,
}

/// Read a scene file.
pub fn load_scene(path: &Path) -> Result<Scene, SceneError> {
    let content = std::fs::read_to_string(path)?;
    let mut scene: Scene = serde_json::from_str(&content).map_err(|source| SceneError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if scene.name.is_none() {
        scene.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }
    Ok(scene)
}

/// Build the in-memory document for a scene.
pub fn build_document(scene: &Scene) -> MemoryDocument {
    let mut doc = MemoryDocument::new(scene.device_pixel_ratio);
    doc.set_viewport(scene.viewport);
    let root = doc.root();
    for (name, value) in &scene.root.attributes {
        doc.seed_attribute(root, name, value);
    }
    for child in &scene.root.children {
        build_node(&mut doc, root, scene.root.top.unwrap_or(0.0), child);
    }
    doc
}

fn build_node(doc: &mut MemoryDocument, parent: NodeId, parent_top: f64, node: &SceneNode) {
    let id = doc.append(parent, &node.tag, BoxSize::new(node.width, node.height));
    let top = node.top.unwrap_or(parent_top);
    doc.set_top(id, top);
    if let Some(name) = &node.id {
        doc.seed_attribute(id, "id", name);
    }
    for (name, value) in &node.attributes {
        doc.seed_attribute(id, name, value);
    }
    for child in &node.children {
        build_node(doc, id, top, child);
    }
}

/// Run a scene to completion and report the final state of every image.
pub fn run_scene(scene: &Scene, config: &ResolverConfig) -> Result<SceneReport, SceneError> {
    let mut doc = build_document(scene);
    let (tx, rx) = mpsc::channel();
    let mut resolver = Resolver::new(config.clone()).with_events(tx);

    let root = doc.root();
    resolver.attach(&mut doc, root);
    settle(&mut doc, &mut resolver);

    for event in &scene.events {
        apply_event(&mut doc, &mut resolver, event)?;
        settle(&mut doc, &mut resolver);
    }

    let mut images: Vec<ImageReport> = resolver
        .managed()
        .map(|(node, state)| ImageReport {
            label: doc.label(*node),
            src: doc.get(*node, "src").map(str::to_string),
            width: doc.get(*node, "width").map(str::to_string),
            height: doc.get(*node, "height").map(str::to_string),
            status: state.status,
            pending: state.pending,
            requests: doc.requests_for(*node),
        })
        .collect();
    images.sort_by(|a, b| a.label.cmp(&b.label));

    drop(resolver);
    let events = rx.try_iter().map(|e| e.map_node(|n| doc.label(n))).collect();

    Ok(SceneReport {
        name: scene.name.clone().unwrap_or_else(|| "scene".to_string()),
        events,
        images,
    })
}

fn node_for(doc: &MemoryDocument, id: &str) -> Result<NodeId, SceneError> {
    doc.find_by_id(id)
        .ok_or_else(|| SceneError::UnknownId(id.to_string()))
}

fn apply_event(
    doc: &mut MemoryDocument,
    resolver: &mut Resolver<NodeId>,
    event: &SceneEvent,
) -> Result<(), SceneError> {
    debug!(?event, "scene event");
    match event {
        SceneEvent::Resize { id, width, height } => {
            let node = node_for(doc, id)?;
            doc.resize(node, BoxSize::new(*width, *height));
        }
        SceneEvent::Scroll { y } => doc.scroll_to(*y),
        SceneEvent::Load { id, width, height } => {
            let node = node_for(doc, id)?;
            resolver.handle_load(doc, node, Dimensions::new(*width, *height));
        }
        SceneEvent::Error { id } => {
            let node = node_for(doc, id)?;
            resolver.handle_error(doc, node);
        }
        SceneEvent::Attach { id } => {
            let context = match id {
                Some(id) => node_for(doc, id)?,
                None => doc.root(),
            };
            resolver.attach(doc, context);
        }
        SceneEvent::Update { id } => {
            let node = node_for(doc, id)?;
            resolver.update(doc, node);
        }
    }
    Ok(())
}

/// Deliver queued resize and intersection notifications until none remain.
pub fn settle(doc: &mut MemoryDocument, resolver: &mut Resolver<NodeId>) {
    for _ in 0..MAX_SETTLE_ROUNDS {
        let resized = doc.take_resize_notifications();
        let visible = doc.take_intersections();
        if resized.is_empty() && visible.is_empty() {
            return;
        }
        for container in resized {
            resolver.handle_resize(doc, container);
        }
        for node in visible {
            resolver.handle_intersection(doc, node, true);
        }
    }
    debug!("settle gave up after {MAX_SETTLE_ROUNDS} rounds");
}

/// Scene files under `path`: the file itself, or every `*.json` below a
/// directory, sorted.
pub fn find_scenes(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    let mut scenes: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .map(|e| e.into_path())
        .collect();
    scenes.sort();
    scenes
}

/// Load and run every scene in parallel. Results keep the input order.
pub fn run_scenes(
    paths: &[PathBuf],
    config: &ResolverConfig,
) -> Vec<(PathBuf, Result<SceneReport, SceneError>)> {
    paths
        .par_iter()
        .map(|path| {
            let report = load_scene(path).and_then(|scene| run_scene(&scene, config));
            (path.clone(), report)
        })
        .collect()
}
