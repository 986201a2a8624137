//! The update orchestrator and its two triggers.
//!
//! ```text
//! attach ──lazy──▶ observe_intersection ──first hit──▶ update ─┐
//!    └────eager──▶ update ─────────────────────────────────────┤
//!                                                              ▼
//!                                         observe_resize(parent), once
//!                                                              │
//!                  resize(container) ──▶ update each watched image
//! ```
//!
//! Every update goes through the element's [`ElementState`]. While a load
//! is in flight the element is `Updating` and further triggers collapse into
//! one pending re-run, serviced as soon as the load completes. Nothing is
//! polled and nothing is dropped.
//!
//! Progress is reported two ways: `tracing` diagnostics, and an optional
//! channel of [`ResolverEvent`]s for callers that want to display or record
//! what happened.

use crate::config::{LoadErrorPolicy, ResolverConfig};
use crate::element::{AttributeError, ElementSnapshot, is_lazy};
use crate::host::{Host, attr};
use crate::selection::{Decision, Selection, SelectionRequest, select};
use crate::state::{AppliedSource, ElementState, Observation, Status};
use crate::types::Dimensions;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::mpsc::Sender;
use tracing::{debug, warn};

/// Something the resolver did to one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverEvent<N> {
    Attached { node: N, lazy: bool },
    /// Lazy element came within the preload margin.
    Visible { node: N },
    /// Trigger arrived mid-load and was queued.
    Deferred { node: N },
    Skipped { node: N, reason: String },
    AlreadySufficient { node: N },
    Unchanged { node: N, path: String },
    Applied { node: N, path: String, width: u32, height: Option<u32> },
    /// Load completed; `corrected` is the box after the natural-size pass.
    Loaded { node: N, path: String, corrected: Option<Dimensions> },
    LoadFailed { node: N, path: Option<String>, released: bool },
}

impl<N> ResolverEvent<N> {
    pub fn node(&self) -> &N {
        match self {
            Self::Attached { node, .. }
            | Self::Visible { node }
            | Self::Deferred { node }
            | Self::Skipped { node, .. }
            | Self::AlreadySufficient { node }
            | Self::Unchanged { node, .. }
            | Self::Applied { node, .. }
            | Self::Loaded { node, .. }
            | Self::LoadFailed { node, .. } => node,
        }
    }

    /// Re-key the event, e.g. from host node ids to display labels.
    pub fn map_node<M>(self, f: impl FnOnce(N) -> M) -> ResolverEvent<M> {
        use ResolverEvent as E;
        match self {
            E::Attached { node, lazy } => E::Attached { node: f(node), lazy },
            E::Visible { node } => E::Visible { node: f(node) },
            E::Deferred { node } => E::Deferred { node: f(node) },
            E::Skipped { node, reason } => E::Skipped { node: f(node), reason },
            E::AlreadySufficient { node } => E::AlreadySufficient { node: f(node) },
            E::Unchanged { node, path } => E::Unchanged { node: f(node), path },
            E::Applied {
                node,
                path,
                width,
                height,
            } => E::Applied {
                node: f(node),
                path,
                width,
                height,
            },
            E::Loaded {
                node,
                path,
                corrected,
            } => E::Loaded {
                node: f(node),
                path,
                corrected,
            },
            E::LoadFailed {
                node,
                path,
                released,
            } => E::LoadFailed {
                node: f(node),
                path,
                released,
            },
        }
    }
}

/// Result of a single [`Resolver::update`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The element was never attached.
    NotManaged,
    /// An update is in flight; this one will run when it completes.
    Deferred,
    Skipped(AttributeError),
    AlreadySufficient,
    Unchanged,
    Applied(Selection),
}

pub struct Resolver<N> {
    config: ResolverConfig,
    elements: HashMap<N, ElementState<N>>,
    /// Containers already registered for resize observation.
    watched: HashSet<N>,
    events: Option<Sender<ResolverEvent<N>>>,
}

fn emit<N>(events: &Option<Sender<ResolverEvent<N>>>, event: ResolverEvent<N>) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }
}

impl<N: Copy + Eq + Hash + std::fmt::Debug> Resolver<N> {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            elements: HashMap::new(),
            watched: HashSet::new(),
            events: None,
        }
    }

    /// Report every [`ResolverEvent`] on `tx`.
    pub fn with_events(mut self, tx: Sender<ResolverEvent<N>>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn state(&self, node: N) -> Option<&ElementState<N>> {
        self.elements.get(&node)
    }

    /// All managed elements, in no particular order.
    pub fn managed(&self) -> impl Iterator<Item = (&N, &ElementState<N>)> {
        self.elements.iter()
    }

    /// Drop the state record of an element that left the document and
    /// stop every observation held on its behalf. Its container stays
    /// observed while another managed image still lives in it.
    pub fn forget<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        node: N,
    ) -> Option<ElementState<N>> {
        let state = self.elements.remove(&node)?;
        match state.observation {
            Observation::AwaitingVisibility => host.unobserve_intersection(node),
            Observation::Watching(Some(container)) => {
                let shared = self
                    .elements
                    .values()
                    .any(|other| other.container() == Some(&container));
                if !shared && self.watched.remove(&container) {
                    host.unobserve_resize(container);
                }
            }
            Observation::Watching(None) => {}
        }
        debug!(?node, "forgot image");
        Some(state)
    }

    /// Attach to every image under `context` not already attached.
    ///
    /// Lazy images lose their `src` and wait for visibility; the others are
    /// updated right away and their parent is put under resize observation.
    /// Returns the number of newly attached images.
    pub fn attach<H: Host<Node = N>>(&mut self, host: &mut H, context: N) -> usize {
        let mut attached = 0;
        for node in host.images_within(context) {
            if self.elements.contains_key(&node) {
                continue;
            }
            attached += 1;

            let lazy = is_lazy(host, node);
            if lazy {
                host.remove_attribute(node, attr::SRC);
                host.observe_intersection(node, self.config.preload_margin);
                self.elements
                    .insert(node, ElementState::new(Observation::AwaitingVisibility));
                debug!(?node, margin = self.config.preload_margin, "attached lazy image");
                emit(&self.events, ResolverEvent::Attached { node, lazy });
            } else {
                let container = host.parent(node);
                self.elements
                    .insert(node, ElementState::new(Observation::Watching(container)));
                debug!(?node, "attached image");
                emit(&self.events, ResolverEvent::Attached { node, lazy });
                self.update(host, node);
                if let Some(container) = container {
                    self.watch(host, container);
                }
            }
        }
        attached
    }

    /// Run one selection pass for `node`.
    pub fn update<H: Host<Node = N>>(&mut self, host: &mut H, node: N) -> UpdateOutcome {
        let Some(state) = self.elements.get_mut(&node) else {
            return UpdateOutcome::NotManaged;
        };
        if !state.try_begin() {
            debug!(?node, "update deferred until current load completes");
            emit(&self.events, ResolverEvent::Deferred { node });
            return UpdateOutcome::Deferred;
        }

        let mut snapshot = match ElementSnapshot::read(host, node) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(?node, %err, "skipping image");
                emit(
                    &self.events,
                    ResolverEvent::Skipped {
                        node,
                        reason: err.to_string(),
                    },
                );
                return UpdateOutcome::Skipped(err);
            }
        };
        if let Some(failed) = &state.failed {
            snapshot.sources = snapshot.sources.excluding(failed);
        }

        let parent_box = host
            .parent(node)
            .map(|parent| host.client_box(parent))
            .unwrap_or_default();
        let request = SelectionRequest::from_snapshot(
            &snapshot,
            host.client_box(node),
            parent_box,
            host.device_pixel_ratio(),
        );

        match select(&request) {
            Decision::AlreadySufficient => {
                state.status = Status::Loaded;
                mark_loaded(host, node);
                debug!(?node, "applied image already covers the available box");
                emit(&self.events, ResolverEvent::AlreadySufficient { node });
                UpdateOutcome::AlreadySufficient
            }
            Decision::Unchanged { path } => {
                state.status = Status::Loaded;
                mark_loaded(host, node);
                debug!(?node, %path, "best candidate already applied");
                emit(&self.events, ResolverEvent::Unchanged { node, path });
                UpdateOutcome::Unchanged
            }
            Decision::Apply(selection) => {
                let path = selection.candidate.path.clone();
                host.set_attribute(node, attr::SRC, &path);
                host.set_attribute(node, attr::WIDTH, &selection.width.to_string());
                if let Some(height) = selection.height {
                    host.set_attribute(node, attr::HEIGHT, &height.to_string());
                }
                state.status = Status::Updating;
                state.applied = Some(AppliedSource {
                    path: path.clone(),
                    width: selection.width,
                    height: selection.height,
                    fixed_ratio: snapshot.has_fixed_ratio(),
                });
                debug!(?node, %path, width = selection.width, "applying candidate");
                emit(
                    &self.events,
                    ResolverEvent::Applied {
                        node,
                        path,
                        width: selection.width,
                        height: selection.height,
                    },
                );
                UpdateOutcome::Applied(selection)
            }
        }
    }

    /// The host finished loading the applied source of `node`; `natural` is
    /// the decoded image size.
    pub fn handle_load<H: Host<Node = N>>(&mut self, host: &mut H, node: N, natural: Dimensions) {
        let Some(state) = self.elements.get_mut(&node) else {
            return;
        };
        if state.status != Status::Updating {
            debug!(?node, "ignoring load outside an update");
            return;
        }

        let mut corrected = None;
        if let Some(applied) = state.applied.as_mut() {
            if !applied.fixed_ratio && natural.is_positive() {
                let height = (applied.width as f64 * natural.height as f64
                    / natural.width as f64)
                    .round() as u32;
                host.set_attribute(node, attr::WIDTH, &applied.width.to_string());
                host.set_attribute(node, attr::HEIGHT, &height.to_string());
                applied.height = Some(height);
                corrected = Some(Dimensions::new(applied.width, height));
            }
        }
        mark_loaded(host, node);
        let path = state
            .applied
            .as_ref()
            .map(|a| a.path.clone())
            .unwrap_or_default();
        let rerun = state.finish(Status::Loaded);

        debug!(?node, %path, "image loaded");
        emit(
            &self.events,
            ResolverEvent::Loaded {
                node,
                path,
                corrected,
            },
        );
        if rerun {
            self.update(host, node);
        }
    }

    /// The host failed to load the applied source of `node`.
    pub fn handle_error<H: Host<Node = N>>(&mut self, host: &mut H, node: N) {
        let Some(state) = self.elements.get_mut(&node) else {
            return;
        };
        if state.status != Status::Updating {
            return;
        }
        let path = state.applied.as_ref().map(|a| a.path.clone());
        let policy = self.config.on_load_error;

        match policy {
            LoadErrorPolicy::Stall => {
                warn!(?node, ?path, "image failed to load; element stays busy");
                emit(
                    &self.events,
                    ResolverEvent::LoadFailed {
                        node,
                        path,
                        released: false,
                    },
                );
            }
            LoadErrorPolicy::Release => {
                warn!(?node, ?path, "image failed to load; releasing element");
                host.remove_attribute(node, attr::SRC);
                state.applied = None;
                state.failed = path.clone();
                let rerun = state.finish(Status::Idle);
                emit(
                    &self.events,
                    ResolverEvent::LoadFailed {
                        node,
                        path,
                        released: true,
                    },
                );
                if rerun {
                    self.update(host, node);
                }
            }
        }
    }

    /// Intersection notification for a lazy image. Only the first
    /// intersecting notification does anything.
    pub fn handle_intersection<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        node: N,
        intersecting: bool,
    ) {
        if !intersecting {
            return;
        }
        let Some(state) = self.elements.get_mut(&node) else {
            return;
        };
        if state.observation != Observation::AwaitingVisibility {
            return;
        }

        host.unobserve_intersection(node);
        let container = host.parent(node);
        state.observation = Observation::Watching(container);
        debug!(?node, "lazy image near viewport");
        emit(&self.events, ResolverEvent::Visible { node });

        self.update(host, node);
        if let Some(container) = container {
            self.watch(host, container);
        }
    }

    /// Size change of an observed container: update every watched image
    /// inside it. Lazy images still waiting for visibility are left alone.
    pub fn handle_resize<H: Host<Node = N>>(&mut self, host: &mut H, container: N) {
        for node in host.images_within(container) {
            let watching = self.elements.get(&node).is_some_and(ElementState::is_watching);
            if watching {
                self.update(host, node);
            }
        }
    }

    fn watch<H: Host<Node = N>>(&mut self, host: &mut H, container: N) {
        if self.watched.insert(container) {
            host.observe_resize(container);
        }
    }
}

/// Set the output marker unless it is already there.
fn mark_loaded<H: Host>(host: &mut H, node: H::Node) {
    if !host.has_attribute(node, attr::LOADED) {
        host.set_attribute(node, attr::LOADED, "1");
    }
}
