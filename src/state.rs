//! Per-element bookkeeping, independent of any host.
//!
//! One [`ElementState`] exists for every element the resolver has attached
//! to. Its existence is what makes attachment idempotent; its [`Status`] is
//! the re-entrancy guard.

use serde::Serialize;

/// Lifecycle of one element's current update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Attached, nothing applied yet (or released after a failed load).
    Idle,
    /// A source was applied and its load has not completed.
    Updating,
    /// The applied source is final for the current layout.
    Loaded,
}

/// Which observation currently drives the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation<N> {
    /// Lazy element waiting for its first intersection.
    AwaitingVisibility,
    /// Resize-driven; the container is the element's parent, if it has one.
    Watching(Option<N>),
}

/// The source most recently written to the element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedSource {
    pub path: String,
    pub width: u32,
    pub height: Option<u32>,
    /// Cover mode or explicit ratio: no post-load height correction.
    pub fixed_ratio: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementState<N> {
    pub status: Status,
    pub observation: Observation<N>,
    /// A trigger arrived while `Updating`; re-run once the load completes.
    pub pending: bool,
    pub applied: Option<AppliedSource>,
    /// Path of the last load reported as failed. Left out of later
    /// selections while another candidate remains.
    pub failed: Option<String>,
}

impl<N> ElementState<N> {
    pub fn new(observation: Observation<N>) -> Self {
        Self {
            status: Status::Idle,
            observation,
            pending: false,
            applied: None,
            failed: None,
        }
    }

    /// Try to enter an update. While one is in flight the request collapses
    /// into the single pending flag and `false` is returned.
    pub fn try_begin(&mut self) -> bool {
        if self.status == Status::Updating {
            self.pending = true;
            return false;
        }
        true
    }

    /// Leave `Updating` with `status`. Returns whether a deferred request
    /// must now be serviced.
    pub fn finish(&mut self, status: Status) -> bool {
        self.status = status;
        std::mem::take(&mut self.pending)
    }

    /// The element has been through its lazy trigger (or never had one).
    pub fn is_watching(&self) -> bool {
        matches!(self.observation, Observation::Watching(_))
    }

    pub fn container(&self) -> Option<&N> {
        match &self.observation {
            Observation::Watching(container) => container.as_ref(),
            Observation::AwaitingVisibility => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_idle_without_pending_work() {
        let state: ElementState<u32> = ElementState::new(Observation::Watching(Some(7)));
        assert_eq!(state.status, Status::Idle);
        assert!(!state.pending);
        assert_eq!(state.container(), Some(&7));
    }

    #[test]
    fn begin_is_refused_while_updating() {
        let mut state: ElementState<u32> = ElementState::new(Observation::Watching(None));
        assert!(state.try_begin());
        state.status = Status::Updating;
        assert!(!state.try_begin());
        assert!(state.pending);
    }

    #[test]
    fn duplicate_triggers_collapse_into_one_rerun() {
        let mut state: ElementState<u32> = ElementState::new(Observation::Watching(None));
        state.status = Status::Updating;
        assert!(!state.try_begin());
        assert!(!state.try_begin());
        assert!(!state.try_begin());
        assert!(state.finish(Status::Loaded));
        assert!(!state.finish(Status::Loaded));
    }

    #[test]
    fn loaded_elements_accept_new_updates() {
        let mut state: ElementState<u32> = ElementState::new(Observation::Watching(None));
        state.status = Status::Loaded;
        assert!(state.try_begin());
        assert!(!state.pending);
    }

    #[test]
    fn awaiting_visibility_has_no_container() {
        let state: ElementState<u32> = ElementState::new(Observation::AwaitingVisibility);
        assert!(!state.is_watching());
        assert_eq!(state.container(), None);
    }
}
