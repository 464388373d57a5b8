//! Single-writer store with atomic root swaps
//!
//! The store owns the current immutable state root. `dispatch` runs the
//! pure reducer, swaps in the new root, and notifies subscribers; readers
//! take cheap `Arc` snapshots and never mutate. This mirrors the engine /
//! subscriber split used throughout the platform.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::trace;

use crate::action::Action;
use crate::model::{
    DayZero, DayZeroOption, EcgWarnings, InitialOpeningState, Page, PlotBand, Subject, SubjectId,
    TimelineId, TimelineState, Track, Zoom,
};
use crate::reducer::reduce;

/// Components that need to react to every state swap
pub trait StoreSubscriber: Send + Sync {
    /// Called with the freshly swapped-in root
    fn on_state_change(&self, state: &TimelineState);
}

/// The timeline state store
pub struct TimelineStore {
    root: RwLock<Arc<TimelineState>>,
    subscribers: RwLock<Vec<Weak<dyn StoreSubscriber>>>,
}

impl TimelineStore {
    /// Create a store holding the default initial state
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Arc::new(TimelineState::default())),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Current state root
    pub fn snapshot(&self) -> Arc<TimelineState> {
        self.root.read().clone()
    }

    /// Run the reducer and publish the new root
    pub fn dispatch(&self, action: &Action) {
        trace!(?action, "dispatch");
        let next = {
            let mut root = self.root.write();
            let next = Arc::new(reduce(root.as_ref(), action));
            *root = next.clone();
            next
        };
        self.notify_subscribers(&next);
    }

    /// Add a subscriber; held weakly, dropped subscribers are pruned
    pub fn subscribe(&self, subscriber: Arc<dyn StoreSubscriber>) {
        self.subscribers.write().push(Arc::downgrade(&subscriber));
    }

    fn notify_subscribers(&self, state: &TimelineState) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|weak| weak.strong_count() > 0);
        for weak in subscribers.iter() {
            if let Some(subscriber) = weak.upgrade() {
                subscriber.on_state_change(state);
            }
        }
    }

    // ---- read-only projections -------------------------------------

    pub fn loading(&self, id: TimelineId) -> bool {
        self.snapshot().instance(id).loading
    }

    pub fn initialized(&self, id: TimelineId) -> bool {
        self.snapshot().instance(id).initialized
    }

    pub fn performed_jump(&self, id: TimelineId) -> bool {
        self.snapshot().instance(id).performed_jump
    }

    /// Candidate subjects in candidate order
    pub fn subjects(&self, id: TimelineId) -> Vec<Subject> {
        self.snapshot().instance(id).subjects.values().cloned().collect()
    }

    /// The paginated slice of candidate subjects, resolved to full entries
    pub fn displayed_subjects(&self, id: TimelineId) -> Vec<Subject> {
        let state = self.snapshot();
        let inst = state.instance(id);
        inst.displayed_subjects
            .iter()
            .filter_map(|sid| inst.subjects.get(sid).cloned())
            .collect()
    }

    /// Ids of the displayed subjects
    pub fn displayed_subject_ids(&self, id: TimelineId) -> Vec<SubjectId> {
        self.snapshot().instance(id).displayed_subjects.clone()
    }

    pub fn tracks(&self, id: TimelineId) -> Vec<Track> {
        self.snapshot().instance(id).tracks.clone()
    }

    pub fn page(&self, id: TimelineId) -> Page {
        self.snapshot().instance(id).page
    }

    pub fn zoom(&self, id: TimelineId) -> Option<Zoom> {
        self.snapshot().instance(id).zoom
    }

    pub fn day_zero(&self, id: TimelineId) -> DayZero {
        self.snapshot().instance(id).day_zero
    }

    pub fn day_zero_options(&self, id: TimelineId) -> Vec<DayZeroOption> {
        self.snapshot().instance(id).day_zero_options.clone()
    }

    pub fn labs_y_axis_value(&self, id: TimelineId) -> Option<String> {
        self.snapshot().instance(id).labs_y_axis_value.clone()
    }

    pub fn spirometry_y_axis_value(&self, id: TimelineId) -> Option<String> {
        self.snapshot().instance(id).spirometry_y_axis_value.clone()
    }

    pub fn ecg_y_axis_value(&self, id: TimelineId) -> Option<String> {
        self.snapshot().instance(id).ecg_y_axis_value.clone()
    }

    pub fn vitals_y_axis_value(&self, id: TimelineId) -> Option<String> {
        self.snapshot().instance(id).vitals_y_axis_value.clone()
    }

    pub fn ecg_warnings(&self, id: TimelineId) -> EcgWarnings {
        self.snapshot().instance(id).ecg_warnings.clone()
    }

    pub fn plot_bands(&self, id: TimelineId) -> Vec<PlotBand> {
        self.snapshot().instance(id).plot_bands.clone()
    }

    pub fn initial_opening_state(&self, id: TimelineId) -> InitialOpeningState {
        self.snapshot().instance(id).initial_opening_state.clone()
    }
}

impl Default for TimelineStore {
    fn default() -> Self {
        Self::new()
    }
}
