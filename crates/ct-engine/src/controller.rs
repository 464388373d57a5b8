//! Orchestration controller for one timeline instance
//!
//! Binds UI-facing operations to asynchronous fetch pipelines: each
//! operation dispatches its structural action, fetches whatever the
//! change invalidated, merges the results back through the reducer and
//! recomputes derived values. A new operation of the same category
//! supersedes the in-flight pipeline of that category; operations of
//! different categories run independently and may interleave their
//! store writes.
//!
//! Fetch failures are not recovered here: the pipeline logs the error
//! and stops, leaving the instance's loading flag set.

use std::future::Future;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use ct_core::data::TimelineDataSource;
use ct_core::model::{
    DayZero, Page, PlotBand, TimelineId, TrackKey, TrackName, TrackTemplate, Zoom,
};
use ct_core::{
    recompute_ecg_warnings, Action, Actions, TimelineStore, TrackExpansion, TrackSelection,
};

use crate::filters::{FilterChange, FilterHub, FilterKind};
use crate::pipeline::{PipelineCategory, PipelineGenerations};

/// Page window size used when no valid page is set yet
const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Controller for one timeline instance
#[derive(Clone)]
pub struct TimelineController {
    inner: Arc<Inner>,
}

struct Inner {
    id: TimelineId,
    store: Arc<TimelineStore>,
    source: Arc<dyn TimelineDataSource>,
    actions: Actions,
    generations: PipelineGenerations,
    local_reset: broadcast::Sender<TimelineId>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl TimelineController {
    pub fn new(
        id: TimelineId,
        store: Arc<TimelineStore>,
        source: Arc<dyn TimelineDataSource>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id,
                store,
                source,
                actions: Actions::new(id),
                generations: PipelineGenerations::new(),
                local_reset: broadcast::channel(16).0,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn timeline_id(&self) -> TimelineId {
        self.inner.id
    }

    pub fn store(&self) -> &Arc<TimelineStore> {
        &self.inner.store
    }

    /// Notifications that derived chart state must be invalidated
    pub fn subscribe_local_reset(&self) -> broadcast::Receiver<TimelineId> {
        self.inner.local_reset.subscribe()
    }

    /// Cold load: day-zero options, candidate tracks seeded from the
    /// initial-opening template, candidate subjects, first page of data
    pub fn init(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let generation = inner.generations.begin(PipelineCategory::Init);
        info!(id = ?inner.id, source = inner.source.source_name(), "timeline init");
        spawn_logged(PipelineCategory::Init, async move {
            inner.cold_init(generation).await
        })
    }

    /// Teardown: snapshot the current track layout as the next opening
    /// template and cancel everything in flight
    pub fn destroy(&self) {
        self.inner
            .store
            .dispatch(&self.inner.actions.save_track_initial_opening_state());
        self.inner.generations.cancel_all();
        for handle in self.inner.tasks.lock().drain(..) {
            handle.abort();
        }
    }

    pub fn update_page_content(&self, page: Page) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let generation = inner.generations.begin(PipelineCategory::Page);
        spawn_logged(PipelineCategory::Page, async move {
            inner.store.dispatch(&inner.actions.set_loading(true));
            inner.store.dispatch(&inner.actions.change_page(page));
            inner
                .refresh_track_data(PipelineCategory::Page, generation)
                .await
        })
    }

    /// Explicit zoom, or auto-derived bounds when no value is given
    pub fn update_zoom(&self, zoom: Option<Zoom>) {
        self.inner.store.dispatch(&self.inner.actions.update_zoom(zoom));
    }

    /// Apply a selection map keyed by `(track, expansion level)`. Newly
    /// selected tracks get display orders following the map order.
    pub fn update_track_selection(&self, selections: IndexMap<TrackKey, bool>) -> JoinHandle<()> {
        let mut next_order = 1;
        let tracks: Vec<TrackSelection> = selections
            .iter()
            .map(|(key, selected)| TrackSelection {
                name: key.name,
                selected: *selected,
                order: selected.then(|| {
                    let order = next_order;
                    next_order += 1;
                    order
                }),
            })
            .collect();

        let inner = self.inner.clone();
        let generation = inner.generations.begin(PipelineCategory::TrackSelection);
        spawn_logged(PipelineCategory::TrackSelection, async move {
            inner.store.dispatch(&inner.actions.set_loading(true));
            inner.store.dispatch(&inner.actions.change_tracks(tracks));
            inner
                .repopulate(PipelineCategory::TrackSelection, generation)
                .await
        })
    }

    pub fn expand_or_collapse_track(&self, expansion: TrackExpansion) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let generation = inner.generations.begin(PipelineCategory::Expansion);
        spawn_logged(PipelineCategory::Expansion, async move {
            inner.store.dispatch(&inner.actions.set_loading(true));
            inner
                .store
                .dispatch(&inner.actions.expand_or_collapse_track(expansion));
            inner
                .refresh_track_data(PipelineCategory::Expansion, generation)
                .await
        })
    }

    pub fn update_day_zero(&self, day_zero: DayZero) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let generation = inner.generations.begin(PipelineCategory::DayZero);
        spawn_logged(PipelineCategory::DayZero, async move {
            inner.store.dispatch(&inner.actions.set_loading(true));
            inner.store.dispatch(&inner.actions.change_day_zero(day_zero));
            inner.repopulate(PipelineCategory::DayZero, generation).await
        })
    }

    pub fn update_labs_y_axis_value(&self, value: impl Into<String>) -> JoinHandle<()> {
        let action = self.inner.actions.change_labs_y_axis_value(value);
        self.axis_value_pipeline(action)
    }

    pub fn update_spirometry_y_axis_value(&self, value: impl Into<String>) -> JoinHandle<()> {
        let action = self.inner.actions.change_spirometry_y_axis_value(value);
        self.axis_value_pipeline(action)
    }

    pub fn update_ecg_y_axis_value(&self, value: impl Into<String>) -> JoinHandle<()> {
        let action = self.inner.actions.change_ecg_y_axis_value(value);
        self.axis_value_pipeline(action)
    }

    pub fn update_vitals_y_axis_value(&self, value: impl Into<String>) -> JoinHandle<()> {
        let action = self.inner.actions.change_vitals_y_axis_value(value);
        self.axis_value_pipeline(action)
    }

    pub fn update_ecg_warnings(&self, warnings: ct_core::EcgWarnings) {
        self.inner
            .store
            .dispatch(&self.inner.actions.change_ecg_warnings(warnings));
    }

    pub fn update_plot_bands(&self, band: PlotBand, modifier: bool) {
        self.inner
            .store
            .dispatch(&self.inner.actions.update_plot_bands(band, modifier));
    }

    /// Install an opening template and force a cold reload, as done by a
    /// cross-navigation jump with preset filters
    pub fn set_initial_opening_state(
        &self,
        tracks: Vec<TrackTemplate>,
        initialized: bool,
        performed_jump: bool,
    ) {
        self.inner.store.dispatch(&self.inner.actions.set_initial_opening_state(
            tracks,
            initialized,
            performed_jump,
        ));
    }

    pub fn change_study_selection(&self) {
        self.inner
            .store
            .dispatch(&self.inner.actions.change_study_selection());
    }

    /// Start listening to the upstream filter streams. Any non-empty
    /// change marks the other instance stale, repopulates this one and
    /// emits a local-reset notification.
    pub fn listen_to_filters(&self, hub: &FilterHub) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handles = Vec::with_capacity(FilterKind::ALL.len() + 1);
        for kind in FilterKind::ALL {
            let mut receiver = hub.subscribe(kind);
            let tx = tx.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    match receiver.recv().await {
                        Ok(change) => {
                            if tx.send(change).is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }));
        }

        let inner = self.inner.clone();
        handles.push(tokio::spawn(async move {
            while let Some(change) = rx.recv().await {
                inner.handle_filter_change(change);
            }
        }));
        self.inner.tasks.lock().extend(handles);
    }

    fn axis_value_pipeline(&self, action: Action) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let generation = inner.generations.begin(PipelineCategory::AxisValue);
        spawn_logged(PipelineCategory::AxisValue, async move {
            inner.store.dispatch(&inner.actions.set_loading(true));
            inner.store.dispatch(&action);
            inner
                .refresh_track_data(PipelineCategory::AxisValue, generation)
                .await
        })
    }
}

impl Inner {
    fn current(&self, category: PipelineCategory, generation: u64) -> bool {
        if self.generations.is_current(category, generation) {
            true
        } else {
            debug!(id = ?self.id, ?category, "pipeline superseded");
            false
        }
    }

    async fn cold_init(self: Arc<Self>, generation: u64) -> anyhow::Result<()> {
        self.store.dispatch(&self.actions.set_loading(true));

        let options = self.source.fetch_day_zero_options().await?;
        if !self.current(PipelineCategory::Init, generation) {
            return Ok(());
        }
        self.store
            .dispatch(&self.actions.change_day_zero_options(options));

        let tracks = self.source.get_possible_tracks().await?;
        if !self.current(PipelineCategory::Init, generation) {
            return Ok(());
        }
        self.store.dispatch(&self.actions.set_possible_tracks(tracks));
        self.store
            .dispatch(&self.actions.apply_initial_opening_state());

        self.repopulate(PipelineCategory::Init, generation).await?;
        if self.current(PipelineCategory::Init, generation) {
            self.store.dispatch(&Action::UpdateInitialized {
                id: Some(self.id),
                initialized: true,
            });
        }
        Ok(())
    }

    /// Refetch the candidate-subject set, reset pagination to the first
    /// page, then reload the displayed window
    async fn repopulate(&self, category: PipelineCategory, generation: u64) -> anyhow::Result<()> {
        let page = self.store.page(self.id);
        let limit = if page.is_valid() {
            page.limit
        } else {
            DEFAULT_PAGE_LIMIT
        };
        let day_zero = self.store.day_zero(self.id);
        let selected: Vec<TrackName> = self
            .store
            .tracks(self.id)
            .iter()
            .filter(|t| t.selected)
            .map(|t| t.name)
            .collect();

        let subject_ids = self.source.get_possible_subjects(day_zero, &selected).await?;
        if !self.current(category, generation) {
            return Ok(());
        }
        self.store
            .dispatch(&self.actions.set_possible_subjects(subject_ids));
        self.store
            .dispatch(&self.actions.change_page(Page::first(limit)));

        self.refresh_track_data(category, generation).await
    }

    /// Fetch track data for the displayed window and fold it in
    async fn refresh_track_data(
        &self,
        category: PipelineCategory,
        generation: u64,
    ) -> anyhow::Result<()> {
        let displayed = self.store.displayed_subject_ids(self.id);
        let day_zero = self.store.day_zero(self.id);

        let subjects = self.source.get_track_data(&displayed, day_zero).await?;
        if !self.current(category, generation) {
            return Ok(());
        }

        let fetched_ecg = subjects
            .iter()
            .any(|s| s.track(TrackName::Ecg).is_some());

        self.store.dispatch(&self.actions.update_data(subjects));
        self.store.dispatch(&self.actions.update_zoom(None));

        if fetched_ecg {
            let snapshot = self.store.snapshot();
            let warnings = recompute_ecg_warnings(&snapshot.instance(self.id).subjects);
            self.store
                .dispatch(&self.actions.change_ecg_warnings(warnings));
        }

        self.store.dispatch(&self.actions.set_loading(false));
        Ok(())
    }

    fn handle_filter_change(self: &Arc<Self>, change: FilterChange) {
        if change.empty {
            return;
        }
        // A cross-navigation jump pre-applies the population filter; the
        // resulting notification is consumed without a reload, once.
        if change.kind == FilterKind::Population && self.store.performed_jump(self.id) {
            debug!(id = ?self.id, "population filter change suppressed after jump");
            self.store
                .dispatch(&self.actions.change_performed_jump_flag(false));
            return;
        }
        info!(id = ?self.id, kind = ?change.kind, "filter change, repopulating");
        self.store.dispatch(&Action::UpdateInitialized {
            id: Some(self.id.other()),
            initialized: false,
        });
        let _ = self.local_reset.send(self.id);

        let inner = self.clone();
        let generation = inner.generations.begin(PipelineCategory::Filter);
        tokio::spawn(async move {
            inner.store.dispatch(&inner.actions.set_loading(true));
            if let Err(error) = inner.repopulate(PipelineCategory::Filter, generation).await {
                error!(id = ?inner.id, %error, "filter repopulation failed; loading flag left set");
            }
        });
    }
}

fn spawn_logged<F>(category: PipelineCategory, fut: F) -> JoinHandle<()>
where
    F: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(error) = fut.await {
            error!(?category, %error, "timeline pipeline failed; loading flag left set");
        }
    })
}
