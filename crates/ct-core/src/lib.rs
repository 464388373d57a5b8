//! Core state engine for clinical event timelines
//!
//! This crate provides the immutable state model, the pure reducer, the
//! single-writer store with its read-only projections, and the derived
//! clinical warning computation. All I/O lives behind the
//! [`data::TimelineDataSource`] boundary and in the orchestration crate.

pub mod action;
pub mod model;
pub mod reducer;
pub mod store;
pub mod warnings;

// Re-export commonly used types
pub use action::{Action, Actions, TrackExpansion, TrackSelection};
pub use model::{
    DataPoint, DayZero, DayZeroOption, EcgWarningKey, EcgWarnings, InitialOpeningState,
    InstanceState, Page, PlotBand, PointMetadata, Subject, SubjectId, TimePoint, TimelineId,
    TimelineState, Track, TrackKey, TrackName, TrackTemplate, Zoom,
};
pub use reducer::reduce;
pub use store::{StoreSubscriber, TimelineStore};
pub use warnings::recompute_ecg_warnings;

pub mod data {
    //! The asynchronous data-fetch boundary consumed by the orchestration
    //! layer. Retry, backoff and timeouts are the implementor's concern.

    use crate::model::{DayZero, DayZeroOption, Subject, SubjectId, Track, TrackName};

    /// Trait for timeline data sources
    #[async_trait::async_trait]
    pub trait TimelineDataSource: Send + Sync {
        /// Available day-zero axis options for the loaded dataset
        async fn fetch_day_zero_options(&self) -> anyhow::Result<Vec<DayZeroOption>>;

        /// Candidate track definitions for the loaded dataset
        async fn get_possible_tracks(&self) -> anyhow::Result<Vec<Track>>;

        /// Candidate subject ids matching the current filters
        async fn get_possible_subjects(
            &self,
            day_zero: DayZero,
            selected_tracks: &[TrackName],
        ) -> anyhow::Result<Vec<SubjectId>>;

        /// Track data for the displayed subjects, day-hours relative to
        /// the given day zero
        async fn get_track_data(
            &self,
            displayed_subjects: &[SubjectId],
            day_zero: DayZero,
        ) -> anyhow::Result<Vec<Subject>>;

        /// The source name/identifier
        fn source_name(&self) -> &str;
    }
}

pub use data::TimelineDataSource;
