//! State model for the clinical timeline engine
//!
//! The whole engine state is one value type: two independent
//! [`InstanceState`] slices under a [`TimelineState`] root. The reducer
//! produces new roots; nothing in this module performs I/O.

use ahash::AHashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

mod track;

pub use track::{
    DataPoint, InitialOpeningState, PointMetadata, Subject, SubjectId, TimePoint, Track, TrackKey,
    TrackName, TrackTemplate,
};

/// The two timeline views the application runs side by side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimelineId {
    /// "Compare subjects" view: many subjects, few tracks
    CompareSubjects,
    /// "Single subject profile" view: one subject, many tracks
    SubjectProfile,
}

impl TimelineId {
    /// The other instance of the pair
    pub fn other(&self) -> TimelineId {
        match self {
            TimelineId::CompareSubjects => TimelineId::SubjectProfile,
            TimelineId::SubjectProfile => TimelineId::CompareSubjects,
        }
    }
}

/// Pagination window over the ordered candidate-subject set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Sentinel window meaning "no page requested yet"
    pub const INVALID: Page = Page {
        limit: -1,
        offset: -1,
    };

    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// First page with the given window size
    pub fn first(limit: i64) -> Self {
        Self { limit, offset: 0 }
    }

    pub fn is_valid(&self) -> bool {
        self.limit >= 0 && self.offset >= 0
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::INVALID
    }
}

/// Time-axis zoom window.
///
/// `abs_min`/`abs_max` are data-derived bounds; `zoom_min`/`zoom_max` is
/// the visible window. While `zoomed` is false the window is recomputed
/// from data on every reload; once true it is preserved verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zoom {
    pub abs_min: f64,
    pub abs_max: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoomed: bool,
}

/// Reference axis origin against which all day-hour offsets are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayZero {
    FirstDose,
    Randomization,
    ScreeningVisit,
}

impl Default for DayZero {
    fn default() -> Self {
        DayZero::FirstDose
    }
}

/// A selectable day-zero option as supplied by the data boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayZeroOption {
    pub day_zero: DayZero,
    pub label: String,
}

/// Keys of the clinical warning flags derived from ECG data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcgWarningKey {
    Abnormal,
    Significant,
    QtcfMale,
    QtcfFemale,
    QtcfChange,
}

impl EcgWarningKey {
    pub const ALL: [EcgWarningKey; 5] = [
        EcgWarningKey::Abnormal,
        EcgWarningKey::Significant,
        EcgWarningKey::QtcfMale,
        EcgWarningKey::QtcfFemale,
        EcgWarningKey::QtcfChange,
    ];
}

/// Availability of one warning flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningState {
    pub available: bool,
}

/// Warning-key to availability mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcgWarnings {
    warnings: AHashMap<EcgWarningKey, WarningState>,
}

impl EcgWarnings {
    /// Every flag present and unavailable
    pub fn all_unavailable() -> Self {
        Self {
            warnings: EcgWarningKey::ALL
                .iter()
                .map(|k| (*k, WarningState::default()))
                .collect(),
        }
    }

    pub fn is_available(&self, key: EcgWarningKey) -> bool {
        self.warnings.get(&key).is_some_and(|w| w.available)
    }

    pub fn set_available(&mut self, key: EcgWarningKey) {
        self.warnings.insert(key, WarningState { available: true });
    }
}

impl Default for EcgWarnings {
    fn default() -> Self {
        Self::all_unavailable()
    }
}

/// A highlighted time range selected by brushing on the chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotBand {
    pub from: f64,
    pub to: f64,
}

impl PlotBand {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }
}

/// State slice of one timeline instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceState {
    /// True while an orchestration pipeline is in flight
    pub loading: bool,
    /// True once the instance has completed a cold load and its data is current
    pub initialized: bool,
    /// One-shot flag set by a cross-navigation jump, consumed by the
    /// orchestration layer to suppress one population-filter notification
    pub performed_jump: bool,
    /// Candidate subjects matching current filters, in candidate order
    pub subjects: IndexMap<SubjectId, Subject>,
    /// Paginated slice of `subjects` currently rendered
    pub displayed_subjects: Vec<SubjectId>,
    /// Candidate track definitions (selection, order, expansion)
    pub tracks: Vec<Track>,
    pub page: Page,
    pub zoom: Option<Zoom>,
    pub day_zero: DayZero,
    pub day_zero_options: Vec<DayZeroOption>,
    pub labs_y_axis_value: Option<String>,
    pub spirometry_y_axis_value: Option<String>,
    pub ecg_y_axis_value: Option<String>,
    pub vitals_y_axis_value: Option<String>,
    pub ecg_warnings: EcgWarnings,
    pub plot_bands: Vec<PlotBand>,
    /// Template used to seed this instance on first open
    pub initial_opening_state: InitialOpeningState,
}

impl Default for InstanceState {
    fn default() -> Self {
        Self {
            loading: false,
            initialized: false,
            performed_jump: false,
            subjects: IndexMap::new(),
            displayed_subjects: Vec::new(),
            tracks: Vec::new(),
            page: Page::INVALID,
            zoom: None,
            day_zero: DayZero::default(),
            day_zero_options: Vec::new(),
            labs_y_axis_value: None,
            spirometry_y_axis_value: None,
            ecg_y_axis_value: None,
            vitals_y_axis_value: None,
            ecg_warnings: EcgWarnings::all_unavailable(),
            plot_bands: Vec::new(),
            initial_opening_state: InitialOpeningState::app_default(),
        }
    }
}

/// Root of the engine state: both instances, nothing else
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineState {
    pub compare_subjects: InstanceState,
    pub subject_profile: InstanceState,
}

impl TimelineState {
    pub fn instance(&self, id: TimelineId) -> &InstanceState {
        match id {
            TimelineId::CompareSubjects => &self.compare_subjects,
            TimelineId::SubjectProfile => &self.subject_profile,
        }
    }

    pub fn instance_mut(&mut self, id: TimelineId) -> &mut InstanceState {
        match id {
            TimelineId::CompareSubjects => &mut self.compare_subjects,
            TimelineId::SubjectProfile => &mut self.subject_profile,
        }
    }
}
