//! Subjects, tracks and data points

use serde::{Deserialize, Serialize};

/// Unique identifier of a subject within a study
pub type SubjectId = String;

/// The clinical data domains a timeline can display, one lane each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackName {
    Summary,
    Dose,
    AdverseEvents,
    Labs,
    Spirometry,
    Conmeds,
    Exacerbation,
    Vitals,
    Ecg,
    HealthcareEncounters,
    PatientReportedData,
}

impl TrackName {
    /// All known track names, in default display order
    pub const ALL: [TrackName; 11] = [
        TrackName::Summary,
        TrackName::Dose,
        TrackName::AdverseEvents,
        TrackName::Labs,
        TrackName::Spirometry,
        TrackName::Conmeds,
        TrackName::Exacerbation,
        TrackName::Vitals,
        TrackName::Ecg,
        TrackName::HealthcareEncounters,
        TrackName::PatientReportedData,
    ];

    /// Stable string code, also used for name-ordered sorting
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackName::Summary => "SUMMARY",
            TrackName::Dose => "DOSE",
            TrackName::AdverseEvents => "AES",
            TrackName::Labs => "LABS",
            TrackName::Spirometry => "SPIROMETRY",
            TrackName::Conmeds => "CONMEDS",
            TrackName::Exacerbation => "EXACERBATION",
            TrackName::Vitals => "VITALS",
            TrackName::Ecg => "ECG",
            TrackName::HealthcareEncounters => "HEALTHCARE_ENCOUNTERS",
            TrackName::PatientReportedData => "PATIENT_REPORTED_DATA",
        }
    }
}

/// A point on the study time axis, expressed as fractional days since day zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub day_hour: f64,
}

impl TimePoint {
    pub fn new(day_hour: f64) -> Self {
        Self { day_hour }
    }
}

/// Track-specific fields attached to a data point.
///
/// The named fields are the ones the ECG warning scan reads; everything
/// else a track carries (lab codes, dose amounts, ...) rides along in
/// `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointMetadata {
    pub sex: Option<String>,
    pub abnormality: Option<String>,
    pub significant: Option<String>,
    pub qtcf_value: Option<f64>,
    pub qtcf_change: Option<f64>,
    pub test_name: Option<String>,
    pub value_raw: Option<f64>,
    pub value_change_from_baseline: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One event or measurement on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Start of the event
    pub start: TimePoint,
    /// End of the event, absent for instantaneous measurements
    pub end: Option<TimePoint>,
    /// Track-specific payload
    #[serde(default)]
    pub metadata: PointMetadata,
}

impl DataPoint {
    pub fn at(day_hour: f64) -> Self {
        Self {
            start: TimePoint::new(day_hour),
            end: None,
            metadata: PointMetadata::default(),
        }
    }

    pub fn spanning(start: f64, end: f64) -> Self {
        Self {
            start: TimePoint::new(start),
            end: Some(TimePoint::new(end)),
            metadata: PointMetadata::default(),
        }
    }
}

/// One lane of a subject's timeline.
///
/// Invariant: `order` is `Some` exactly when `selected` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: TrackName,
    pub selected: bool,
    pub order: Option<i32>,
    /// Grouping granularity, 1 is the coarsest
    pub expansion_level: i32,
    pub data: Vec<DataPoint>,
    /// Dirty marker: set when the track needs a refetch
    pub changed: bool,
}

impl Track {
    /// A fresh, unselected track definition with no data
    pub fn new(name: TrackName) -> Self {
        Self {
            name,
            selected: false,
            order: None,
            expansion_level: 1,
            data: Vec::new(),
            changed: false,
        }
    }

    /// A selected track at the given display order
    pub fn selected(name: TrackName, order: i32) -> Self {
        Self {
            selected: true,
            order: Some(order),
            ..Self::new(name)
        }
    }

    /// Copy of this track with its data payload dropped
    pub fn without_data(&self) -> Self {
        Self {
            data: Vec::new(),
            changed: false,
            ..self.clone()
        }
    }
}

/// A subject together with its ordered track lanes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub subject_id: SubjectId,
    pub tracks: Vec<Track>,
}

impl Subject {
    pub fn new(subject_id: impl Into<SubjectId>, tracks: Vec<Track>) -> Self {
        Self {
            subject_id: subject_id.into(),
            tracks,
        }
    }

    pub fn track(&self, name: TrackName) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }
}

/// One entry of the initial-opening template: a selected track's layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackTemplate {
    pub name: TrackName,
    pub order: Option<i32>,
    pub expansion_level: i32,
}

/// The default track layout restored the first time a timeline opens
/// in a session. In-session only, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialOpeningState {
    pub tracks: Vec<TrackTemplate>,
}

impl InitialOpeningState {
    /// The application default: every known track, selected, coarsest
    /// expansion, in default display order.
    pub fn app_default() -> Self {
        Self {
            tracks: TrackName::ALL
                .iter()
                .enumerate()
                .map(|(idx, name)| TrackTemplate {
                    name: *name,
                    order: Some(idx as i32 + 1),
                    expansion_level: 1,
                })
                .collect(),
        }
    }

    pub fn track(&self, name: TrackName) -> Option<&TrackTemplate> {
        self.tracks.iter().find(|t| t.name == name)
    }
}

impl Default for InitialOpeningState {
    fn default() -> Self {
        Self::app_default()
    }
}

/// Composite key identifying a track at a particular expansion level,
/// as used by the selection surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackKey {
    pub name: TrackName,
    pub expansion_level: i32,
}

impl TrackKey {
    pub fn new(name: TrackName, expansion_level: i32) -> Self {
        Self {
            name,
            expansion_level,
        }
    }
}
