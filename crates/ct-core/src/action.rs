//! Actions accepted by the reducer
//!
//! One global action type covers both timeline instances; every variant
//! that touches instance state names its target via [`TimelineId`]. The
//! [`Actions`] factory binds an instance id once so the orchestration
//! layer for that instance never passes it around.

use serde::{Deserialize, Serialize};

use crate::model::{
    DayZero, DayZeroOption, EcgWarnings, Page, PlotBand, Subject, SubjectId, TimelineId, Track,
    TrackName, TrackTemplate, Zoom,
};

/// Selection change for one track, as submitted by the selection surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSelection {
    pub name: TrackName,
    pub selected: bool,
    /// Display order to assign when selecting; ignored when deselecting
    pub order: Option<i32>,
}

/// Expand/collapse request for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackExpansion {
    pub name: TrackName,
    /// The expansion level the track is currently at
    pub expansion_level: i32,
    /// True to expand one level, false to collapse one level
    pub expand: bool,
    /// Restrict the change to one subject; `None` applies to every
    /// candidate subject
    pub subject_id: Option<SubjectId>,
}

/// Every transition the reducer implements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    ChangeStudySelection {
        id: TimelineId,
    },
    SetInitialOpeningState {
        id: TimelineId,
        tracks: Vec<TrackTemplate>,
        initialized: bool,
        performed_jump: bool,
    },
    ApplyInitialOpeningState {
        id: TimelineId,
    },
    SaveTrackInitialOpeningState {
        id: TimelineId,
    },
    SetPossibleTracks {
        id: TimelineId,
        tracks: Vec<Track>,
    },
    SetPossibleSubjects {
        id: TimelineId,
        subject_ids: Vec<SubjectId>,
    },
    Reset,
    SetLoading {
        id: TimelineId,
        loading: bool,
    },
    ChangeTracks {
        id: TimelineId,
        tracks: Vec<TrackSelection>,
    },
    ShowTrack {
        id: TimelineId,
        name: TrackName,
        order: i32,
    },
    HideTrack {
        id: TimelineId,
        name: TrackName,
    },
    UpdateData {
        id: TimelineId,
        subjects: Vec<Subject>,
    },
    ChangePage {
        id: TimelineId,
        page: Page,
    },
    UpdateZoom {
        id: TimelineId,
        /// `None` derives the zoom from loaded data
        zoom: Option<Zoom>,
    },
    ExpandOrCollapseTrack {
        id: TimelineId,
        expansion: TrackExpansion,
    },
    ChangeDayZero {
        id: TimelineId,
        day_zero: DayZero,
    },
    ChangeDayZeroOptions {
        id: TimelineId,
        options: Vec<DayZeroOption>,
    },
    ChangeLabsYAxisValue {
        id: TimelineId,
        value: String,
    },
    ChangeSpirometryYAxisValue {
        id: TimelineId,
        value: String,
    },
    ChangeEcgYAxisValue {
        id: TimelineId,
        value: String,
    },
    ChangeVitalsYAxisValue {
        id: TimelineId,
        value: String,
    },
    ChangeEcgWarnings {
        id: TimelineId,
        warnings: EcgWarnings,
    },
    ChangePerformedJumpFlag {
        id: TimelineId,
        performed_jump: bool,
    },
    UpdatePlotBands {
        id: TimelineId,
        band: PlotBand,
        /// Brush-modifier flag: toggle membership instead of replacing
        modifier: bool,
    },
    UpdateInitialized {
        /// `None` flips both instances
        id: Option<TimelineId>,
        initialized: bool,
    },
    /// Forward-compatible no-op entry point
    Noop,
}

/// Action factory bound to one timeline instance
#[derive(Debug, Clone, Copy)]
pub struct Actions {
    id: TimelineId,
}

impl Actions {
    pub fn new(id: TimelineId) -> Self {
        Self { id }
    }

    pub fn timeline_id(&self) -> TimelineId {
        self.id
    }

    pub fn change_study_selection(&self) -> Action {
        Action::ChangeStudySelection { id: self.id }
    }

    pub fn set_initial_opening_state(
        &self,
        tracks: Vec<TrackTemplate>,
        initialized: bool,
        performed_jump: bool,
    ) -> Action {
        Action::SetInitialOpeningState {
            id: self.id,
            tracks,
            initialized,
            performed_jump,
        }
    }

    pub fn apply_initial_opening_state(&self) -> Action {
        Action::ApplyInitialOpeningState { id: self.id }
    }

    pub fn save_track_initial_opening_state(&self) -> Action {
        Action::SaveTrackInitialOpeningState { id: self.id }
    }

    pub fn set_possible_tracks(&self, tracks: Vec<Track>) -> Action {
        Action::SetPossibleTracks {
            id: self.id,
            tracks,
        }
    }

    pub fn set_possible_subjects(&self, subject_ids: Vec<SubjectId>) -> Action {
        Action::SetPossibleSubjects {
            id: self.id,
            subject_ids,
        }
    }

    pub fn set_loading(&self, loading: bool) -> Action {
        Action::SetLoading {
            id: self.id,
            loading,
        }
    }

    pub fn change_tracks(&self, tracks: Vec<TrackSelection>) -> Action {
        Action::ChangeTracks {
            id: self.id,
            tracks,
        }
    }

    pub fn show_track(&self, name: TrackName, order: i32) -> Action {
        Action::ShowTrack {
            id: self.id,
            name,
            order,
        }
    }

    pub fn hide_track(&self, name: TrackName) -> Action {
        Action::HideTrack { id: self.id, name }
    }

    pub fn update_data(&self, subjects: Vec<Subject>) -> Action {
        Action::UpdateData {
            id: self.id,
            subjects,
        }
    }

    pub fn change_page(&self, page: Page) -> Action {
        Action::ChangePage { id: self.id, page }
    }

    pub fn update_zoom(&self, zoom: Option<Zoom>) -> Action {
        Action::UpdateZoom { id: self.id, zoom }
    }

    pub fn expand_or_collapse_track(&self, expansion: TrackExpansion) -> Action {
        Action::ExpandOrCollapseTrack {
            id: self.id,
            expansion,
        }
    }

    pub fn change_day_zero(&self, day_zero: DayZero) -> Action {
        Action::ChangeDayZero {
            id: self.id,
            day_zero,
        }
    }

    pub fn change_day_zero_options(&self, options: Vec<DayZeroOption>) -> Action {
        Action::ChangeDayZeroOptions {
            id: self.id,
            options,
        }
    }

    pub fn change_labs_y_axis_value(&self, value: impl Into<String>) -> Action {
        Action::ChangeLabsYAxisValue {
            id: self.id,
            value: value.into(),
        }
    }

    pub fn change_spirometry_y_axis_value(&self, value: impl Into<String>) -> Action {
        Action::ChangeSpirometryYAxisValue {
            id: self.id,
            value: value.into(),
        }
    }

    pub fn change_ecg_y_axis_value(&self, value: impl Into<String>) -> Action {
        Action::ChangeEcgYAxisValue {
            id: self.id,
            value: value.into(),
        }
    }

    pub fn change_vitals_y_axis_value(&self, value: impl Into<String>) -> Action {
        Action::ChangeVitalsYAxisValue {
            id: self.id,
            value: value.into(),
        }
    }

    pub fn change_ecg_warnings(&self, warnings: EcgWarnings) -> Action {
        Action::ChangeEcgWarnings {
            id: self.id,
            warnings,
        }
    }

    pub fn change_performed_jump_flag(&self, performed_jump: bool) -> Action {
        Action::ChangePerformedJumpFlag {
            id: self.id,
            performed_jump,
        }
    }

    pub fn update_plot_bands(&self, band: PlotBand, modifier: bool) -> Action {
        Action::UpdatePlotBands {
            id: self.id,
            band,
            modifier,
        }
    }

    pub fn update_initialized(&self, initialized: bool) -> Action {
        Action::UpdateInitialized {
            id: Some(self.id),
            initialized,
        }
    }
}
