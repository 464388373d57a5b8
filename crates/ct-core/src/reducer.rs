//! Pure transition function over the timeline state
//!
//! `reduce` is total and deterministic: it never performs I/O, never
//! panics on any action, and returns the input state unchanged for
//! transitions that have nothing to do. All orchestration-side effects
//! (fetching, derived warning computation) happen outside and re-enter
//! through further actions.

use crate::action::{Action, TrackExpansion, TrackSelection};
use crate::model::{
    InitialOpeningState, InstanceState, Page, Subject, SubjectId, TimelineId, TimelineState, Track,
    TrackName, TrackTemplate, Zoom,
};

/// Fraction of the data range added on both sides of the derived bounds
const ZOOM_PADDING: f64 = 0.05;

/// Apply one action to the state, producing the next state
pub fn reduce(state: &TimelineState, action: &Action) -> TimelineState {
    let mut next = state.clone();
    match action {
        Action::ChangeStudySelection { id } => {
            next.instance_mut(*id).initial_opening_state = InitialOpeningState::app_default();
        }
        Action::SetInitialOpeningState {
            id,
            tracks,
            initialized,
            performed_jump,
        } => {
            let inst = next.instance_mut(*id);
            inst.initial_opening_state = InitialOpeningState {
                tracks: tracks.clone(),
            };
            // Forces a cold reload the next time the instance opens
            inst.subjects.clear();
            inst.tracks.clear();
            inst.displayed_subjects.clear();
            inst.initialized = *initialized;
            inst.performed_jump = *performed_jump;
        }
        Action::ApplyInitialOpeningState { id } => {
            apply_initial_opening_state(next.instance_mut(*id));
        }
        Action::SaveTrackInitialOpeningState { id } => {
            let inst = next.instance_mut(*id);
            inst.initial_opening_state = InitialOpeningState {
                tracks: inst
                    .tracks
                    .iter()
                    .filter(|t| t.selected)
                    .map(|t| TrackTemplate {
                        name: t.name,
                        order: t.order,
                        expansion_level: t.expansion_level,
                    })
                    .collect(),
            };
        }
        Action::SetPossibleTracks { id, tracks } => {
            next.instance_mut(*id).tracks = tracks.clone();
        }
        Action::SetPossibleSubjects { id, subject_ids } => {
            set_possible_subjects(next.instance_mut(*id), subject_ids);
        }
        Action::Reset => {
            next = TimelineState::default();
        }
        Action::SetLoading { id, loading } => {
            next.instance_mut(*id).loading = *loading;
        }
        Action::ChangeTracks { id, tracks } => {
            for selection in tracks {
                next = reduce(&next, &delegate_track_change(*id, selection));
            }
        }
        Action::ShowTrack { id, name, order } => {
            show_track(next.instance_mut(*id), *name, *order);
        }
        Action::HideTrack { id, name } => {
            hide_track(next.instance_mut(*id), *name);
        }
        Action::UpdateData { id, subjects } => {
            let inst = next.instance_mut(*id);
            for fetched in subjects {
                if let Some(existing) = inst.subjects.get_mut(&fetched.subject_id) {
                    existing.tracks = fetched.tracks.clone();
                }
            }
        }
        Action::ChangePage { id, page } => {
            change_page(next.instance_mut(*id), *page);
        }
        Action::UpdateZoom { id, zoom } => match zoom {
            Some(explicit) => next.instance_mut(*id).zoom = Some(*explicit),
            None => derive_zoom(next.instance_mut(*id)),
        },
        Action::ExpandOrCollapseTrack { id, expansion } => {
            expand_or_collapse(next.instance_mut(*id), expansion);
        }
        Action::ChangeDayZero { id, day_zero } => {
            next.instance_mut(*id).day_zero = *day_zero;
        }
        Action::ChangeDayZeroOptions { id, options } => {
            next.instance_mut(*id).day_zero_options = options.clone();
        }
        Action::ChangeLabsYAxisValue { id, value } => {
            next.instance_mut(*id).labs_y_axis_value = Some(value.clone());
        }
        Action::ChangeSpirometryYAxisValue { id, value } => {
            next.instance_mut(*id).spirometry_y_axis_value = Some(value.clone());
        }
        Action::ChangeEcgYAxisValue { id, value } => {
            next.instance_mut(*id).ecg_y_axis_value = Some(value.clone());
        }
        Action::ChangeVitalsYAxisValue { id, value } => {
            next.instance_mut(*id).vitals_y_axis_value = Some(value.clone());
        }
        Action::ChangeEcgWarnings { id, warnings } => {
            next.instance_mut(*id).ecg_warnings = warnings.clone();
        }
        Action::ChangePerformedJumpFlag { id, performed_jump } => {
            next.instance_mut(*id).performed_jump = *performed_jump;
        }
        Action::UpdatePlotBands { id, band, modifier } => {
            let bands = &mut next.instance_mut(*id).plot_bands;
            if *modifier {
                // Toggle membership of the exact band
                if let Some(pos) = bands.iter().position(|b| b == band) {
                    bands.remove(pos);
                } else {
                    bands.push(*band);
                }
            } else if bands.len() == 1 && bands[0] == *band {
                bands.clear();
            } else {
                *bands = vec![*band];
            }
        }
        Action::UpdateInitialized { id, initialized } => match id {
            Some(id) => next.instance_mut(*id).initialized = *initialized,
            None => {
                next.compare_subjects.initialized = *initialized;
                next.subject_profile.initialized = *initialized;
            }
        },
        Action::Noop => {}
    }
    next
}

fn delegate_track_change(id: TimelineId, selection: &TrackSelection) -> Action {
    if selection.selected {
        Action::ShowTrack {
            id,
            name: selection.name,
            order: selection.order.unwrap_or(0),
        }
    } else {
        Action::HideTrack {
            id,
            name: selection.name,
        }
    }
}

fn apply_initial_opening_state(inst: &mut InstanceState) {
    let template = inst.initial_opening_state.clone();
    for track in &mut inst.tracks {
        if let Some(t) = template.track(track.name) {
            track.expansion_level = t.expansion_level;
            track.selected = true;
            // Keep a live order if one is already assigned
            track.order = track.order.or(t.order);
        }
    }
}

fn set_possible_subjects(inst: &mut InstanceState, subject_ids: &[SubjectId]) {
    let seed: Vec<Track> = inst
        .tracks
        .iter()
        .filter(|t| t.selected)
        .map(Track::without_data)
        .collect();
    let old = std::mem::take(&mut inst.subjects);
    for subject_id in subject_ids {
        let mut tracks = seed.clone();
        if let Some(previous) = old.get(subject_id) {
            for track in &mut tracks {
                if let Some(prev) = previous.track(track.name) {
                    track.expansion_level = prev.expansion_level;
                }
            }
        }
        inst.subjects
            .insert(subject_id.clone(), Subject::new(subject_id.clone(), tracks));
    }
    // Invalid window forces a fresh page request
    inst.page = Page::INVALID;
    inst.displayed_subjects.clear();
}

fn show_track(inst: &mut InstanceState, name: TrackName, order: i32) {
    let mut expansion_level = 1;
    if let Some(def) = inst.tracks.iter_mut().find(|t| t.name == name) {
        def.selected = true;
        def.order = Some(order);
        expansion_level = def.expansion_level;
    }
    for subject in inst.subjects.values_mut() {
        subject.tracks.push(Track {
            expansion_level,
            ..Track::selected(name, order)
        });
    }
}

fn hide_track(inst: &mut InstanceState, name: TrackName) {
    // The definition list is sorted by order before the mutation and by
    // name afterward; surviving orders are never renumbered.
    inst.tracks
        .sort_by_key(|t| t.order.unwrap_or(i32::MAX));
    if let Some(def) = inst.tracks.iter_mut().find(|t| t.name == name) {
        def.selected = false;
        def.order = None;
    }
    for subject in inst.subjects.values_mut() {
        subject.tracks.retain(|t| t.name != name);
    }
    inst.tracks.sort_by_key(|t| t.name.as_str());
}

fn change_page(inst: &mut InstanceState, page: Page) {
    inst.page = page;
    // Everything currently held is stale for the new window
    for subject in inst.subjects.values_mut() {
        for track in &mut subject.tracks {
            track.changed = true;
        }
    }
    inst.displayed_subjects = if page.is_valid() {
        inst.subjects
            .keys()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect()
    } else {
        Vec::new()
    };
}

fn derive_zoom(inst: &mut InstanceState) {
    let mut abs_min = 0.0f64;
    let mut abs_max = 0.0f64;
    for subject in inst.subjects.values() {
        for track in &subject.tracks {
            for point in &track.data {
                abs_min = abs_min.min(point.start.day_hour);
                abs_max = abs_max.max(point.start.day_hour);
                if let Some(end) = &point.end {
                    abs_min = abs_min.min(end.day_hour);
                    abs_max = abs_max.max(end.day_hour);
                }
            }
        }
    }
    let pad = ZOOM_PADDING * (abs_max - abs_min);
    let (abs_min, abs_max) = (abs_min - pad, abs_max + pad);

    match inst.zoom {
        Some(existing)
            if abs_max == abs_min
                && existing.abs_min == abs_min
                && existing.abs_max == abs_max => {}
        Some(existing) if existing.zoomed => {
            // A user-narrowed window survives reloads verbatim
            inst.zoom = Some(Zoom {
                abs_min,
                abs_max,
                zoom_min: existing.zoom_min,
                zoom_max: existing.zoom_max,
                zoomed: true,
            });
        }
        _ => {
            // Default the window to [0, max] when the data reaches past
            // day zero, so pre-baseline days do not dominate the view
            let (zoom_min, zoom_max) = if abs_max - pad > 0.0 {
                (0.0, abs_max)
            } else {
                (abs_min, abs_max)
            };
            inst.zoom = Some(Zoom {
                abs_min,
                abs_max,
                zoom_min,
                zoom_max,
                zoomed: false,
            });
        }
    }
}

fn expand_or_collapse(inst: &mut InstanceState, expansion: &TrackExpansion) {
    let delta = if expansion.expand { 1 } else { -1 };
    for (subject_id, subject) in inst.subjects.iter_mut() {
        if let Some(target) = &expansion.subject_id {
            if subject_id != target {
                continue;
            }
        }
        for track in &mut subject.tracks {
            if track.name == expansion.name && track.expansion_level == expansion.expansion_level {
                track.expansion_level = (track.expansion_level + delta).max(1);
                track.changed = true;
            } else {
                track.changed = false;
            }
        }
    }
    // The shared definition follows only when the change applies to
    // every subject
    if expansion.subject_id.is_none() {
        if let Some(def) = inst
            .tracks
            .iter_mut()
            .find(|t| t.name == expansion.name && t.expansion_level == expansion.expansion_level)
        {
            def.expansion_level = (def.expansion_level + delta).max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Actions;
    use crate::model::{DataPoint, PlotBand, TimelineId};

    const ID: TimelineId = TimelineId::CompareSubjects;

    fn actions() -> Actions {
        Actions::new(ID)
    }

    fn state_with_tracks(tracks: Vec<Track>) -> TimelineState {
        let mut state = TimelineState::default();
        state.compare_subjects.tracks = tracks;
        state
    }

    fn populate(state: TimelineState, subject_ids: &[&str]) -> TimelineState {
        reduce(
            &state,
            &actions().set_possible_subjects(subject_ids.iter().map(|s| s.to_string()).collect()),
        )
    }

    fn subject_with_points(id: &str, name: TrackName, points: Vec<DataPoint>) -> Subject {
        Subject::new(
            id,
            vec![Track {
                data: points,
                ..Track::selected(name, 1)
            }],
        )
    }

    #[test]
    fn zoom_auto_derive_pads_bounds_and_starts_at_day_zero() {
        let state = state_with_tracks(vec![Track::selected(TrackName::AdverseEvents, 1)]);
        let state = populate(state, &["S1"]);
        let state = reduce(
            &state,
            &actions().update_data(vec![subject_with_points(
                "S1",
                TrackName::AdverseEvents,
                vec![DataPoint::at(-3.0), DataPoint::spanning(2.0, 20.0)],
            )]),
        );
        let state = reduce(&state, &actions().update_zoom(None));

        let zoom = state.compare_subjects.zoom.expect("zoom derived");
        assert!((zoom.abs_min - (-3.0 - 1.15)).abs() < 1e-9);
        assert!((zoom.abs_max - (20.0 + 1.15)).abs() < 1e-9);
        assert_eq!(zoom.zoom_min, 0.0);
        assert_eq!(zoom.zoom_max, zoom.abs_max);
        assert!(!zoom.zoomed);
    }

    #[test]
    fn zoom_auto_derive_preserves_user_narrowed_window() {
        let state = state_with_tracks(vec![Track::selected(TrackName::Labs, 1)]);
        let state = populate(state, &["S1"]);
        let state = reduce(
            &state,
            &actions().update_data(vec![subject_with_points(
                "S1",
                TrackName::Labs,
                vec![DataPoint::at(0.0), DataPoint::at(40.0)],
            )]),
        );
        let state = reduce(
            &state,
            &actions().update_zoom(Some(Zoom {
                abs_min: 0.0,
                abs_max: 40.0,
                zoom_min: 5.0,
                zoom_max: 10.0,
                zoomed: true,
            })),
        );
        let state = reduce(&state, &actions().update_zoom(None));

        let zoom = state.compare_subjects.zoom.unwrap();
        assert_eq!(zoom.zoom_min, 5.0);
        assert_eq!(zoom.zoom_max, 10.0);
        assert!(zoom.zoomed);
        assert!((zoom.abs_max - 42.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_auto_derive_uses_full_range_for_all_negative_data() {
        let state = state_with_tracks(vec![Track::selected(TrackName::Labs, 1)]);
        let state = populate(state, &["S1"]);
        let state = reduce(
            &state,
            &actions().update_data(vec![subject_with_points(
                "S1",
                TrackName::Labs,
                vec![DataPoint::at(-30.0), DataPoint::at(-10.0)],
            )]),
        );
        let state = reduce(&state, &actions().update_zoom(None));

        // abs_max is seeded at 0, so the raw range is [-30, 0]
        let zoom = state.compare_subjects.zoom.unwrap();
        assert_eq!(zoom.zoom_min, zoom.abs_min);
        assert_eq!(zoom.zoom_max, zoom.abs_max);
    }

    #[test]
    fn zoom_degenerate_bounds_are_a_no_op() {
        let mut state = state_with_tracks(vec![]);
        state.compare_subjects.zoom = Some(Zoom {
            abs_min: 0.0,
            abs_max: 0.0,
            zoom_min: 0.0,
            zoom_max: 0.0,
            zoomed: false,
        });
        let next = reduce(&state, &actions().update_zoom(None));
        assert_eq!(next, state);
    }

    #[test]
    fn plot_band_modifier_toggles_membership() {
        let band = PlotBand::new(1.0, 2.0);
        let other = PlotBand::new(3.0, 4.0);
        let state = TimelineState::default();

        let state = reduce(&state, &actions().update_plot_bands(band, true));
        assert_eq!(state.compare_subjects.plot_bands, vec![band]);

        let state = reduce(&state, &actions().update_plot_bands(other, true));
        assert_eq!(state.compare_subjects.plot_bands, vec![band, other]);

        let state = reduce(&state, &actions().update_plot_bands(band, true));
        assert_eq!(state.compare_subjects.plot_bands, vec![other]);

        let state = reduce(&state, &actions().update_plot_bands(other, true));
        assert!(state.compare_subjects.plot_bands.is_empty());
    }

    #[test]
    fn plot_band_without_modifier_replaces_or_clears() {
        let band = PlotBand::new(1.0, 2.0);
        let other = PlotBand::new(3.0, 4.0);
        let third = PlotBand::new(5.0, 6.0);
        let state = TimelineState::default();

        let state = reduce(&state, &actions().update_plot_bands(band, true));
        let state = reduce(&state, &actions().update_plot_bands(other, true));
        let state = reduce(&state, &actions().update_plot_bands(third, false));
        assert_eq!(state.compare_subjects.plot_bands, vec![third]);

        // Re-selecting the sole existing band clears the list
        let state = reduce(&state, &actions().update_plot_bands(third, false));
        assert!(state.compare_subjects.plot_bands.is_empty());
    }

    #[test]
    fn change_page_slices_candidates_in_order() {
        let ids: Vec<String> = (0..25).map(|i| format!("S{i:02}")).collect();
        let state = state_with_tracks(vec![Track::selected(TrackName::Summary, 1)]);
        let state = reduce(&state, &actions().set_possible_subjects(ids.clone()));

        let state = reduce(&state, &actions().change_page(Page::new(20, 0)));
        assert_eq!(state.compare_subjects.displayed_subjects.len(), 20);
        assert_eq!(state.compare_subjects.displayed_subjects, ids[..20]);

        let state = reduce(&state, &actions().change_page(Page::new(20, 20)));
        assert_eq!(state.compare_subjects.displayed_subjects, ids[20..]);
    }

    #[test]
    fn change_page_marks_every_track_stale() {
        let state = state_with_tracks(vec![Track::selected(TrackName::Dose, 1)]);
        let state = populate(state, &["S1", "S2"]);
        let state = reduce(&state, &actions().change_page(Page::new(10, 0)));
        for subject in state.compare_subjects.subjects.values() {
            assert!(subject.tracks.iter().all(|t| t.changed));
        }
    }

    #[test]
    fn hide_track_removes_entries_without_renumbering() {
        let state = state_with_tracks(vec![
            Track::selected(TrackName::Summary, 1),
            Track::selected(TrackName::Dose, 2),
            Track::selected(TrackName::Labs, 3),
        ]);
        let state = populate(state, &["S1", "S2"]);
        let state = reduce(&state, &actions().hide_track(TrackName::Dose));

        let inst = &state.compare_subjects;
        let dose = inst.tracks.iter().find(|t| t.name == TrackName::Dose).unwrap();
        assert!(!dose.selected);
        assert_eq!(dose.order, None);

        let summary = inst.tracks.iter().find(|t| t.name == TrackName::Summary).unwrap();
        let labs = inst.tracks.iter().find(|t| t.name == TrackName::Labs).unwrap();
        assert_eq!(summary.order, Some(1));
        assert_eq!(labs.order, Some(3));

        for subject in inst.subjects.values() {
            assert!(subject.track(TrackName::Dose).is_none());
            assert!(subject.track(TrackName::Summary).is_some());
            assert!(subject.track(TrackName::Labs).is_some());
        }
    }

    #[test]
    fn show_track_pushes_fresh_entry_into_every_subject() {
        let state = state_with_tracks(vec![
            Track::selected(TrackName::Summary, 1),
            Track::new(TrackName::Vitals),
        ]);
        let state = populate(state, &["S1", "S2"]);
        let state = reduce(&state, &actions().show_track(TrackName::Vitals, 2));

        let inst = &state.compare_subjects;
        let def = inst.tracks.iter().find(|t| t.name == TrackName::Vitals).unwrap();
        assert!(def.selected);
        assert_eq!(def.order, Some(2));
        for subject in inst.subjects.values() {
            let track = subject.track(TrackName::Vitals).unwrap();
            assert!(track.data.is_empty());
            assert_eq!(track.order, Some(2));
        }
    }

    #[test]
    fn change_tracks_delegates_per_selection() {
        let state = state_with_tracks(vec![
            Track::selected(TrackName::Summary, 1),
            Track::new(TrackName::Ecg),
        ]);
        let state = populate(state, &["S1"]);
        let state = reduce(
            &state,
            &actions().change_tracks(vec![
                TrackSelection {
                    name: TrackName::Ecg,
                    selected: true,
                    order: Some(2),
                },
                TrackSelection {
                    name: TrackName::Summary,
                    selected: false,
                    order: None,
                },
            ]),
        );

        let inst = &state.compare_subjects;
        assert!(inst.tracks.iter().find(|t| t.name == TrackName::Ecg).unwrap().selected);
        assert!(!inst.tracks.iter().find(|t| t.name == TrackName::Summary).unwrap().selected);
        let subject = &inst.subjects["S1"];
        assert!(subject.track(TrackName::Ecg).is_some());
        assert!(subject.track(TrackName::Summary).is_none());
    }

    #[test]
    fn apply_initial_opening_state_is_idempotent() {
        let mut state = state_with_tracks(vec![
            Track::new(TrackName::Summary),
            Track::new(TrackName::Dose),
            Track::new(TrackName::HealthcareEncounters),
        ]);
        state.compare_subjects.initial_opening_state = InitialOpeningState {
            tracks: vec![
                TrackTemplate {
                    name: TrackName::Summary,
                    order: Some(1),
                    expansion_level: 2,
                },
                TrackTemplate {
                    name: TrackName::Dose,
                    order: Some(2),
                    expansion_level: 1,
                },
            ],
        };

        let once = reduce(&state, &actions().apply_initial_opening_state());
        let twice = reduce(&once, &actions().apply_initial_opening_state());
        assert_eq!(once.compare_subjects.tracks, twice.compare_subjects.tracks);

        let summary = once
            .compare_subjects
            .tracks
            .iter()
            .find(|t| t.name == TrackName::Summary)
            .unwrap();
        assert!(summary.selected);
        assert_eq!(summary.order, Some(1));
        assert_eq!(summary.expansion_level, 2);

        // Tracks absent from the template pass through unchanged
        let untouched = once
            .compare_subjects
            .tracks
            .iter()
            .find(|t| t.name == TrackName::HealthcareEncounters)
            .unwrap();
        assert!(!untouched.selected);
    }

    #[test]
    fn apply_initial_opening_state_keeps_assigned_live_order() {
        let mut state = state_with_tracks(vec![Track::selected(TrackName::Labs, 7)]);
        state.compare_subjects.initial_opening_state = InitialOpeningState {
            tracks: vec![TrackTemplate {
                name: TrackName::Labs,
                order: Some(3),
                expansion_level: 1,
            }],
        };
        let state = reduce(&state, &actions().apply_initial_opening_state());
        let labs = &state.compare_subjects.tracks[0];
        assert_eq!(labs.order, Some(7));
    }

    #[test]
    fn save_track_initial_opening_state_snapshots_selected_tracks() {
        let state = state_with_tracks(vec![
            Track {
                expansion_level: 3,
                ..Track::selected(TrackName::Ecg, 1)
            },
            Track::new(TrackName::Dose),
        ]);
        let state = reduce(&state, &actions().save_track_initial_opening_state());
        let template = &state.compare_subjects.initial_opening_state;
        assert_eq!(template.tracks.len(), 1);
        assert_eq!(template.tracks[0].name, TrackName::Ecg);
        assert_eq!(template.tracks[0].expansion_level, 3);
    }

    #[test]
    fn set_possible_subjects_carries_expansion_for_known_subjects() {
        let state = state_with_tracks(vec![Track::selected(TrackName::Labs, 1)]);
        let state = populate(state, &["S1"]);
        let state = reduce(
            &state,
            &actions().expand_or_collapse_track(TrackExpansion {
                name: TrackName::Labs,
                expansion_level: 1,
                expand: true,
                subject_id: None,
            }),
        );
        let state = populate(state, &["S1", "S2"]);

        let inst = &state.compare_subjects;
        assert_eq!(inst.subjects["S1"].track(TrackName::Labs).unwrap().expansion_level, 2);
        // New subjects get the current definition level
        assert_eq!(inst.subjects["S2"].track(TrackName::Labs).unwrap().expansion_level, 2);
        assert_eq!(inst.page, Page::INVALID);
        assert!(inst.displayed_subjects.is_empty());
    }

    #[test]
    fn expand_or_collapse_clears_other_tracks_dirty_flags() {
        let state = state_with_tracks(vec![
            Track::selected(TrackName::Labs, 1),
            Track::selected(TrackName::Vitals, 2),
        ]);
        let state = populate(state, &["S1"]);
        let state = reduce(&state, &actions().change_page(Page::new(10, 0)));
        let state = reduce(
            &state,
            &actions().expand_or_collapse_track(TrackExpansion {
                name: TrackName::Labs,
                expansion_level: 1,
                expand: true,
                subject_id: Some("S1".to_string()),
            }),
        );

        let subject = &state.compare_subjects.subjects["S1"];
        let labs = subject.track(TrackName::Labs).unwrap();
        assert_eq!(labs.expansion_level, 2);
        assert!(labs.changed);
        assert!(!subject.track(TrackName::Vitals).unwrap().changed);
    }

    #[test]
    fn collapse_clamps_expansion_at_one() {
        let state = state_with_tracks(vec![Track::selected(TrackName::Labs, 1)]);
        let state = populate(state, &["S1"]);
        let state = reduce(
            &state,
            &actions().expand_or_collapse_track(TrackExpansion {
                name: TrackName::Labs,
                expansion_level: 1,
                expand: false,
                subject_id: None,
            }),
        );
        let subject = &state.compare_subjects.subjects["S1"];
        assert_eq!(subject.track(TrackName::Labs).unwrap().expansion_level, 1);
    }

    #[test]
    fn instances_are_isolated() {
        let state = TimelineState::default();
        let state = reduce(
            &state,
            &Actions::new(TimelineId::SubjectProfile).set_loading(true),
        );
        assert!(state.subject_profile.loading);
        assert!(!state.compare_subjects.loading);
        assert_eq!(state.compare_subjects, InstanceState::default());
    }

    #[test]
    fn set_initial_opening_state_forces_cold_reload() {
        let state = state_with_tracks(vec![Track::selected(TrackName::Summary, 1)]);
        let state = populate(state, &["S1"]);
        let state = reduce(
            &state,
            &actions().set_initial_opening_state(
                vec![TrackTemplate {
                    name: TrackName::Ecg,
                    order: Some(1),
                    expansion_level: 2,
                }],
                false,
                true,
            ),
        );
        let inst = &state.compare_subjects;
        assert!(inst.subjects.is_empty());
        assert!(inst.tracks.is_empty());
        assert!(inst.displayed_subjects.is_empty());
        assert!(!inst.initialized);
        assert!(inst.performed_jump);
        assert_eq!(inst.initial_opening_state.tracks.len(), 1);
    }

    #[test]
    fn change_study_selection_resets_only_named_template() {
        let mut state = TimelineState::default();
        state.compare_subjects.initial_opening_state = InitialOpeningState { tracks: vec![] };
        state.subject_profile.initial_opening_state = InitialOpeningState { tracks: vec![] };
        let state = reduce(&state, &actions().change_study_selection());
        assert_eq!(
            state.compare_subjects.initial_opening_state,
            InitialOpeningState::app_default()
        );
        assert!(state.subject_profile.initial_opening_state.tracks.is_empty());
    }

    #[test]
    fn update_initialized_without_id_flips_both() {
        let state = TimelineState::default();
        let state = reduce(
            &state,
            &Action::UpdateInitialized {
                id: None,
                initialized: true,
            },
        );
        assert!(state.compare_subjects.initialized);
        assert!(state.subject_profile.initialized);
    }

    #[test]
    fn reset_restores_default_state() {
        let state = state_with_tracks(vec![Track::selected(TrackName::Summary, 1)]);
        let state = populate(state, &["S1"]);
        let state = reduce(&state, &Action::Reset);
        assert_eq!(state, TimelineState::default());
    }

    #[test]
    fn noop_leaves_state_untouched() {
        let state = populate(
            state_with_tracks(vec![Track::selected(TrackName::Summary, 1)]),
            &["S1"],
        );
        assert_eq!(reduce(&state, &Action::Noop), state);
    }
}
