//! Clinical warning flags derived from loaded ECG data
//!
//! Recomputation is a single pass over every loaded ECG data point of an
//! instance; each flag is a monotonic OR across the pass. The thresholds
//! follow the QTcF prolongation criteria used by the display layer.

use indexmap::IndexMap;

use crate::model::{EcgWarningKey, EcgWarnings, Subject, SubjectId, TrackName};

/// QTcF prolongation threshold for male subjects, in milliseconds
const QTCF_MALE_THRESHOLD: f64 = 450.0;
/// QTcF prolongation threshold for female subjects, in milliseconds
const QTCF_FEMALE_THRESHOLD: f64 = 480.0;
/// QTcF change-from-baseline threshold, in milliseconds
const QTCF_CHANGE_THRESHOLD: f64 = 60.0;

/// Recompute the warning map from every loaded ECG data point.
///
/// At expansion level 1 the aggregated `qtcf_value`/`qtcf_change` fields
/// are read directly; at deeper levels the per-measurement fields are
/// used, restricted to points whose test name contains "QTCF"
/// (case-insensitive).
pub fn recompute_ecg_warnings(subjects: &IndexMap<SubjectId, Subject>) -> EcgWarnings {
    let mut warnings = EcgWarnings::all_unavailable();
    for subject in subjects.values() {
        for track in subject.tracks.iter().filter(|t| t.name == TrackName::Ecg) {
            for point in &track.data {
                let meta = &point.metadata;
                let (value, change) = if track.expansion_level <= 1 {
                    (meta.qtcf_value, meta.qtcf_change)
                } else {
                    match &meta.test_name {
                        Some(name) if name.to_ascii_uppercase().contains("QTCF") => {
                            (meta.value_raw, meta.value_change_from_baseline)
                        }
                        _ => continue,
                    }
                };

                if flag_set(&meta.abnormality) {
                    warnings.set_available(EcgWarningKey::Abnormal);
                }
                if flag_set(&meta.significant) {
                    warnings.set_available(EcgWarningKey::Significant);
                }
                if let Some(value) = value {
                    if value >= QTCF_MALE_THRESHOLD && is_male(&meta.sex) {
                        warnings.set_available(EcgWarningKey::QtcfMale);
                    }
                    if value >= QTCF_FEMALE_THRESHOLD && is_female(&meta.sex) {
                        warnings.set_available(EcgWarningKey::QtcfFemale);
                    }
                }
                if let Some(change) = change {
                    if change >= QTCF_CHANGE_THRESHOLD {
                        warnings.set_available(EcgWarningKey::QtcfChange);
                    }
                }
            }
        }
    }
    warnings
}

/// A yes/no style field counts as set when present and not a negation
fn flag_set(value: &Option<String>) -> bool {
    match value {
        Some(v) if !v.is_empty() => !matches!(v.to_ascii_uppercase().as_str(), "NO" | "N"),
        _ => false,
    }
}

fn is_male(sex: &Option<String>) -> bool {
    matches!(
        sex.as_deref().map(str::to_ascii_uppercase).as_deref(),
        Some("MALE" | "M")
    )
}

fn is_female(sex: &Option<String>) -> bool {
    matches!(
        sex.as_deref().map(str::to_ascii_uppercase).as_deref(),
        Some("FEMALE" | "F")
    )
}
