//! Deterministic in-memory data source
//!
//! Serves generated clinical data for demos and for exercising the
//! orchestration pipelines in tests. All payloads are a pure function of
//! the subject index and the requested day zero, so repeated fetches are
//! reproducible. An optional artificial latency makes in-flight
//! supersession observable.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use ct_core::data::TimelineDataSource;
use ct_core::model::{
    DataPoint, DayZero, DayZeroOption, PointMetadata, Subject, SubjectId, Track, TrackName,
};

use crate::DataError;

/// In-memory source over a fixed set of generated subjects
pub struct InMemorySource {
    subject_count: usize,
    latency: Option<Duration>,
    track_data_calls: AtomicUsize,
    subject_calls: AtomicUsize,
}

impl InMemorySource {
    /// A source serving the given number of generated subjects
    pub fn with_subjects(subject_count: usize) -> Self {
        Self {
            subject_count,
            latency: None,
            track_data_calls: AtomicUsize::new(0),
            subject_calls: AtomicUsize::new(0),
        }
    }

    /// Add an artificial delay before every fetch completes
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `get_track_data` calls served so far
    pub fn track_data_calls(&self) -> usize {
        self.track_data_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_possible_subjects` calls served so far
    pub fn subject_calls(&self) -> usize {
        self.subject_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn subject_ids(&self) -> Vec<SubjectId> {
        (1..=self.subject_count)
            .map(|i| format!("SUBJ-{i:04}"))
            .collect()
    }

    fn subject_index(&self, subject_id: &str) -> Result<usize, DataError> {
        self.subject_ids()
            .iter()
            .position(|id| id == subject_id)
            .ok_or_else(|| DataError::UnknownSubject(subject_id.to_string()))
    }

    fn build_subject(&self, subject_id: &SubjectId, day_zero: DayZero) -> Result<Subject, DataError> {
        let idx = self.subject_index(subject_id)?;
        let shift = day_zero_shift(day_zero);
        let tracks = vec![
            dose_track(idx, shift),
            adverse_events_track(idx, shift),
            labs_track(idx, shift),
            ecg_track(idx, shift),
        ];
        Ok(Subject::new(subject_id.clone(), tracks))
    }
}

#[async_trait]
impl TimelineDataSource for InMemorySource {
    async fn fetch_day_zero_options(&self) -> anyhow::Result<Vec<DayZeroOption>> {
        self.simulate_latency().await;
        Ok(vec![
            DayZeroOption {
                day_zero: DayZero::FirstDose,
                label: "Days since first dose".to_string(),
            },
            DayZeroOption {
                day_zero: DayZero::Randomization,
                label: "Days since randomization".to_string(),
            },
            DayZeroOption {
                day_zero: DayZero::ScreeningVisit,
                label: "Days since screening visit".to_string(),
            },
        ])
    }

    async fn get_possible_tracks(&self) -> anyhow::Result<Vec<Track>> {
        self.simulate_latency().await;
        Ok(vec![
            Track::new(TrackName::Summary),
            Track::new(TrackName::Dose),
            Track::new(TrackName::AdverseEvents),
            Track::new(TrackName::Labs),
            Track::new(TrackName::Vitals),
            Track::new(TrackName::Ecg),
        ])
    }

    async fn get_possible_subjects(
        &self,
        day_zero: DayZero,
        selected_tracks: &[TrackName],
    ) -> anyhow::Result<Vec<SubjectId>> {
        self.simulate_latency().await;
        self.subject_calls.fetch_add(1, Ordering::SeqCst);
        debug!(
            ?day_zero,
            tracks = selected_tracks.len(),
            "serving candidate subjects"
        );
        Ok(self.subject_ids())
    }

    async fn get_track_data(
        &self,
        displayed_subjects: &[SubjectId],
        day_zero: DayZero,
    ) -> anyhow::Result<Vec<Subject>> {
        self.simulate_latency().await;
        self.track_data_calls.fetch_add(1, Ordering::SeqCst);
        debug!(subjects = displayed_subjects.len(), "serving track data");
        let mut subjects = Vec::with_capacity(displayed_subjects.len());
        for subject_id in displayed_subjects {
            subjects.push(self.build_subject(subject_id, day_zero)?);
        }
        Ok(subjects)
    }

    fn source_name(&self) -> &str {
        "in-memory"
    }
}

/// Day-hour offset a day-zero selection introduces in the generated data
fn day_zero_shift(day_zero: DayZero) -> f64 {
    match day_zero {
        DayZero::FirstDose => 0.0,
        DayZero::Randomization => 2.0,
        DayZero::ScreeningVisit => 5.0,
    }
}

fn dose_track(idx: usize, shift: f64) -> Track {
    let stagger = (idx % 2) as f64 * 0.5;
    let data = (0..3)
        .map(|week| {
            let start = week as f64 * 7.0 + stagger + shift;
            DataPoint::spanning(start, start + 5.0)
        })
        .collect();
    Track {
        data,
        ..Track::selected(TrackName::Dose, 2)
    }
}

fn adverse_events_track(idx: usize, shift: f64) -> Track {
    let onset = -3.0 + (idx % 3) as f64 + shift;
    Track {
        data: vec![
            DataPoint::at(onset),
            DataPoint::spanning(2.0 + shift, 20.0 + shift),
        ],
        ..Track::selected(TrackName::AdverseEvents, 3)
    }
}

fn labs_track(idx: usize, shift: f64) -> Track {
    let data = (0..5)
        .map(|visit| DataPoint::at(visit as f64 * 4.0 + (idx % 2) as f64 + shift))
        .collect();
    Track {
        data,
        ..Track::selected(TrackName::Labs, 4)
    }
}

fn ecg_track(idx: usize, shift: f64) -> Track {
    let sex = if idx % 2 == 0 { "M" } else { "F" };
    let qtcf = 400.0 + (idx * 17 % 95) as f64;
    let data = (0..3)
        .map(|visit| DataPoint {
            metadata: PointMetadata {
                sex: Some(sex.to_string()),
                abnormality: Some(if qtcf >= 470.0 { "YES" } else { "N" }.to_string()),
                significant: Some("N".to_string()),
                qtcf_value: Some(qtcf),
                qtcf_change: Some(qtcf - 410.0),
                test_name: Some("QTcF interval".to_string()),
                value_raw: Some(qtcf),
                value_change_from_baseline: Some(qtcf - 410.0),
                ..PointMetadata::default()
            },
            ..DataPoint::at(visit as f64 * 6.0 + shift)
        })
        .collect();
    Track {
        data,
        ..Track::selected(TrackName::Ecg, 6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_deterministic_subject_set() {
        let source = InMemorySource::with_subjects(3);
        let first = source
            .get_possible_subjects(DayZero::FirstDose, &[TrackName::Labs])
            .await
            .unwrap();
        let second = source
            .get_possible_subjects(DayZero::FirstDose, &[TrackName::Labs])
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec!["SUBJ-0001", "SUBJ-0002", "SUBJ-0003"]);
        assert_eq!(source.subject_calls(), 2);
    }

    #[tokio::test]
    async fn track_data_shifts_with_day_zero() {
        let source = InMemorySource::with_subjects(1);
        let base = source
            .get_track_data(&["SUBJ-0001".to_string()], DayZero::FirstDose)
            .await
            .unwrap();
        let shifted = source
            .get_track_data(&["SUBJ-0001".to_string()], DayZero::Randomization)
            .await
            .unwrap();
        let base_start = base[0].track(TrackName::Labs).unwrap().data[0].start.day_hour;
        let shifted_start = shifted[0].track(TrackName::Labs).unwrap().data[0].start.day_hour;
        assert_eq!(shifted_start - base_start, 2.0);
    }

    #[tokio::test]
    async fn unknown_subject_is_an_error() {
        let source = InMemorySource::with_subjects(1);
        let result = source
            .get_track_data(&["SUBJ-9999".to_string()], DayZero::FirstDose)
            .await;
        assert!(result.is_err());
    }
}
