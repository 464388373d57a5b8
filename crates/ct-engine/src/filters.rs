//! Upstream filter-change notifications
//!
//! The filter models live outside the engine; this module is the narrow
//! interface through which their change events reach the controllers.
//! Each filter domain has its own independent broadcast stream.

use ahash::AHashMap;
use tokio::sync::broadcast;

/// The filter domains the timeline listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Population,
    AdverseEvents,
    Dose,
    Labs,
    LungFunction,
    Conmeds,
    Vitals,
    PatientReportedData,
    Cardiac,
    Exacerbations,
}

impl FilterKind {
    pub const ALL: [FilterKind; 10] = [
        FilterKind::Population,
        FilterKind::AdverseEvents,
        FilterKind::Dose,
        FilterKind::Labs,
        FilterKind::LungFunction,
        FilterKind::Conmeds,
        FilterKind::Vitals,
        FilterKind::PatientReportedData,
        FilterKind::Cardiac,
        FilterKind::Exacerbations,
    ];
}

/// One change notification from a filter model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterChange {
    pub kind: FilterKind,
    /// True when the change amounts to "no filter applied"
    pub empty: bool,
}

/// Fan-out point for the ten filter streams
pub struct FilterHub {
    channels: AHashMap<FilterKind, broadcast::Sender<FilterChange>>,
}

impl FilterHub {
    pub fn new() -> Self {
        Self {
            channels: FilterKind::ALL
                .iter()
                .map(|kind| (*kind, broadcast::channel(64).0))
                .collect(),
        }
    }

    /// Publish a change on its domain's stream; dropped when nobody listens
    pub fn publish(&self, change: FilterChange) {
        if let Some(sender) = self.channels.get(&change.kind) {
            let _ = sender.send(change);
        }
    }

    /// Subscribe to one domain's stream
    pub fn subscribe(&self, kind: FilterKind) -> broadcast::Receiver<FilterChange> {
        self.channels[&kind].subscribe()
    }
}

impl Default for FilterHub {
    fn default() -> Self {
        Self::new()
    }
}
