//! Per-category pipeline supersession
//!
//! Every orchestration pipeline belongs to one category. Starting a
//! pipeline bumps that category's generation counter; in-flight work of
//! the same category observes the bump at its next checkpoint and stops
//! before writing anything further. Categories do not exclude each
//! other: pipelines of different categories interleave freely.

use std::sync::atomic::{AtomicU64, Ordering};

/// The action categories that run as independent async pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineCategory {
    Init,
    Page,
    TrackSelection,
    Expansion,
    Filter,
    DayZero,
    AxisValue,
}

impl PipelineCategory {
    const COUNT: usize = 7;

    fn index(&self) -> usize {
        match self {
            PipelineCategory::Init => 0,
            PipelineCategory::Page => 1,
            PipelineCategory::TrackSelection => 2,
            PipelineCategory::Expansion => 3,
            PipelineCategory::Filter => 4,
            PipelineCategory::DayZero => 5,
            PipelineCategory::AxisValue => 6,
        }
    }
}

/// One generation counter per pipeline category
#[derive(Debug, Default)]
pub struct PipelineGenerations {
    counters: [AtomicU64; PipelineCategory::COUNT],
}

impl PipelineGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pipeline of the category, superseding any in-flight one
    pub fn begin(&self, category: PipelineCategory) -> u64 {
        self.counters[category.index()].fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether the pipeline holding `generation` is still the newest one
    pub fn is_current(&self, category: PipelineCategory, generation: u64) -> bool {
        self.counters[category.index()].load(Ordering::SeqCst) == generation
    }

    /// Invalidate every in-flight pipeline at its next checkpoint
    pub fn cancel_all(&self) {
        for counter in &self.counters {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}
