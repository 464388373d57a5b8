//! Orchestration layer for the clinical timeline engine
//!
//! One [`TimelineController`] per timeline instance binds UI operations
//! to asynchronous fetch pipelines against a
//! [`ct_core::TimelineDataSource`], and listens to the upstream filter
//! streams via the [`FilterHub`].

pub mod controller;
pub mod filters;
pub mod pipeline;

// Re-export commonly used types
pub use controller::TimelineController;
pub use filters::{FilterChange, FilterHub, FilterKind};
pub use pipeline::{PipelineCategory, PipelineGenerations};
