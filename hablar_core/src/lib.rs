#![forbid(unsafe_code)]

//! Core domain model and business logic for the Hablar Spanish course.
//!
//! This crate provides:
//! - Domain types (lessons, exercises, progress, stats, achievements)
//! - Answer normalization and grading
//! - Level gating of lessons
//! - Achievement and stats derivation
//! - Catalog management
//! - Persistence (WAL, CSV archive, history)
//! - The lesson service seam used by front-ends

pub mod types;
pub mod error;
pub mod normalize;
pub mod gate;
pub mod scoring;
pub mod achievements;
pub mod stats;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod wal;
pub mod csv_rollup;
pub mod history;
pub mod service;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use normalize::{compare, normalize};
pub use gate::{progress_map, ProgressGate};
pub use scoring::{grade, score_answers, LessonRun, POINTS_PER_CORRECT};
pub use catalog::{build_default_catalog, default_catalog, Catalog};
pub use config::Config;
pub use wal::{JsonlSink, ProgressSink};
pub use history::load_history;
pub use stats::derive_stats;
pub use service::{LessonService, LocalLessonService, Snapshot};
