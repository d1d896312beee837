//! Freesia Config
//!
//! This crate contains the serializable configuration types for Freesia.
//! A [`PipelineConfig`] is built explicitly and passed to the executor at
//! construction; nothing reads ambient environment state.
//!
//! Configuration can be loaded from:
//! - JSON files (via CLI with `--config=freesia.json`)
//! - Defaults (`PipelineConfig::default()` is a complete working demo setup)

mod pipeline;

pub use pipeline::{ActionConfig, JobConfig, PipelineConfig};
