//! phaselab-runner: multi-degree Wyckoff cycle analysis.
//!
//! Runs the phaselab-core pipeline at several structural degrees of the
//! same series (wider swings and longer volume windows for higher degrees,
//! tighter for lower) and collects the per-degree snapshots into one
//! serializable result.

pub mod analysis;
pub mod config;
pub mod result;

pub use analysis::{AnalysisError, CycleAnalysis, CycleAnalysisBuilder};
pub use config::DegreeConfig;
pub use result::{CycleAnalysisResult, CycleSnapshot, DegreeAnalysis, PhaseTransition};
