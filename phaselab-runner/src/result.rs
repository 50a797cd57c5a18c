//! Serializable analysis result records.

use phaselab_core::wyckoff::WyckoffPhase;
use serde::{Deserialize, Serialize};

use crate::config::DegreeConfig;

/// One recorded cycle/phase change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub index: usize,
    pub phase: WyckoffPhase,
    pub range_low: f64,
    pub range_high: f64,
}

/// Condensed outcome of running the phase pipeline over one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    /// First index past the warm-up region.
    pub start_index: usize,
    pub end_index: usize,
    pub unstable_bars: usize,
    /// Judgment at the final bar.
    pub final_phase: WyckoffPhase,
    /// Range bounds at the final bar (NaN when never established).
    pub range_low: f64,
    pub range_high: f64,
    pub last_transition_index: Option<usize>,
    /// Every cycle/phase change in order, warm-up region excluded.
    pub transitions: Vec<PhaseTransition>,
}

/// One degree's analysis: the configuration actually used, the series
/// size it saw, and the resulting snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeAnalysis {
    /// Offset relative to the base degree: positive is wider structure.
    pub degree_offset: i32,
    pub bar_count: usize,
    pub config: DegreeConfig,
    pub snapshot: CycleSnapshot,
}

/// Result of a full multi-degree run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleAnalysisResult {
    pub base_degree_offset: i32,
    /// Per-degree analyses, ordered highest degree first.
    pub analyses: Vec<DegreeAnalysis>,
    /// Human-readable notes about skipped degrees.
    pub notes: Vec<String>,
}

impl CycleAnalysisResult {
    /// Analysis at the base degree. Present in every result produced by
    /// [`CycleAnalysis::analyze`](crate::analysis::CycleAnalysis::analyze),
    /// which fails instead of returning a result without it.
    pub fn base_analysis(&self) -> Option<&DegreeAnalysis> {
        self.analyses
            .iter()
            .find(|analysis| analysis.degree_offset == self.base_degree_offset)
    }
}
