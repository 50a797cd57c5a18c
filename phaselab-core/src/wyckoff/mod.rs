//! Wyckoff market-phase inference.
//!
//! Four cooperating pieces, all derived from the same series:
//! - [`StructureTracker`]: trading range from confirmed swing points.
//! - [`VolumeProfile`]: climax / dry-up regime from relative volume.
//! - [`EventDetector`]: per-bar Wyckoff events from structure + volume.
//! - [`WyckoffPhaseIndicator`]: the state machine mapping event streams to
//!   a cycle (accumulation/distribution), phase (A..E) and confidence.

pub mod events;
pub mod phase;
pub mod structure;
pub mod volume;

pub use events::{EventDetector, EventSet, WyckoffEvent};
pub use phase::{WyckoffPhaseBuilder, WyckoffPhaseIndicator};
pub use structure::{StructureSnapshot, StructureTracker};
pub use volume::{VolumeProfile, VolumeSnapshot};

use serde::{Deserialize, Serialize};

/// Which side of the campaign the market is judged to be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleType {
    Accumulation,
    Distribution,
    Unknown,
}

/// Classical Wyckoff phase letters, ordered: a cycle progresses from A
/// (stopping action) through E (trend leaves the range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhaseType {
    A,
    B,
    C,
    D,
    E,
}

/// Phase judgment at a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WyckoffPhase {
    pub cycle: CycleType,
    pub phase: PhaseType,
    /// Confidence in `[0, 1]`; decays while no event refreshes it.
    pub confidence: f64,
    /// Index of the most recent bar that produced any event, if any.
    pub latest_event_index: Option<usize>,
}

impl WyckoffPhase {
    /// The no-information judgment: unknown cycle, phase A, zero
    /// confidence.
    pub const UNKNOWN: WyckoffPhase = WyckoffPhase {
        cycle: CycleType::Unknown,
        phase: PhaseType::A,
        confidence: 0.0,
        latest_event_index: None,
    };

    pub fn is_known(&self) -> bool {
        self.cycle != CycleType::Unknown
    }
}
