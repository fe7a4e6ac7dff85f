//! Snapshot serialization for final simulation state

use ksim_core::{Partition, Pcb, SimState};
use serde::{Deserialize, Serialize};

/// Machine-readable snapshot of the final simulation state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Version for migration support
    pub version: u32,
    /// Simulated time at end of run
    pub time: u64,
    /// Final partition table
    pub partitions: Vec<Partition>,
    /// Final process table
    pub processes: Vec<Pcb>,
}

impl Snapshot {
    /// Current snapshot version
    pub const CURRENT_VERSION: u32 = 1;

    /// Capture the end-of-run state.
    pub fn capture(state: &SimState, time: u64) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            time,
            partitions: state.partitions.clone(),
            processes: state.processes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let state = SimState::new();
        let snapshot = Snapshot::capture(&state, 95);

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: Snapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.version, Snapshot::CURRENT_VERSION);
        assert_eq!(restored.time, 95);
        assert_eq!(restored.partitions, state.partitions);
        assert_eq!(restored.processes, state.processes);
    }
}
