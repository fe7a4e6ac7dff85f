//! Text rendering at the output boundary
//!
//! The journal and the state are structured data everywhere else; this
//! module is the single place that turns them into the two text reports
//! (execution log and status snapshots).

use alloc::string::String;
use core::fmt::Write;

use crate::journal::Journal;
use crate::state::SimState;
use crate::system::StatusSnapshot;
use crate::types::Pcb;

/// Render the execution log: every entry as
/// `"<timestamp>, <duration>, <description>"`, then the final-state block.
pub fn render_execution(journal: &Journal, state: &SimState) -> String {
    let mut out = String::new();

    for entry in journal.entries() {
        let _ = writeln!(out, "{}", entry);
    }

    out.push_str("\n\n=== FINAL SYSTEM STATE ===\n");
    out.push_str("Partition Table:\n");
    for part in &state.partitions {
        let _ = writeln!(
            out,
            "Partition {}: {} MB - Code: {}",
            part.id, part.capacity_mb, part.occupant
        );
    }

    out.push_str("\nPCB Table:\n");
    for pcb in &state.processes {
        let _ = writeln!(out, "{}", pcb_line(pcb));
    }

    out
}

/// Render the status report: one PCB-table snapshot per FORK/EXEC.
pub fn render_status(snapshots: &[StatusSnapshot]) -> String {
    let mut out = String::new();

    for snapshot in snapshots {
        let _ = writeln!(out, "time: {}; executed: {}", snapshot.at, snapshot.trigger);
        for pcb in &snapshot.processes {
            let _ = writeln!(out, "{}", pcb_line(pcb));
        }
        out.push('\n');
    }

    out
}

fn pcb_line(pcb: &Pcb) -> String {
    let mut line = String::new();
    let _ = write!(line, "PID {}: {} (Partition ", pcb.pid, pcb.program);
    match pcb.partition {
        Some(id) => {
            let _ = write!(line, "{}", id);
        }
        None => line.push('-'),
    }
    let _ = write!(line, ", {} MB, State: {})", pcb.size_mb, pcb.state);
    line
}
