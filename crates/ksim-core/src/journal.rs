//! Execution journal
//!
//! Records every micro-operation the simulated kernel performs as a
//! `(timestamp, duration, action)` triple. The journal owns the simulation
//! clock: appending an entry is the only way time advances, so the entry
//! sequence is chronological by construction.
//!
//! Entries are structured `Action` values; rendering to the output text
//! format happens at the output boundary (`report`), not here.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::types::{InterruptKind, PartitionId};

/// A recoverable simulation fault, logged in the journal.
///
/// These never abort the run; the handler that records one still executes
/// its full exit protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fault {
    /// EXEC target missing from the program catalog
    ProgramNotFound,
    /// No free partition large enough for the requested program
    NoPartitionAvailable,
    /// Calling process not present in the process table
    ProcessNotFound,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::ProgramNotFound => write!(f, "ERROR: Program not found"),
            Fault::NoPartitionAvailable => write!(f, "ERROR: No partition available"),
            Fault::ProcessNotFound => write!(f, "ERROR: Process not found"),
        }
    }
}

/// One micro-operation of the simulated kernel.
///
/// Closed set; the journal never records free-form text. Each variant
/// renders to the exact description the output log uses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Mode bit cleared, CPU enters kernel mode
    SwitchToKernel,
    /// Registers and processor state saved
    ContextSaved,
    /// Vector table lookup at a computed memory address
    FindVector {
        /// Interrupt number being serviced
        vector: u32,
        /// Memory address of the vector entry
        address: u32,
    },
    /// ISR address loaded into the program counter
    LoadIsrAddress {
        /// Address string from the vector table
        address: String,
    },
    /// Interrupt service routine body
    RunIsr {
        /// Which interrupt source is being serviced
        kind: InterruptKind,
    },
    /// Return from interrupt
    Iret,
    /// Registers and processor state restored
    ContextRestored,
    /// Mode bit set, CPU returns to user mode
    SwitchToUser,
    /// User-mode CPU burst
    CpuBurst,
    /// Parent PCB copied for a new child process
    PcbCloned,
    /// Program image copied from disk into a partition
    LoadProgram {
        /// Program being loaded
        program: String,
        /// Destination partition
        partition: PartitionId,
    },
    /// Calling process's PCB overwritten with new program info
    PcbUpdated,
    /// Scheduler consulted (zero-duration marker)
    SchedulerCalled,
    /// Recoverable fault, run continues
    Error(Fault),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SwitchToKernel => write!(f, "switch to kernel mode"),
            Action::ContextSaved => write!(f, "context saved"),
            Action::FindVector { vector, address } => {
                write!(f, "find vector {} in memory position 0x{:04X}", vector, address)
            }
            Action::LoadIsrAddress { address } => {
                write!(f, "load address {} into the PC", address)
            }
            Action::RunIsr { kind } => write!(f, "{}: run the ISR", kind),
            Action::Iret => write!(f, "IRET"),
            Action::ContextRestored => write!(f, "context restored"),
            Action::SwitchToUser => write!(f, "switch to user mode"),
            Action::CpuBurst => write!(f, "CPU execution"),
            Action::PcbCloned => write!(f, "PCB cloned for child process"),
            Action::LoadProgram { program, partition } => {
                write!(f, "loading {} from disk to partition {}", program, partition)
            }
            Action::PcbUpdated => write!(f, "PCB updated with new program info"),
            Action::SchedulerCalled => write!(f, "scheduler called"),
            Action::Error(fault) => write!(f, "{}", fault),
        }
    }
}

/// One journal entry: an action at a point in simulated time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Simulated time at which the action started
    pub at: u64,
    /// How long the action took
    pub duration: u64,
    /// What happened
    pub action: Action,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.at, self.duration, self.action)
    }
}

/// Append-only execution log plus the simulation clock.
///
/// Entries are appended with monotonically non-decreasing timestamps
/// starting at 0. Time never moves backward; a zero-duration entry is legal
/// and leaves the clock unchanged.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Journal {
    now: u64,
    entries: Vec<LogEntry>,
}

impl Journal {
    /// Create an empty journal with the clock at 0.
    pub fn new() -> Self {
        Self {
            now: 0,
            entries: Vec::new(),
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Advance the clock, returning the pre-advance timestamp.
    pub fn advance(&mut self, delta: u64) -> u64 {
        let at = self.now;
        self.now += delta;
        at
    }

    /// Append one entry at the current time, then advance the clock.
    pub fn record(&mut self, duration: u64, action: Action) {
        let at = self.advance(duration);
        self.entries.push(LogEntry {
            at,
            duration,
            action,
        });
    }

    /// All entries, in append order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_record_advances_clock() {
        let mut journal = Journal::new();
        journal.record(50, Action::CpuBurst);
        journal.record(1, Action::Iret);

        assert_eq!(journal.now(), 51);
        assert_eq!(journal.entries()[0].at, 0);
        assert_eq!(journal.entries()[1].at, 50);
    }

    #[test]
    fn test_zero_duration_entry_is_legal() {
        let mut journal = Journal::new();
        journal.record(0, Action::SchedulerCalled);

        assert_eq!(journal.now(), 0);
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_advance_returns_pre_advance_time() {
        let mut journal = Journal::new();
        assert_eq!(journal.advance(10), 0);
        assert_eq!(journal.advance(5), 10);
        assert_eq!(journal.now(), 15);
    }

    #[test]
    fn test_entry_rendering() {
        let entry = LogEntry {
            at: 63,
            duration: 20,
            action: Action::RunIsr {
                kind: crate::types::InterruptKind::Syscall,
            },
        };
        assert_eq!(entry.to_string(), "63, 20, SYSCALL: run the ISR");
    }

    #[test]
    fn test_find_vector_rendering() {
        let entry = LogEntry {
            at: 61,
            duration: 1,
            action: Action::FindVector {
                vector: 3,
                address: 6,
            },
        };
        assert_eq!(entry.to_string(), "61, 1, find vector 3 in memory position 0x0006");
    }
}
