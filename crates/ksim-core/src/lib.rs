//! ksim core - pure state machine for the kernel interrupt simulator
//!
//! This crate contains the **pure, I/O-free** simulation core: a
//! deterministic state machine over a scripted sequence of kernel events.
//!
//! # Design Principles
//!
//! 1. **No I/O or side effects**: pure state transformations only; file
//!    loading and report writing live in `ksim-cli`
//! 2. **Deterministic**: same trace and tables always produce the same
//!    journal, byte for byte
//! 3. **Single stream**: one event's full handler sequence completes before
//!    the next event is dispatched; there is no preemption and no nesting
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    ksim-core                        │
//! │                                                     │
//! │   ┌────────────┐    ┌──────────┐    ┌───────────┐   │
//! │   │  SimState  │    │  step()  │    │  Journal  │   │
//! │   │ partitions │───▶│  pure    │───▶│ clock +   │   │
//! │   │ processes  │    │ transfmr │    │ log       │   │
//! │   └────────────┘    └──────────┘    └───────────┘   │
//! │                                                     │
//! │   ┌────────────┐    ┌────────────┐                  │
//! │   │ Simulation │    │ Invariants │                  │
//! │   │  (driver)  │    │ assertions │                  │
//! │   └────────────┘    └────────────┘                  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - `types` - core data types (Pid, Partition, Pcb, SimConfig, ...)
//! - `journal` - the clock and the append-only execution log
//! - `state` - `SimState` with the partition/process tables and ready queue
//! - `step` - pure `step(state, config, journal, event)` function
//! - `system` - `Simulation` driver with attribution and status snapshots
//! - `invariants` - runtime invariant assertions
//! - `report` - text rendering at the output boundary

#![no_std]
extern crate alloc;

pub mod invariants;
pub mod journal;
pub mod report;
pub mod state;
pub mod step;
pub mod system;
pub mod types;

// Re-export all public types for convenient access
pub use invariants::{check_all_invariants, InvariantViolation};
pub use journal::{Action, Fault, Journal, LogEntry};
pub use report::{render_execution, render_status};
pub use state::{ReadyQueue, SimState, INIT_PARTITION, INIT_PID, PARTITION_LAYOUT};
pub use step::{step, CondMarker, Event, ForkLink, StepError, StepOutcome};
pub use system::{Simulation, StatusSnapshot};
pub use types::{
    InterruptKind, Occupant, Partition, PartitionId, Pcb, Pid, Priority, ProcState, ProgramImage,
    SimConfig, EXEC_VECTOR, FORK_VECTOR,
};
