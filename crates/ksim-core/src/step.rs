//! Pure step function - the heart of the simulator
//!
//! This module contains the pure `step(state, config, journal, event)`
//! function. All state transformations happen here - no I/O, no side
//! effects beyond the provided state and journal.
//!
//! # Design
//!
//! The step function takes:
//! - Current simulation state
//! - The run's immutable configuration (constants + loaded tables)
//! - The journal (which owns the clock)
//! - One decoded trace event and the pid it is attributed to
//!
//! And returns what the event did (e.g. which child a FORK created), or a
//! fatal `StepError` for out-of-range vector/device numbers.
//!
//! Every kernel entry produces the same fixed shape in the journal: the
//! 4-record entry protocol, the handler body, then the 3-record exit
//! protocol. Recoverable faults (catalog miss, no fitting partition,
//! missing caller) become duration-1 error records and the handler still
//! runs its exit protocol.

use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::journal::{Action, Fault, Journal};
use crate::state::SimState;
use crate::types::{InterruptKind, Pid, Priority, SimConfig, EXEC_VECTOR, FORK_VECTOR};

// ============================================================================
// Event definitions
// ============================================================================

/// Conditional-block marker in the trace.
///
/// Markers re-attribute subsequent events to the forked child or its
/// parent. They carry no timing cost and never appear in the journal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CondMarker {
    /// Attribute following events to the most recently forked child
    IfChild,
    /// Attribute following events to that child's parent
    IfParent,
    /// Restore the attribution in effect before the block opened
    EndIf,
}

/// One decoded trace event - all possible simulation inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// User-mode CPU burst
    Cpu {
        /// Burst length in milliseconds
        duration: u64,
    },
    /// FORK system call by the current process
    Fork,
    /// EXEC system call naming a catalog program
    Exec {
        /// Program to load, verbatim from the trace
        program: String,
    },
    /// Device interrupt (system call entry or I/O completion)
    Device {
        /// Interrupt source
        kind: InterruptKind,
        /// Device number, index into the delay table
        device: usize,
    },
    /// Conditional-block marker (attribution only)
    Cond(CondMarker),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Cpu { duration } => write!(f, "CPU,{}", duration),
            Event::Fork => write!(f, "FORK"),
            Event::Exec { program } => write!(f, "EXEC {}", program),
            Event::Device { kind, device } => write!(f, "{},{}", kind, device),
            Event::Cond(CondMarker::IfChild) => write!(f, "IF_CHILD"),
            Event::Cond(CondMarker::IfParent) => write!(f, "IF_PARENT"),
            Event::Cond(CondMarker::EndIf) => write!(f, "ENDIF"),
        }
    }
}

// ============================================================================
// Step errors
// ============================================================================

/// Fatal step errors - hard precondition violations that abort the run.
///
/// These are the indexing errors of the interrupt path: a vector or device
/// number beyond the loaded tables has no defined recovery, so the step
/// function fails fast instead of continuing with bad data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepError {
    /// Interrupt number beyond the loaded vector table
    VectorOutOfRange {
        /// Offending interrupt number
        vector: usize,
        /// Number of loaded vector entries
        table_len: usize,
    },
    /// Device number beyond the loaded delay table
    DeviceOutOfRange {
        /// Offending device number
        device: usize,
        /// Number of loaded delay entries
        table_len: usize,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::VectorOutOfRange { vector, table_len } => write!(
                f,
                "interrupt vector {} out of range (vector table has {} entries)",
                vector, table_len
            ),
            StepError::DeviceOutOfRange { device, table_len } => write!(
                f,
                "device number {} out of range (delay table has {} entries)",
                device, table_len
            ),
        }
    }
}

/// What a step did, beyond its journal records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Child created by a FORK, with its parent
    pub forked: Option<ForkLink>,
}

/// Parent/child pair produced by one FORK.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForkLink {
    /// The new child process
    pub child: Pid,
    /// The process that called FORK
    pub parent: Pid,
}

// ============================================================================
// The pure step function
// ============================================================================

/// Execute one trace event against the simulation state.
///
/// # Properties
///
/// 1. **Deterministic**: same state + config + event always produces the
///    same records and mutations
/// 2. **No side effects**: only mutates the provided state and journal
/// 3. **Fixed shape**: every kernel entry records exactly
///    entry protocol (4) + body + exit protocol (3)
pub fn step(
    state: &mut SimState,
    config: &SimConfig,
    journal: &mut Journal,
    from: Pid,
    event: &Event,
) -> Result<StepOutcome, StepError> {
    match event {
        Event::Cpu { duration } => step_cpu(journal, *duration),
        Event::Fork => step_fork(state, config, journal, from),
        Event::Exec { program } => step_exec(state, config, journal, from, program),
        Event::Device { kind, device } => step_device(config, journal, *kind, *device),
        // Attribution is the interpreter's concern; the state machine sees
        // markers as timeless no-ops.
        Event::Cond(_) => Ok(StepOutcome::default()),
    }
}

// ============================================================================
// Interrupt protocol
// ============================================================================

/// The fixed 4-record kernel-entry protocol shared by every interrupt,
/// system call, and device completion.
fn enter_kernel(
    config: &SimConfig,
    journal: &mut Journal,
    vector: usize,
) -> Result<(), StepError> {
    let isr_address = config
        .vectors
        .get(vector)
        .ok_or(StepError::VectorOutOfRange {
            vector,
            table_len: config.vectors.len(),
        })?
        .clone();

    journal.record(1, Action::SwitchToKernel);
    journal.record(config.context_save_ms, Action::ContextSaved);
    journal.record(
        1,
        Action::FindVector {
            vector: vector as u32,
            address: config.vector_address(vector),
        },
    );
    journal.record(1, Action::LoadIsrAddress { address: isr_address });
    Ok(())
}

/// The fixed 3-record exit protocol, unconditional after every kernel entry.
fn exit_kernel(config: &SimConfig, journal: &mut Journal) {
    journal.record(1, Action::Iret);
    journal.record(config.context_save_ms, Action::ContextRestored);
    journal.record(1, Action::SwitchToUser);
}

// ============================================================================
// Event handlers
// ============================================================================

/// CPU burst: one record, no kernel entry, no state mutation.
fn step_cpu(journal: &mut Journal, duration: u64) -> Result<StepOutcome, StepError> {
    journal.record(duration, Action::CpuBurst);
    Ok(StepOutcome::default())
}

/// Device interrupt: entry protocol, one ISR record from the delay table,
/// exit protocol.
fn step_device(
    config: &SimConfig,
    journal: &mut Journal,
    kind: InterruptKind,
    device: usize,
) -> Result<StepOutcome, StepError> {
    let delay = *config
        .delays
        .get(device)
        .ok_or(StepError::DeviceOutOfRange {
            device,
            table_len: config.delays.len(),
        })?;

    enter_kernel(config, journal, device)?;
    journal.record(delay, Action::RunIsr { kind });
    exit_kernel(config, journal);
    Ok(StepOutcome::default())
}

/// FORK: clone the caller's PCB into a child that runs first.
///
/// The child copies every parent field except pid (next unused), parent
/// (the caller) and priority (child). FORK never touches partitions.
fn step_fork(
    state: &mut SimState,
    config: &SimConfig,
    journal: &mut Journal,
    from: Pid,
) -> Result<StepOutcome, StepError> {
    enter_kernel(config, journal, FORK_VECTOR)?;

    let parent = match state.process(from) {
        Some(pcb) => pcb.clone(),
        None => {
            journal.record(1, Action::Error(Fault::ProcessNotFound));
            exit_kernel(config, journal);
            return Ok(StepOutcome::default());
        }
    };

    let mut child = parent;
    child.pid = state.alloc_pid();
    child.parent = Some(from);
    child.priority = Priority::Child;
    let link = ForkLink {
        child: child.pid,
        parent: from,
    };

    state.ready.enqueue(child.pid, Priority::Child);
    state.processes.push(child);

    journal.record(1, Action::PcbCloned);
    journal.record(0, Action::SchedulerCalled);
    exit_kernel(config, journal);

    Ok(StepOutcome {
        forked: Some(link),
    })
}

/// EXEC: load a catalog program into the first fitting partition and
/// overwrite the caller's PCB in place.
fn step_exec(
    state: &mut SimState,
    config: &SimConfig,
    journal: &mut Journal,
    from: Pid,
    program: &str,
) -> Result<StepOutcome, StepError> {
    enter_kernel(config, journal, EXEC_VECTOR)?;

    // Caller check precedes any table mutation so the error paths below
    // leave partitions and PCBs untouched.
    if !state.process_exists(from) {
        journal.record(1, Action::Error(Fault::ProcessNotFound));
        exit_kernel(config, journal);
        return Ok(StepOutcome::default());
    }

    // First match in catalog order.
    let image = match config.catalog.iter().find(|p| p.name == program) {
        Some(image) => image.clone(),
        None => {
            journal.record(1, Action::Error(Fault::ProgramNotFound));
            exit_kernel(config, journal);
            return Ok(StepOutcome::default());
        }
    };

    let partition = match state.first_fit(image.size_mb) {
        Some(id) => id,
        None => {
            journal.record(1, Action::Error(Fault::NoPartitionAvailable));
            exit_kernel(config, journal);
            return Ok(StepOutcome::default());
        }
    };

    // A partition once occupied is never freed by this handler.
    state.occupy_partition(partition, &image.name);

    journal.record(
        image.size_mb as u64 * config.loader_ms_per_mb,
        Action::LoadProgram {
            program: image.name.clone(),
            partition,
        },
    );

    journal.record(1, Action::PcbUpdated);
    if let Some(pcb) = state.process_mut(from) {
        pcb.program = image.name;
        pcb.partition = Some(partition);
        pcb.size_mb = image.size_mb;
    }

    journal.record(0, Action::SchedulerCalled);
    exit_kernel(config, journal);

    Ok(StepOutcome::default())
}
