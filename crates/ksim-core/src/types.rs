//! Core simulator types
//!
//! This module contains the fundamental types used throughout the simulator
//! core. All types here are pure data - no behavior that depends on I/O.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Interrupt vector number reserved for FORK
pub const FORK_VECTOR: usize = 2;

/// Interrupt vector number reserved for EXEC
pub const EXEC_VECTOR: usize = 3;

/// Process identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Memory partition identifier (1-based)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionId(pub u32);

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What currently occupies a memory partition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    /// Partition is available for allocation
    Free,
    /// Partition is reserved and never allocated (holds the init image)
    Reserved(String),
    /// Partition holds a loaded program
    Program(String),
}

impl Occupant {
    /// Whether this partition can be handed out by the allocator.
    pub fn is_free(&self) -> bool {
        matches!(self, Occupant::Free)
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupant::Free => write!(f, "free"),
            Occupant::Reserved(tag) => write!(f, "{}", tag),
            Occupant::Program(name) => write!(f, "{}", name),
        }
    }
}

/// A fixed memory partition
///
/// Capacity is set at initialization and never changes. The occupant only
/// transitions `Free -> Program(name)`; no release is modeled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Partition identifier
    pub id: PartitionId,
    /// Capacity in megabytes
    pub capacity_mb: u32,
    /// Current contents
    pub occupant: Occupant,
}

/// Process state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcState {
    /// Process is executing
    Running,
    /// Process is eligible to run
    Ready,
    /// Process is blocked on a device
    Waiting,
    /// Process has finished (record is kept, never removed)
    Terminated,
}

impl fmt::Display for ProcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcState::Running => write!(f, "running"),
            ProcState::Ready => write!(f, "ready"),
            ProcState::Waiting => write!(f, "waiting"),
            ProcState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Scheduling priority
///
/// `Child` sorts ahead of `Normal` in the ready queue, which models the
/// child-runs-first semantics of FORK.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    /// Default priority
    Normal,
    /// Freshly forked child, runs before its parent
    Child,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Normal => write!(f, "normal"),
            Priority::Child => write!(f, "child"),
        }
    }
}

/// Process control block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pcb {
    /// Process ID (unique, monotonically assigned)
    pub pid: Pid,
    /// Parent process ID (`None` only for the init process)
    pub parent: Option<Pid>,
    /// Name of the program currently executing
    pub program: String,
    /// Partition allocated to this process, if any
    pub partition: Option<PartitionId>,
    /// Program size in megabytes
    pub size_mb: u32,
    /// Current process state
    pub state: ProcState,
    /// Scheduling priority
    pub priority: Priority,
}

/// A program on the simulated disk, loadable via EXEC
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramImage {
    /// Program identifier for catalog lookup
    pub name: String,
    /// Program size in megabytes
    pub size_mb: u32,
}

/// Kind of device interrupt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptKind {
    /// Synchronous system call
    Syscall,
    /// Device signalling I/O completion
    EndIo,
}

impl fmt::Display for InterruptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterruptKind::Syscall => write!(f, "SYSCALL"),
            InterruptKind::EndIo => write!(f, "END_IO"),
        }
    }
}

/// Immutable configuration for one simulation run
///
/// Holds the timing/addressing constants and the three static tables loaded
/// at startup. Threaded through the step function; there is no ambient
/// global configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Context save/restore time in milliseconds
    pub context_save_ms: u64,
    /// Base address of the vector table in simulated memory
    pub vector_base: u32,
    /// Bytes per vector table entry
    pub vector_entry_size: u32,
    /// Disk load rate in milliseconds per megabyte
    pub loader_ms_per_mb: u64,
    /// ISR addresses, indexed by interrupt number
    pub vectors: Vec<String>,
    /// ISR durations in milliseconds, indexed by device number
    pub delays: Vec<u64>,
    /// Programs available on the simulated disk
    pub catalog: Vec<ProgramImage>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            context_save_ms: 10,
            vector_base: 0,
            vector_entry_size: 2,
            loader_ms_per_mb: 15,
            vectors: Vec::new(),
            delays: Vec::new(),
            catalog: Vec::new(),
        }
    }
}

impl SimConfig {
    /// Address of a vector table entry in simulated memory.
    pub fn vector_address(&self, vector: usize) -> u32 {
        self.vector_base + (vector as u32) * self.vector_entry_size
    }
}
