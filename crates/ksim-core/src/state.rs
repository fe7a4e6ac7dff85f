//! Simulation state - pure data structure holding all mutable kernel state
//!
//! This module contains the `SimState` struct which holds the partition
//! table, the process table, the ready queue, and the pid allocator. It has
//! no I/O dependency; all transformations go through the `step` function or
//! the mutation helpers here.

use alloc::collections::VecDeque;
use alloc::string::ToString;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::types::{Occupant, Partition, PartitionId, Pcb, Pid, Priority, ProcState};

/// Fixed partition layout: (id, capacity in MB).
///
/// Six partitions, 1-based ids. The sixth is reserved for the init image
/// and is never handed out by the allocator.
pub const PARTITION_LAYOUT: [(u32, u32); 6] = [(1, 40), (2, 25), (3, 15), (4, 10), (5, 8), (6, 2)];

/// Id of the partition reserved for init.
pub const INIT_PARTITION: PartitionId = PartitionId(6);

/// Pid of the init process.
pub const INIT_PID: Pid = Pid(0);

/// Size of the init image in megabytes.
const INIT_SIZE_MB: u32 = 2;

/// FIFO queue of processes eligible to run.
///
/// A freshly forked child is inserted ahead of every normal-priority entry,
/// modeling child-runs-first semantics. The queue records scheduling
/// *outcome* only; the interpreter still processes trace events in input
/// order regardless of queue contents.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReadyQueue {
    pids: VecDeque<Pid>,
}

impl ReadyQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            pids: VecDeque::new(),
        }
    }

    /// Insert a process. Child priority jumps the FIFO order.
    pub fn enqueue(&mut self, pid: Pid, priority: Priority) {
        match priority {
            Priority::Child => self.pids.push_front(pid),
            Priority::Normal => self.pids.push_back(pid),
        }
    }

    /// Pop the next process to run, or `None` if the queue is empty.
    pub fn dequeue(&mut self) -> Option<Pid> {
        self.pids.pop_front()
    }

    /// Next process without removing it.
    pub fn peek(&self) -> Option<Pid> {
        self.pids.front().copied()
    }

    /// Remove a process from the queue wherever it sits.
    pub fn remove(&mut self, pid: Pid) {
        self.pids.retain(|&p| p != pid);
    }

    /// Whether the given process is queued.
    pub fn contains(&self, pid: Pid) -> bool {
        self.pids.contains(&pid)
    }

    /// Queued pids in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = Pid> + '_ {
        self.pids.iter().copied()
    }

    /// Number of queued processes.
    pub fn len(&self) -> usize {
        self.pids.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }
}

/// The pure simulation state - no I/O, no side effects.
///
/// All state transformations are done via the `step` function. PCB records
/// are never physically removed; `Terminated` is a logical state only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimState {
    /// Fixed memory partitions, ascending id order
    pub partitions: Vec<Partition>,
    /// Process table, in creation order
    pub processes: Vec<Pcb>,
    /// Processes eligible to run
    pub ready: ReadyQueue,
    /// Next process ID to allocate
    pub next_pid: u32,
}

impl SimState {
    /// Create the initialized system: the fixed partitions with the init
    /// process resident in the reserved partition and seeded into the ready
    /// queue.
    pub fn new() -> Self {
        let partitions: Vec<Partition> = PARTITION_LAYOUT
            .iter()
            .map(|&(id, capacity_mb)| Partition {
                id: PartitionId(id),
                capacity_mb,
                occupant: if PartitionId(id) == INIT_PARTITION {
                    Occupant::Reserved("init".to_string())
                } else {
                    Occupant::Free
                },
            })
            .collect();

        let init = Pcb {
            pid: INIT_PID,
            parent: None,
            program: "init".to_string(),
            partition: Some(INIT_PARTITION),
            size_mb: INIT_SIZE_MB,
            state: ProcState::Running,
            priority: Priority::Normal,
        };

        let mut ready = ReadyQueue::new();
        ready.enqueue(INIT_PID, Priority::Normal);

        Self {
            partitions,
            processes: alloc::vec![init],
            ready,
            next_pid: 1,
        }
    }

    /// Generate the next process ID.
    pub fn alloc_pid(&mut self) -> Pid {
        let pid = Pid(self.next_pid);
        self.next_pid += 1;
        pid
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    /// Get a process record.
    pub fn process(&self, pid: Pid) -> Option<&Pcb> {
        self.processes.iter().find(|p| p.pid == pid)
    }

    /// Get a mutable process record.
    pub fn process_mut(&mut self, pid: Pid) -> Option<&mut Pcb> {
        self.processes.iter_mut().find(|p| p.pid == pid)
    }

    /// Whether a process exists.
    pub fn process_exists(&self, pid: Pid) -> bool {
        self.process(pid).is_some()
    }

    /// Get a partition by id.
    pub fn partition(&self, id: PartitionId) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.id == id)
    }

    /// Get a mutable partition by id.
    pub fn partition_mut(&mut self, id: PartitionId) -> Option<&mut Partition> {
        self.partitions.iter_mut().find(|p| p.id == id)
    }

    /// First-fit allocation: the first free partition, in ascending id
    /// order, whose capacity holds `size_mb`. Does not mark the partition.
    pub fn first_fit(&self, size_mb: u32) -> Option<PartitionId> {
        self.partitions
            .iter()
            .find(|p| p.occupant.is_free() && p.capacity_mb >= size_mb)
            .map(|p| p.id)
    }

    // ========================================================================
    // State mutation helpers (pure - no side effects)
    // ========================================================================

    /// Mark a partition as holding a program. The transition is one-way;
    /// nothing ever frees a partition.
    pub fn occupy_partition(&mut self, id: PartitionId, program: &str) {
        if let Some(part) = self.partition_mut(id) {
            part.occupant = Occupant::Program(program.to_string());
        }
    }

    /// Mark a process terminated and drop it from the ready queue. The PCB
    /// record itself is kept.
    pub fn terminate_process(&mut self, pid: Pid) {
        if let Some(pcb) = self.process_mut(pid) {
            pcb.state = ProcState::Terminated;
        }
        self.ready.remove(pid);
    }

    /// Whether `pid`'s parent is `parent`.
    pub fn is_child_of(&self, pid: Pid, parent: Pid) -> bool {
        self.process(pid).map(|p| p.parent == Some(parent)).unwrap_or(false)
    }
}

impl Default for SimState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_layout() {
        let state = SimState::new();

        assert_eq!(state.partitions.len(), 6);
        assert_eq!(state.partitions[0].capacity_mb, 40);
        assert_eq!(
            state.partition(INIT_PARTITION).unwrap().occupant,
            Occupant::Reserved("init".to_string())
        );

        let init = state.process(INIT_PID).unwrap();
        assert_eq!(init.parent, None);
        assert_eq!(init.partition, Some(INIT_PARTITION));
        assert_eq!(init.state, ProcState::Running);
        assert!(state.ready.contains(INIT_PID));
    }

    #[test]
    fn test_alloc_pid_is_monotonic() {
        let mut state = SimState::new();
        let a = state.alloc_pid();
        let b = state.alloc_pid();
        assert_eq!(a, Pid(1));
        assert_eq!(b, Pid(2));
        assert_eq!(state.next_pid, 3);
    }

    #[test]
    fn test_first_fit_scans_ascending() {
        let state = SimState::new();
        // 20 MB fits partitions 1 and 2; first-fit must pick 1 (40 MB).
        assert_eq!(state.first_fit(20), Some(PartitionId(1)));
        assert_eq!(state.first_fit(9), Some(PartitionId(1)));
        assert_eq!(state.first_fit(41), None);
    }

    #[test]
    fn test_first_fit_skips_occupied() {
        let mut state = SimState::new();
        state.occupy_partition(PartitionId(1), "program1");
        assert_eq!(state.first_fit(20), Some(PartitionId(2)));
        // Reserved init partition is never free, even for tiny programs.
        state.occupy_partition(PartitionId(2), "program2");
        state.occupy_partition(PartitionId(3), "program3");
        state.occupy_partition(PartitionId(4), "program4");
        state.occupy_partition(PartitionId(5), "program5");
        assert_eq!(state.first_fit(1), None);
    }

    #[test]
    fn test_ready_queue_child_jumps_fifo() {
        let mut queue = ReadyQueue::new();
        queue.enqueue(Pid(0), Priority::Normal);
        queue.enqueue(Pid(1), Priority::Child);

        assert_eq!(queue.dequeue(), Some(Pid(1)));
        assert_eq!(queue.dequeue(), Some(Pid(0)));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_is_child_of() {
        let mut state = SimState::new();
        let mut child = state.processes[0].clone();
        child.pid = state.alloc_pid();
        child.parent = Some(INIT_PID);
        let child_pid = child.pid;
        state.processes.push(child);

        assert!(state.is_child_of(child_pid, INIT_PID));
        assert!(!state.is_child_of(INIT_PID, child_pid));
        assert!(!state.is_child_of(Pid(9), INIT_PID));
    }

    #[test]
    fn test_terminate_keeps_record() {
        let mut state = SimState::new();
        state.terminate_process(INIT_PID);

        assert_eq!(state.process(INIT_PID).unwrap().state, ProcState::Terminated);
        assert!(!state.ready.contains(INIT_PID));
        assert_eq!(state.processes.len(), 1);
    }
}
