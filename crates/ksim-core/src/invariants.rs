//! Runtime-checkable invariants
//!
//! This module contains invariants that should hold after any well-formed
//! run. These are used for:
//! 1. Assertion checking in tests
//! 2. A post-run sanity pass in the CLI
//!
//! # Invariants
//!
//! 1. **Pid uniqueness & monotonicity**: pids are unique and below `next_pid`
//! 2. **Single root**: exactly one process has no parent, and it is pid 0
//! 3. **Partition references**: every PCB partition id exists in the table
//! 4. **Fixed capacities**: partition capacities match the initial layout
//! 5. **Live queue**: every queued pid is an existing, non-terminated process

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::state::{SimState, INIT_PARTITION, PARTITION_LAYOUT};
use crate::types::{Occupant, ProcState};

/// An invariant violation with details
#[derive(Clone, Debug)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: &'static str,
    /// Description of what went wrong
    pub description: String,
}

/// Check all simulation invariants.
///
/// Returns a list of violations (empty if all invariants hold).
pub fn check_all_invariants(state: &SimState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    violations.extend(check_pid_uniqueness(state));
    violations.extend(check_single_root(state));
    violations.extend(check_partition_references(state));
    violations.extend(check_fixed_capacities(state));
    violations.extend(check_live_queue(state));

    violations
}

/// Invariant 1: pids are unique and the allocator is ahead of all of them
fn check_pid_uniqueness(state: &SimState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for (i, pcb) in state.processes.iter().enumerate() {
        if state.processes[..i].iter().any(|p| p.pid == pcb.pid) {
            violations.push(InvariantViolation {
                invariant: "pid_uniqueness",
                description: format!("pid {} appears more than once", pcb.pid),
            });
        }
        if pcb.pid.0 >= state.next_pid {
            violations.push(InvariantViolation {
                invariant: "pid_uniqueness",
                description: format!(
                    "pid {} is not below the allocator's next_pid {}",
                    pcb.pid, state.next_pid
                ),
            });
        }
    }

    violations
}

/// Invariant 2: exactly one root process, and it is pid 0
fn check_single_root(state: &SimState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    let roots: Vec<_> = state.processes.iter().filter(|p| p.parent.is_none()).collect();
    if roots.len() != 1 {
        violations.push(InvariantViolation {
            invariant: "single_root",
            description: format!("expected exactly one parentless process, found {}", roots.len()),
        });
    } else if roots[0].pid.0 != 0 {
        violations.push(InvariantViolation {
            invariant: "single_root",
            description: format!("root process has pid {}, expected 0", roots[0].pid),
        });
    }

    violations
}

/// Invariant 3: every PCB partition reference resolves
fn check_partition_references(state: &SimState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for pcb in &state.processes {
        if let Some(id) = pcb.partition {
            if state.partition(id).is_none() {
                violations.push(InvariantViolation {
                    invariant: "partition_references",
                    description: format!(
                        "process {} references non-existent partition {}",
                        pcb.pid, id
                    ),
                });
            }
        }
    }

    violations
}

/// Invariant 4: capacities match the fixed layout and init stays reserved
fn check_fixed_capacities(state: &SimState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    if state.partitions.len() != PARTITION_LAYOUT.len() {
        violations.push(InvariantViolation {
            invariant: "fixed_capacities",
            description: format!(
                "partition table has {} entries, layout has {}",
                state.partitions.len(),
                PARTITION_LAYOUT.len()
            ),
        });
        return violations;
    }

    for (part, &(id, capacity_mb)) in state.partitions.iter().zip(PARTITION_LAYOUT.iter()) {
        if part.id.0 != id || part.capacity_mb != capacity_mb {
            violations.push(InvariantViolation {
                invariant: "fixed_capacities",
                description: format!(
                    "partition {} has capacity {} MB, layout says partition {} at {} MB",
                    part.id, part.capacity_mb, id, capacity_mb
                ),
            });
        }
    }

    if let Some(init) = state.partition(INIT_PARTITION) {
        if !matches!(init.occupant, Occupant::Reserved(_)) {
            violations.push(InvariantViolation {
                invariant: "fixed_capacities",
                description: format!("init partition {} is no longer reserved", INIT_PARTITION),
            });
        }
    }

    violations
}

/// Invariant 5: queued pids are live processes
fn check_live_queue(state: &SimState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for pid in state.ready.iter() {
        match state.process(pid) {
            None => violations.push(InvariantViolation {
                invariant: "live_queue",
                description: format!("ready queue holds non-existent pid {}", pid),
            }),
            Some(pcb) if pcb.state == ProcState::Terminated => {
                violations.push(InvariantViolation {
                    invariant: "live_queue",
                    description: format!("ready queue holds terminated pid {}", pid),
                })
            }
            Some(_) => {}
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Pid, PartitionId};

    #[test]
    fn test_fresh_state_holds_all_invariants() {
        let state = SimState::new();
        assert!(check_all_invariants(&state).is_empty());
    }

    #[test]
    fn test_duplicate_pid_detected() {
        let mut state = SimState::new();
        let mut clone = state.processes[0].clone();
        clone.parent = Some(Pid(0));
        state.processes.push(clone);

        let violations = check_all_invariants(&state);
        assert!(violations.iter().any(|v| v.invariant == "pid_uniqueness"));
    }

    #[test]
    fn test_capacity_tampering_detected() {
        let mut state = SimState::new();
        state.partitions[0].capacity_mb = 64;

        let violations = check_all_invariants(&state);
        assert!(violations.iter().any(|v| v.invariant == "fixed_capacities"));
    }

    #[test]
    fn test_dangling_partition_reference_detected() {
        let mut state = SimState::new();
        state.processes[0].partition = Some(PartitionId(9));

        let violations = check_all_invariants(&state);
        assert!(violations.iter().any(|v| v.invariant == "partition_references"));
    }

    #[test]
    fn test_stale_queue_entry_detected() {
        let mut state = SimState::new();
        state.ready.enqueue(Pid(7), crate::types::Priority::Normal);

        let violations = check_all_invariants(&state);
        assert!(violations.iter().any(|v| v.invariant == "live_queue"));
    }
}
