//! Simulation driver
//!
//! `Simulation` is the runtime wrapper around the pure state machine: it
//! owns the state, the configuration and the journal, tracks which process
//! trace events are attributed to, and collects the PCB snapshots taken
//! after every FORK/EXEC for the status report.
//!
//! Events are processed strictly in input order. The ready queue and
//! priorities model scheduling outcome only; there is no preemption and no
//! interleaving - one event's full handler sequence completes before the
//! next event is dispatched.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::journal::Journal;
use crate::state::{SimState, INIT_PID};
use crate::step::{step, CondMarker, Event, ForkLink, StepError};
use crate::types::{Pcb, Pid, SimConfig};

/// PCB-table snapshot taken after a FORK or EXEC completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Simulated time of the snapshot
    pub at: u64,
    /// The event that triggered it, in trace notation
    pub trigger: String,
    /// Full process table at that point
    pub processes: Vec<Pcb>,
}

/// The event interpreter: dispatch loop plus attribution tracking.
pub struct Simulation {
    state: SimState,
    config: SimConfig,
    journal: Journal,
    /// Process the next event is attributed to
    current: Pid,
    /// Attribution saved at each open IF_CHILD/IF_PARENT block
    cond_stack: Vec<Pid>,
    /// Most recent FORK, consulted by the conditional markers
    last_fork: Option<ForkLink>,
    status_log: Vec<StatusSnapshot>,
}

impl Simulation {
    /// Create a simulation over an initialized system.
    pub fn new(config: SimConfig) -> Self {
        Self {
            state: SimState::new(),
            config,
            journal: Journal::new(),
            current: INIT_PID,
            cond_stack: Vec::new(),
            last_fork: None,
            status_log: Vec::new(),
        }
    }

    /// Dispatch a single event.
    pub fn dispatch(&mut self, event: &Event) -> Result<(), StepError> {
        if let Event::Cond(marker) = event {
            self.apply_marker(*marker);
            return Ok(());
        }

        let outcome = step(
            &mut self.state,
            &self.config,
            &mut self.journal,
            self.current,
            event,
        )?;

        if let Some(link) = outcome.forked {
            self.last_fork = Some(link);
        }

        if matches!(event, Event::Fork | Event::Exec { .. }) {
            self.snapshot_status(event);
        }

        Ok(())
    }

    /// Run a whole trace in order.
    pub fn run(&mut self, events: &[Event]) -> Result<(), StepError> {
        for event in events {
            self.dispatch(event)?;
        }
        Ok(())
    }

    /// Conditional markers re-attribute events; they have no timing cost
    /// and leave the journal untouched.
    fn apply_marker(&mut self, marker: CondMarker) {
        match marker {
            CondMarker::IfChild => {
                if let Some(link) = self.last_fork {
                    self.cond_stack.push(self.current);
                    self.current = link.child;
                }
            }
            CondMarker::IfParent => {
                if let Some(link) = self.last_fork {
                    self.cond_stack.push(self.current);
                    self.current = link.parent;
                }
            }
            CondMarker::EndIf => {
                if let Some(saved) = self.cond_stack.pop() {
                    self.current = saved;
                }
            }
        }
    }

    fn snapshot_status(&mut self, trigger: &Event) {
        self.status_log.push(StatusSnapshot {
            at: self.journal.now(),
            trigger: trigger.to_string(),
            processes: self.state.processes.clone(),
        });
    }

    /// Current simulation state.
    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// The execution journal so far.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Run configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Pid the next event will be attributed to.
    pub fn current_pid(&self) -> Pid {
        self.current
    }

    /// Snapshots taken after each FORK/EXEC.
    pub fn status_log(&self) -> &[StatusSnapshot] {
        &self.status_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProgramImage;
    use alloc::vec;

    fn test_config() -> SimConfig {
        SimConfig {
            vectors: vec![
                "0X01E3".to_string(),
                "0X029C".to_string(),
                "0X0695".to_string(),
                "0X042B".to_string(),
            ],
            delays: vec![110, 22, 46, 53],
            catalog: vec![ProgramImage {
                name: "program1".to_string(),
                size_mb: 20,
            }],
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_if_child_attributes_to_child() {
        let mut sim = Simulation::new(test_config());

        sim.run(&[
            Event::Fork,
            Event::Cond(CondMarker::IfChild),
            Event::Exec {
                program: "program1".to_string(),
            },
            Event::Cond(CondMarker::EndIf),
        ])
        .unwrap();

        // EXEC landed on the child, not on init.
        let child = sim.state().process(Pid(1)).unwrap();
        assert_eq!(child.program, "program1");
        let init = sim.state().process(INIT_PID).unwrap();
        assert_eq!(init.program, "init");

        // ENDIF restored attribution to init.
        assert_eq!(sim.current_pid(), INIT_PID);
    }

    #[test]
    fn test_if_parent_attributes_to_parent() {
        let mut sim = Simulation::new(test_config());

        sim.run(&[
            Event::Fork,
            Event::Cond(CondMarker::IfChild),
            Event::Cond(CondMarker::IfParent),
        ])
        .unwrap();

        assert_eq!(sim.current_pid(), INIT_PID);
        // Both blocks are still open.
        assert_eq!(sim.cond_stack.len(), 2);
    }

    #[test]
    fn test_markers_without_fork_are_inert() {
        let mut sim = Simulation::new(test_config());

        sim.run(&[
            Event::Cond(CondMarker::IfChild),
            Event::Cond(CondMarker::EndIf),
        ])
        .unwrap();

        assert_eq!(sim.current_pid(), INIT_PID);
        assert!(sim.journal().is_empty());
    }

    #[test]
    fn test_status_snapshots_after_fork_and_exec() {
        let mut sim = Simulation::new(test_config());

        sim.run(&[
            Event::Cpu { duration: 10 },
            Event::Fork,
            Event::Exec {
                program: "program1".to_string(),
            },
        ])
        .unwrap();

        let snapshots = sim.status_log();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].trigger, "FORK");
        assert_eq!(snapshots[0].processes.len(), 2);
        assert_eq!(snapshots[1].trigger, "EXEC program1");
        // Snapshot times follow the journal clock.
        assert_eq!(snapshots[0].at, sim.journal().entries()[9].at + 1);
    }
}
