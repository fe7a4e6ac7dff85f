//! ksim - deterministic trace-driven kernel interrupt simulator
//!
//! Loads the trace and the static tables, replays the trace through the
//! pure core, and writes the execution log, the status report, and a
//! machine-readable state snapshot.
//!
//! Usage: ksim <trace_file> <vector_table> <device_delays> [program_catalog]

use std::env;
use std::fs;
use std::process;

use ksim_core::{
    check_all_invariants, render_execution, render_status, ProgramImage, SimConfig, Simulation,
};
use ksim_trace::{parse_catalog, parse_delay_table, parse_trace, parse_vector_table};

mod snapshot;

use snapshot::Snapshot;

const EXECUTION_FILE: &str = "execution.txt";
const STATUS_FILE: &str = "system_status.txt";
const SNAPSHOT_FILE: &str = "snapshot.json";

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 || args.len() > 5 {
        eprintln!("Expected 3 or 4 arguments, received {}", args.len().saturating_sub(1));
        eprintln!("Usage: ksim <trace_file> <vector_table> <device_delays> [program_catalog]");
        process::exit(1);
    }

    let trace_text = read_input(&args[1]);
    let vector_text = read_input(&args[2]);
    let delay_text = read_input(&args[3]);

    let vectors = parse_vector_table(&vector_text);
    let delays = match parse_delay_table(&delay_text) {
        Ok(delays) => delays,
        Err(err) => fail(&format!("{}: {}", args[3], err)),
    };
    let catalog = load_catalog(args.get(4).map(String::as_str));

    let (events, trace_errors) = parse_trace(&trace_text);
    for err in &trace_errors {
        eprintln!("Warning: skipped malformed trace entry ({})", err);
    }

    let config = SimConfig {
        vectors,
        delays,
        catalog,
        ..SimConfig::default()
    };

    let mut sim = Simulation::new(config);
    if let Err(err) = sim.run(&events) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }

    for violation in check_all_invariants(sim.state()) {
        eprintln!(
            "Warning: invariant {} violated: {}",
            violation.invariant, violation.description
        );
    }

    write_output(EXECUTION_FILE, &render_execution(sim.journal(), sim.state()));
    write_output(STATUS_FILE, &render_status(sim.status_log()));

    let snapshot = Snapshot::capture(sim.state(), sim.journal().now());
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => write_output(SNAPSHOT_FILE, &json),
        Err(err) => fail(&format!("snapshot serialization failed: {}", err)),
    }

    println!("Output generated in {}", EXECUTION_FILE);
}

/// Read a required input file, exiting with status 1 if it is unreadable.
fn read_input(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => fail(&format!("Unable to open file: {}", path)),
    }
}

/// The program catalog is the one optional input: a missing or unreadable
/// file degrades to an empty catalog with a warning. A present-but-garbled
/// catalog is still fatal.
fn load_catalog(path: Option<&str>) -> Vec<ProgramImage> {
    let path = match path {
        Some(path) => path,
        None => return Vec::new(),
    };
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => {
            eprintln!("Warning: unable to open {}, continuing with empty catalog", path);
            return Vec::new();
        }
    };
    match parse_catalog(&text) {
        Ok(catalog) => catalog,
        Err(err) => fail(&format!("{}: {}", path, err)),
    }
}

fn write_output(path: &str, contents: &str) {
    if fs::write(path, contents).is_err() {
        fail(&format!("Unable to write file: {}", path));
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}
