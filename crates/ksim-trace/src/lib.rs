//! ksim trace - typed decoding of the simulator's input files
//!
//! Turns the four text inputs (trace, vector table, device delays, program
//! catalog) into the core's typed values. Pure `&str -> Result` functions;
//! file reading belongs to the CLI.

#![no_std]
extern crate alloc;

pub mod error;
pub mod tables;
pub mod trace;

pub use error::{TableError, TraceError};
pub use tables::{parse_catalog, parse_delay_table, parse_vector_table};
pub use trace::{parse_trace, parse_trace_line};
