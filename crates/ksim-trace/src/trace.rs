//! Trace file decoding
//!
//! Turns `ACTIVITY,VALUE` lines into the core's closed `Event` enum, once,
//! at parse time. Dispatch downstream is exhaustive matching; there is no
//! string comparison after this point. Malformed lines become typed errors
//! instead of silently vanishing.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use ksim_core::{CondMarker, Event, InterruptKind};

use crate::error::TraceError;

/// Decode a whole trace file.
///
/// Returns the decoded events in file order and every malformed line as a
/// typed error. Whitespace-only lines are skipped silently.
pub fn parse_trace(text: &str) -> (Vec<Event>, Vec<TraceError>) {
    let mut events = Vec::new();
    let mut errors = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }
        match parse_trace_line(raw, line) {
            Ok(event) => events.push(event),
            Err(err) => errors.push(err),
        }
    }

    (events, errors)
}

/// Decode a single trace line.
///
/// `line` is the 1-based line number, carried into any error.
pub fn parse_trace_line(raw: &str, line: usize) -> Result<Event, TraceError> {
    let trimmed = raw.trim();

    // Split off the optional `,VALUE` suffix; the activity keeps any
    // embedded space (`EXEC program1`).
    let (activity, value) = match trimmed.split_once(',') {
        Some((activity, value)) => (activity.trim(), Some(value.trim())),
        None => (trimmed, None),
    };

    if activity == "EXEC" {
        return Err(TraceError::EmptyProgramName { line });
    }
    if let Some(rest) = activity.strip_prefix("EXEC ") {
        let program = rest.trim();
        if program.is_empty() {
            return Err(TraceError::EmptyProgramName { line });
        }
        return Ok(Event::Exec {
            program: program.to_string(),
        });
    }

    match activity {
        "CPU" => Ok(Event::Cpu {
            duration: required_value(activity, value, line)?,
        }),
        "SYSCALL" => Ok(Event::Device {
            kind: InterruptKind::Syscall,
            device: required_value(activity, value, line)? as usize,
        }),
        "END_IO" => Ok(Event::Device {
            kind: InterruptKind::EndIo,
            device: required_value(activity, value, line)? as usize,
        }),
        // The value column is meaningless for these; trace files usually
        // carry a placeholder after the comma.
        "FORK" => Ok(Event::Fork),
        "IF_CHILD" => Ok(Event::Cond(CondMarker::IfChild)),
        "IF_PARENT" => Ok(Event::Cond(CondMarker::IfParent)),
        "ENDIF" => Ok(Event::Cond(CondMarker::EndIf)),
        other => Err(TraceError::UnknownActivity {
            line,
            activity: other.to_string(),
        }),
    }
}

fn required_value(activity: &str, value: Option<&str>, line: usize) -> Result<u64, TraceError> {
    let token = match value {
        Some(token) if !token.is_empty() => token,
        _ => {
            return Err(TraceError::MissingValue {
                line,
                activity: activity.to_string(),
            })
        }
    };
    token.parse::<u64>().map_err(|_| TraceError::BadValue {
        line,
        value: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_parse_cpu() {
        assert_eq!(
            parse_trace_line("CPU, 50", 1),
            Ok(Event::Cpu { duration: 50 })
        );
    }

    #[test]
    fn test_parse_device_interrupts() {
        assert_eq!(
            parse_trace_line("SYSCALL,3", 1),
            Ok(Event::Device {
                kind: InterruptKind::Syscall,
                device: 3
            })
        );
        assert_eq!(
            parse_trace_line("END_IO, 0", 2),
            Ok(Event::Device {
                kind: InterruptKind::EndIo,
                device: 0
            })
        );
    }

    #[test]
    fn test_parse_fork_with_and_without_placeholder() {
        assert_eq!(parse_trace_line("FORK,10", 1), Ok(Event::Fork));
        assert_eq!(parse_trace_line("FORK", 1), Ok(Event::Fork));
    }

    #[test]
    fn test_parse_exec_keeps_name_verbatim() {
        assert_eq!(
            parse_trace_line("EXEC program1,50", 1),
            Ok(Event::Exec {
                program: "program1".to_string()
            })
        );
        assert_eq!(
            parse_trace_line("EXEC program1", 1),
            Ok(Event::Exec {
                program: "program1".to_string()
            })
        );
    }

    #[test]
    fn test_parse_cond_markers() {
        assert_eq!(
            parse_trace_line("IF_CHILD,0", 1),
            Ok(Event::Cond(CondMarker::IfChild))
        );
        assert_eq!(
            parse_trace_line("IF_PARENT,0", 1),
            Ok(Event::Cond(CondMarker::IfParent))
        );
        assert_eq!(
            parse_trace_line("ENDIF,0", 1),
            Ok(Event::Cond(CondMarker::EndIf))
        );
    }

    #[test]
    fn test_malformed_lines_are_typed_errors() {
        assert_eq!(
            parse_trace_line("HALT,1", 4),
            Err(TraceError::UnknownActivity {
                line: 4,
                activity: "HALT".to_string()
            })
        );
        assert_eq!(
            parse_trace_line("CPU,", 2),
            Err(TraceError::MissingValue {
                line: 2,
                activity: "CPU".to_string()
            })
        );
        assert_eq!(
            parse_trace_line("CPU,fifty", 3),
            Err(TraceError::BadValue {
                line: 3,
                value: "fifty".to_string()
            })
        );
        assert_eq!(
            parse_trace_line("EXEC ,1", 5),
            Err(TraceError::EmptyProgramName { line: 5 })
        );
    }

    #[test]
    fn test_parse_trace_keeps_order_and_collects_errors() {
        let text = "CPU,50\n\nSYSCALL,0\nBOGUS,1\nFORK,0\n";
        let (events, errors) = parse_trace(text);

        assert_eq!(
            events,
            vec![
                Event::Cpu { duration: 50 },
                Event::Device {
                    kind: InterruptKind::Syscall,
                    device: 0
                },
                Event::Fork,
            ]
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            TraceError::UnknownActivity {
                line: 4,
                activity: "BOGUS".to_string()
            }
        );
    }

    #[test]
    fn test_windows_line_endings() {
        let (events, errors) = parse_trace("CPU,50\r\nEND_IO,1\r\n");
        assert_eq!(events.len(), 2);
        assert!(errors.is_empty());
    }
}
