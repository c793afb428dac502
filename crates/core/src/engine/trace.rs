//! Benchmark trace reader.
//!
//! One instruction group per line: `<compute_count> <addr> <R|W>`,
//! whitespace-separated. Each line stands for `compute_count` compute
//! instructions followed by exactly one memory operation. Addresses parse
//! with automatic radix: a `0x`/`0X` prefix selects hexadecimal, anything
//! else is decimal. Lines that do not match the grammar are skipped with a
//! warning; EOF ends trace input.

use std::fs::File;
use std::io::{BufRead, BufReader};

use log::warn;

use crate::common::error::SimError;
use crate::common::msg::ReqType;

/// One parsed trace line: a run of compute instructions and one memory op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceGroup {
    /// Compute instructions preceding the memory operation.
    pub compute_count: u32,
    /// Address of the memory operation.
    pub addr: u64,
    /// READ or WRITE.
    pub op: ReqType,
}

/// Streaming reader over a benchmark trace.
pub struct TraceReader {
    input: Box<dyn BufRead>,
    line_no: u64,
    exhausted: bool,
}

impl std::fmt::Debug for TraceReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceReader")
            .field("line_no", &self.line_no)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

impl TraceReader {
    /// Opens a trace file. Failure to open is fatal for the core.
    pub fn open(path: &str) -> Result<Self, SimError> {
        let file = File::open(path).map_err(|source| SimError::TraceOpen {
            path: path.to_string(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file)))
    }

    /// Wraps an already-open reader (used by tests).
    pub fn from_reader(input: impl BufRead + 'static) -> Self {
        Self {
            input: Box::new(input),
            line_no: 0,
            exhausted: false,
        }
    }

    /// Returns true once EOF has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Reads the next instruction group, skipping malformed lines.
    ///
    /// Returns `None` at EOF (and marks the reader exhausted).
    pub fn next_group(&mut self) -> Option<TraceGroup> {
        loop {
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => {
                    self.exhausted = true;
                    return None;
                }
                Ok(_) => {
                    self.line_no += 1;
                    if line.trim().is_empty() {
                        continue;
                    }
                    match parse_line(&line) {
                        Some(group) => return Some(group),
                        None => {
                            warn!("[trace] skipping malformed line {}: {:?}", self.line_no, line.trim());
                        }
                    }
                }
                Err(e) => {
                    warn!("[trace] read error after line {}: {}", self.line_no, e);
                    self.exhausted = true;
                    return None;
                }
            }
        }
    }
}

/// Parses one trace line; `None` if it does not match the grammar.
fn parse_line(line: &str) -> Option<TraceGroup> {
    let mut fields = line.split_whitespace();
    let compute_count = fields.next()?.parse::<u32>().ok()?;
    let addr = parse_addr(fields.next()?)?;
    let op = match fields.next()? {
        "R" => ReqType::Read,
        "W" => ReqType::Write,
        _ => return None,
    };
    if fields.next().is_some() {
        return None;
    }
    Some(TraceGroup {
        compute_count,
        addr,
        op,
    })
}

/// Parses an address with automatic radix; `0x` prefix selects hex.
fn parse_addr(field: &str) -> Option<u64> {
    if let Some(hex) = field.strip_prefix("0x").or_else(|| field.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        field.parse::<u64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(contents: &str) -> TraceReader {
        TraceReader::from_reader(Cursor::new(contents.to_string()))
    }

    #[test]
    fn test_parse_decimal_and_hex_addresses() {
        assert_eq!(
            parse_line("3 256 R"),
            Some(TraceGroup {
                compute_count: 3,
                addr: 256,
                op: ReqType::Read,
            })
        );
        assert_eq!(
            parse_line("0 0x100 W"),
            Some(TraceGroup {
                compute_count: 0,
                addr: 0x100,
                op: ReqType::Write,
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert_eq!(parse_line("nonsense"), None);
        assert_eq!(parse_line("1 0x100"), None);
        assert_eq!(parse_line("1 0x100 X"), None);
        assert_eq!(parse_line("-1 0x100 R"), None);
        assert_eq!(parse_line("1 0x100 R extra"), None);
    }

    #[test]
    fn test_reader_skips_malformed_and_blank_lines() {
        let mut trace = reader("5 0x40 R\n\nbogus line\n0 0x80 W\n");
        assert_eq!(
            trace.next_group(),
            Some(TraceGroup {
                compute_count: 5,
                addr: 0x40,
                op: ReqType::Read,
            })
        );
        assert_eq!(
            trace.next_group(),
            Some(TraceGroup {
                compute_count: 0,
                addr: 0x80,
                op: ReqType::Write,
            })
        );
        assert_eq!(trace.next_group(), None);
        assert!(trace.is_exhausted());
    }

    #[test]
    fn test_empty_trace_is_immediately_exhausted() {
        let mut trace = reader("");
        assert!(!trace.is_exhausted());
        assert_eq!(trace.next_group(), None);
        assert!(trace.is_exhausted());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let err = TraceReader::open("/nonexistent/trace.txt").unwrap_err();
        assert!(matches!(err, SimError::TraceOpen { .. }));
    }
}
