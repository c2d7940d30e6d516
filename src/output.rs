use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use time::{format_description::well_known, OffsetDateTime};

use crate::types::{PortState, ScanResult, ScanSummary};

/// Capability interface for consumers of finished probe results.
///
/// The scanner calls `update` exactly once per finished result, in
/// registration order, synchronously with the scan loop. Implementations
/// perform their own side effects (printing, recording, aggregating); the
/// scanner consumes no return value from them.
pub trait ResultObserver {
    fn update(&mut self, result: &ScanResult);
}

/// Prints one aligned line per finished result.
pub struct ConsoleObserver;

impl ResultObserver for ConsoleObserver {
    fn update(&mut self, result: &ScanResult) {
        println!("{:>5}/tcp  {}", result.port, result.state);
    }
}

#[derive(Debug, Serialize)]
struct JsonRecord {
    port: u16,
    state: PortState,
    timestamp: String,
}

/// Writes one JSON record per result, flushed as results land.
pub struct JsonLinesObserver<W: Write> {
    out: W,
}

impl JsonLinesObserver<BufWriter<File>> {
    /// Open a file-backed observer, truncating any existing file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref()).with_context(|| {
            format!("failed to create output file: {}", path.as_ref().display())
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the observer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultObserver for JsonLinesObserver<W> {
    fn update(&mut self, result: &ScanResult) {
        let record = JsonRecord {
            port: result.port,
            state: result.state,
            timestamp: now_rfc3339(),
        };
        if let Err(e) = write_record(&mut self.out, &record) {
            eprintln!("Failed to write JSON record for port {}: {}", result.port, e);
        }
    }
}

fn write_record<W: Write>(out: &mut W, record: &JsonRecord) -> Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn now_rfc3339() -> String {
    // RFC3339 UTC timestamp using `time` crate for correctness without heavy deps.
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

/// Accumulates per-state counters across one scan.
#[derive(Debug, Default)]
pub struct SummaryObserver {
    summary: ScanSummary,
}

impl SummaryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters accumulated so far.
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }
}

impl ResultObserver for SummaryObserver {
    fn update(&mut self, result: &ScanResult) {
        self.summary.probed += 1;
        match result.state {
            PortState::Open => self.summary.open += 1,
            PortState::Timeout => self.summary.timeout += 1,
            PortState::ConnRefused => self.summary.refused += 1,
            PortState::Unknown => self.summary.unknown += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_one_record_per_result() {
        let mut observer = JsonLinesObserver::new(Vec::new());
        observer.update(&ScanResult {
            port: 22,
            state: PortState::ConnRefused,
        });
        observer.update(&ScanResult {
            port: 80,
            state: PortState::Open,
        });

        let written = observer.into_inner();
        let text = std::str::from_utf8(&written).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["port"], 22);
        assert_eq!(first["state"], "conn_refused");
        assert!(first["timestamp"].is_string());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["port"], 80);
        assert_eq!(second["state"], "open");
    }

    #[test]
    fn summary_counts_per_state() {
        let mut observer = SummaryObserver::new();
        let results = [
            ScanResult {
                port: 22,
                state: PortState::ConnRefused,
            },
            ScanResult {
                port: 80,
                state: PortState::Open,
            },
            ScanResult {
                port: 81,
                state: PortState::Open,
            },
            ScanResult {
                port: 9999,
                state: PortState::Timeout,
            },
        ];
        for r in &results {
            observer.update(r);
        }

        let s = observer.summary();
        assert_eq!(s.probed, 4);
        assert_eq!(s.open, 2);
        assert_eq!(s.refused, 1);
        assert_eq!(s.timeout, 1);
        assert_eq!(s.unknown, 0);
    }
}
