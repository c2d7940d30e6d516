use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal classification of one TCP connect attempt.
///
/// `Unknown` covers connect errors outside the expected refuse/timeout pair
/// (network unreachable, permission denied, ...); such conditions are recorded
/// instead of aborting the scan.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PortState {
    Open,
    Timeout,
    ConnRefused,
    Unknown,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::Open => write!(f, "open"),
            PortState::Timeout => write!(f, "timeout"),
            PortState::ConnRefused => write!(f, "connrefused"),
            PortState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Finished outcome of probing exactly one port. Constructed only once the
/// verdict is known and never mutated afterwards.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub port: u16,
    pub state: PortState,
}

/// Aggregate per-state counters for one scan.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScanSummary {
    pub probed: u64,
    pub open: u64,
    pub timeout: u64,
    pub refused: u64,
    pub unknown: u64,
}
