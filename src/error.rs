use thiserror::Error;

/// Host-level failures surfaced through the scan stream.
///
/// Per-port outcomes are never errors: timeouts and refusals are absorbed into
/// [`PortState`](crate::types::PortState). Only a failure that concerns the
/// target itself escapes as a distinct value.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The target could not be resolved to a usable socket address.
    #[error("failed to resolve target address {target}")]
    HostResolution {
        target: String,
        #[source]
        source: std::io::Error,
    },
}
