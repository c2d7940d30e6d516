use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, Stream};
use tokio::net::{lookup_host, TcpStream};
use tokio::sync::Mutex;
use tokio::time;

use crate::error::ScanError;
use crate::output::ResultObserver;
use crate::types::{PortState, ScanResult};

/// Shared handle to a registered observer.
///
/// Handles are reference-counted: the scanner never owns an observer's
/// lifetime, and callers keep their clone to inspect observer state after the
/// scan completes.
pub type ObserverHandle = Arc<Mutex<dyn ResultObserver + Send>>;

/// Connection layer used by the scan loop.
///
/// Abstracts name resolution and the bounded connect attempt so tests can
/// substitute a deterministic fake for the real TCP stack.
#[async_trait]
pub trait Connect: Send + Sync {
    /// Resolve the target to a socket address for one attempt.
    async fn resolve(&self, target: &str, port: u16) -> io::Result<SocketAddr>;

    /// Attempt one TCP connect to `addr`, bounded by `timeout`.
    ///
    /// The socket is released before returning, on every exit path.
    async fn connect(&self, addr: SocketAddr, timeout: Duration) -> io::Result<()>;
}

/// Production connection layer backed by tokio's TCP stack.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetConnect;

#[async_trait]
impl Connect for NetConnect {
    async fn resolve(&self, target: &str, port: u16) -> io::Result<SocketAddr> {
        let mut addrs = lookup_host((target, port)).await?;
        addrs.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses found for {target}"),
            )
        })
    }

    async fn connect(&self, addr: SocketAddr, timeout: Duration) -> io::Result<()> {
        match time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
        }
    }
}

/// Sequential TCP connect scanner.
///
/// Owns the target, the ordered port list and the per-attempt timeout, and
/// drives exactly one connect attempt per port, in order. Each finished
/// result is appended to the history, pushed to every registered observer,
/// then yielded to the caller.
pub struct TcpConnectScanner<C = NetConnect> {
    target: String,
    ports: Vec<u16>,
    timeout: Duration,
    results: Vec<ScanResult>,
    observers: Vec<ObserverHandle>,
    connector: C,
}

impl TcpConnectScanner<NetConnect> {
    /// Create a scanner over the real TCP stack.
    ///
    /// `ports` is probed in the given order, duplicates included. `timeout`
    /// bounds each connect attempt, not the whole scan, and must be positive
    /// (not validated here).
    pub fn new(target: impl Into<String>, ports: Vec<u16>, timeout: Duration) -> Self {
        Self::with_connector(target, ports, timeout, NetConnect)
    }
}

impl<C: Connect> TcpConnectScanner<C> {
    /// Create a scanner over a custom connection layer.
    pub fn with_connector(
        target: impl Into<String>,
        ports: Vec<u16>,
        timeout: Duration,
        connector: C,
    ) -> Self {
        Self {
            target: target.into(),
            ports,
            timeout,
            results: Vec::new(),
            observers: Vec::new(),
            connector,
        }
    }

    /// Register an observer to be notified of every finished result.
    ///
    /// Registration is add-only and keeps duplicates: registering the same
    /// handle twice doubles its notifications.
    pub fn register(&mut self, observer: ObserverHandle) {
        self.observers.push(observer);
    }

    /// Results accumulated so far, in attempt order.
    pub fn results(&self) -> &[ScanResult] {
        &self.results
    }

    /// Run the scan as a lazy, pull-driven stream of outcomes.
    ///
    /// - Nothing executes between polls; each consumed element is one probe.
    /// - Observers are notified before the element is yielded, so the
    ///   consumer never sees a result earlier than the observers did.
    /// - A host resolution failure is yielded once as an error and ends the
    ///   stream; the remaining ports are not probed.
    /// - Dropping the stream abandons the rest of the scan.
    pub fn execute(&mut self) -> impl Stream<Item = Result<ScanResult, ScanError>> + '_ {
        Box::pin(stream::unfold((self, 0usize), |(scanner, idx)| async move {
            let port = *scanner.ports.get(idx)?;
            match scanner.probe(port).await {
                Ok(result) => Some((Ok(result), (scanner, idx + 1))),
                Err(err) => {
                    // The target itself is unreachable; further ports would
                    // fail the same way.
                    let end = scanner.ports.len();
                    Some((Err(err), (scanner, end)))
                }
            }
        }))
    }

    /// One connect attempt: resolve, connect, classify, record, notify.
    async fn probe(&mut self, port: u16) -> Result<ScanResult, ScanError> {
        let addr = self
            .connector
            .resolve(&self.target, port)
            .await
            .map_err(|source| ScanError::HostResolution {
                target: self.target.clone(),
                source,
            })?;

        let state = match self.connector.connect(addr, self.timeout).await {
            Ok(()) => PortState::Open,
            Err(e) => match e.kind() {
                io::ErrorKind::TimedOut => PortState::Timeout,
                io::ErrorKind::ConnectionRefused => PortState::ConnRefused,
                kind => {
                    log::warn!(
                        "unexpected error probing {}:{} ({:?}): {}",
                        self.target,
                        port,
                        kind,
                        e
                    );
                    PortState::Unknown
                }
            },
        };

        let result = ScanResult { port, state };
        self.results.push(result);
        self.notify_all(&result).await;
        Ok(result)
    }

    async fn notify_all(&self, result: &ScanResult) {
        for observer in &self.observers {
            observer.lock().await.update(result);
        }
    }
}
