use crate::error::{ScanError, ScanResult, ValidationError};
use crate::probe::{PortProbe, TcpConnectProbe};
use crate::spec::{resolve_host, ScanSpec};
use crate::types::{rfc3339, ProbeResult, ScanReport};
use ::time::OffsetDateTime;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Per-port callback, invoked on the worker task that probed the port.
pub type ResultObserver = Arc<dyn Fn(u16, bool) + Send + Sync>;

#[derive(Debug, Clone, Copy)]
struct RunStats {
    started_at: OffsetDateTime,
    elapsed: Duration,
    scanned: u64,
}

/// Validated scan target plus the open ports found by the last run.
///
/// Construction checks the spec and resolves the host; [`ScanEngine::scan`]
/// then probes every port in the range with a fixed pool of
/// `spec.concurrency` workers and stores the sorted open ports.
pub struct ScanEngine {
    spec: ScanSpec,
    address: IpAddr,
    probe: Arc<dyn PortProbe>,
    open_ports: Vec<u16>,
    last_run: Option<RunStats>,
}

impl std::fmt::Debug for ScanEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanEngine")
            .field("spec", &self.spec)
            .field("address", &self.address)
            .field("open_ports", &self.open_ports)
            .finish_non_exhaustive()
    }
}

impl ScanEngine {
    /// Validate `spec` and resolve its host, probing with plain TCP connects.
    pub async fn new(spec: ScanSpec) -> Result<Self, ValidationError> {
        Self::with_probe(spec, TcpConnectProbe).await
    }

    /// Same as [`ScanEngine::new`] with a caller-supplied probe.
    pub async fn with_probe<P: PortProbe>(spec: ScanSpec, probe: P) -> Result<Self, ValidationError> {
        spec.validate()?;
        let address = resolve_host(&spec.host).await?;
        log::debug!("{} resolved to {address}", spec.host);
        Ok(Self {
            spec,
            address,
            probe: Arc::new(probe),
            open_ports: Vec::new(),
            last_run: None,
        })
    }

    pub fn spec(&self) -> &ScanSpec {
        &self.spec
    }

    /// The address every probe connects to.
    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// Ascending open ports from the last completed scan; empty before the first.
    pub fn open_ports(&self) -> &[u16] {
        &self.open_ports
    }

    /// Probe every port in the range, returning once all have been probed.
    pub async fn scan(&mut self) -> ScanResult<()> {
        self.run(None, None).await
    }

    /// Like [`ScanEngine::scan`], calling `on_result(port, open)` once per port
    /// in completion order.
    pub async fn scan_with<F>(&mut self, on_result: F) -> ScanResult<()>
    where
        F: Fn(u16, bool) + Send + Sync + 'static,
    {
        let observer: ResultObserver = Arc::new(on_result);
        self.run(Some(observer), None).await
    }

    /// Scan that stops claiming new ports once `cancel` fires.
    ///
    /// Probes already in flight finish and are recorded. A cancelled run still
    /// stores its partial open-port list but returns [`ScanError::Cancelled`].
    pub async fn scan_with_cancel(
        &mut self,
        on_result: Option<ResultObserver>,
        cancel: CancellationToken,
    ) -> ScanResult<()> {
        self.run(on_result, Some(cancel)).await
    }

    /// Report for the last run, if there was one.
    pub fn report(&self) -> Option<ScanReport> {
        let stats = self.last_run?;
        Some(ScanReport {
            host: self.spec.host.clone(),
            address: self.address.to_string(),
            start_port: self.spec.start_port as u16,
            end_port: self.spec.end_port as u16,
            scanned: stats.scanned,
            open_ports: self.open_ports.clone(),
            elapsed_ms: stats.elapsed.as_millis() as u64,
            started_at: rfc3339(stats.started_at),
        })
    }

    async fn run(
        &mut self,
        observer: Option<ResultObserver>,
        cancel: Option<CancellationToken>,
    ) -> ScanResult<()> {
        let ports: Arc<[u16]> = self.spec.port_list().into();
        let total = ports.len();
        let cursor = Arc::new(AtomicUsize::new(0));
        let scanned = Arc::new(AtomicU64::new(0));
        let found = Arc::new(Mutex::new(Vec::new()));
        let timeout = self.spec.timeout();
        let ip = self.address;

        log::info!(
            "scanning {} ({ip}) ports {}-{} with {} workers, timeout {}ms",
            self.spec.host,
            self.spec.start_port,
            self.spec.end_port,
            self.spec.concurrency,
            self.spec.timeout_ms
        );
        let started_at = OffsetDateTime::now_utc();
        let start = Instant::now();

        let mut set = JoinSet::new();
        for _ in 0..self.spec.concurrency {
            let ports = ports.clone();
            let cursor = cursor.clone();
            let scanned = scanned.clone();
            let found = found.clone();
            let probe = self.probe.clone();
            let observer = observer.clone();
            let cancel = cancel.clone();

            set.spawn(async move {
                loop {
                    if cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                        break;
                    }
                    let Some(&port) = ports.get(cursor.fetch_add(1, Ordering::Relaxed)) else {
                        break;
                    };

                    let result = ProbeResult {
                        port,
                        open: probe.probe(SocketAddr::new(ip, port), timeout).await,
                    };
                    log::debug!("{ip} {result}");
                    if result.open {
                        found.lock().await.push(result.port);
                    }
                    scanned.fetch_add(1, Ordering::Relaxed);

                    if let Some(notify) = &observer {
                        notify(result.port, result.open);
                    }
                }
            });
        }

        let mut failure = None;
        while let Some(res) = set.join_next().await {
            if let Err(e) = res {
                log::warn!("scan worker failed: {e}");
                failure.get_or_insert_with(|| e.to_string());
            }
        }

        let mut open_ports = std::mem::take(&mut *found.lock().await);
        open_ports.sort_unstable();
        open_ports.dedup();
        self.open_ports = open_ports;

        let scanned = scanned.load(Ordering::Relaxed);
        let elapsed = start.elapsed();
        self.last_run = Some(RunStats {
            started_at,
            elapsed,
            scanned,
        });
        log::info!(
            "scan of {} finished in {:.2}s: {}/{} ports open",
            self.spec.host,
            elapsed.as_secs_f64(),
            self.open_ports.len(),
            total
        );

        if let Some(msg) = failure {
            return Err(ScanError::Worker(msg));
        }
        if (scanned as usize) < total {
            return Err(ScanError::Cancelled {
                scanned: scanned as usize,
                total,
            });
        }
        Ok(())
    }
}
