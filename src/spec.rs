use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::error::ValidationError;

pub const MAX_PORT: u32 = 65_535;
/// Largest number of ports a single scan may cover.
pub const MAX_RANGE: u32 = 10_000;
pub const MAX_CONCURRENCY: u32 = 500;

pub const DEFAULT_START_PORT: u32 = 1;
pub const DEFAULT_END_PORT: u32 = 1024;
pub const DEFAULT_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_CONCURRENCY: u32 = 20;
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Parameters that fully determine one scan run.
///
/// Ports and concurrency are kept as `u32` so that out-of-range input such as
/// `0` or `65536` can be represented and rejected by [`ScanSpec::validate`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanSpec {
    pub host: String,
    pub start_port: u32,
    pub end_port: u32,
    pub timeout_ms: u64,
    pub concurrency: u32,
    /// Only consulted by the caller's observer; the engine ignores it.
    pub verbose: bool,
}

impl ScanSpec {
    /// A spec for `host` with the default range, timeout and concurrency.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            start_port: DEFAULT_START_PORT,
            end_port: DEFAULT_END_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: DEFAULT_CONCURRENCY,
            verbose: false,
        }
    }

    pub fn ports(mut self, start: u32, end: u32) -> Self {
        self.start_port = start;
        self.end_port = end;
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn concurrency(mut self, concurrency: u32) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check the numeric rules in order, returning the first one violated.
    ///
    /// Host resolvability is checked separately by [`resolve_host`] since it
    /// needs the resolver.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (start, end) = (self.start_port, self.end_port);
        if start > end {
            return Err(ValidationError::StartAfterEnd { start, end });
        }
        if start < 1 || end > MAX_PORT {
            return Err(ValidationError::PortOutOfRange { start, end });
        }
        let size = end - start + 1;
        if size > MAX_RANGE {
            return Err(ValidationError::RangeTooLarge { size });
        }
        if self.concurrency < 1 || self.concurrency > MAX_CONCURRENCY {
            return Err(ValidationError::ConcurrencyOutOfBounds(self.concurrency));
        }
        if self.timeout_ms < 1 {
            return Err(ValidationError::NonPositiveTimeout(self.timeout_ms));
        }
        Ok(())
    }

    /// Number of ports in the inclusive range. Meaningful only on a validated spec.
    pub fn range_len(&self) -> usize {
        (self.end_port.saturating_sub(self.start_port) + 1) as usize
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The ascending list of ports to probe. Meaningful only on a validated spec.
    pub fn port_list(&self) -> Vec<u16> {
        (self.start_port..=self.end_port)
            .filter_map(|p| u16::try_from(p).ok())
            .collect()
    }
}

/// Resolve `host` to the address that will be probed.
///
/// IPv4 literals are taken as-is. Anything else goes through the system
/// resolver; an IPv4 result is preferred when the name has both families.
pub async fn resolve_host(host: &str) -> Result<IpAddr, ValidationError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ValidationError::InvalidHost(host.to_string()));
    }
    if let Ok(v4) = host.parse::<Ipv4Addr>() {
        return Ok(IpAddr::V4(v4));
    }

    let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| {
            log::debug!("resolving {host} failed: {e}");
            ValidationError::InvalidHost(host.to_string())
        })?
        .map(|sa| sa.ip())
        .collect();

    addrs
        .iter()
        .copied()
        .find(IpAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
        .ok_or_else(|| ValidationError::InvalidHost(host.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(start: u32, end: u32) -> ScanSpec {
        ScanSpec::new("127.0.0.1").ports(start, end)
    }

    #[test]
    fn defaults_match_cli_defaults() {
        let s = ScanSpec::new("localhost");
        assert_eq!((s.start_port, s.end_port), (1, 1024));
        assert_eq!(s.timeout_ms, 500);
        assert_eq!(s.concurrency, 20);
        assert!(!s.verbose);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn full_port_span_passes_bounds_check() {
        // 1-65535 passes the bounds check; a 10000-port window at the top edge is fine.
        assert!(matches!(
            spec(1, 65_535).validate(),
            Err(ValidationError::RangeTooLarge { size: 65_535 })
        ));
        assert!(spec(55_536, 65_535).validate().is_ok());
    }

    #[test]
    fn start_after_end_checked_first() {
        // Also out of range, but ordering wins.
        let err = spec(70_000, 0).validate().unwrap_err();
        assert_eq!(err, ValidationError::StartAfterEnd { start: 70_000, end: 0 });
    }

    #[test]
    fn port_list_is_ascending_and_inclusive() {
        assert_eq!(spec(8000, 8002).port_list(), vec![8000, 8001, 8002]);
        assert_eq!(spec(80, 80).range_len(), 1);
    }

    #[tokio::test]
    async fn resolve_ipv4_literal_without_lookup() {
        let ip = resolve_host(" 10.0.0.7 ").await.unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)));
    }

    #[tokio::test]
    async fn resolve_rejects_empty_and_garbage() {
        assert!(resolve_host("").await.is_err());
        assert!(resolve_host("not a host!").await.is_err());
    }
}
