use thiserror::Error;

/// Reason a `ScanSpec` was rejected at engine construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("start > end: start port {start} is greater than end port {end}")]
    StartAfterEnd { start: u32, end: u32 },

    #[error("port out of range: ports must be 1-65535 (got {start}-{end})")]
    PortOutOfRange { start: u32, end: u32 },

    #[error("range too large: {size} ports requested (max 10000)")]
    RangeTooLarge { size: u32 },

    #[error("concurrency out of bounds: {0} (must be 1-500)")]
    ConcurrencyOutOfBounds(u32),

    #[error("timeout must be positive (got {0}ms)")]
    NonPositiveTimeout(u64),

    #[error("invalid host: {0}")]
    InvalidHost(String),
}

/// Failure of a scan run as a whole. Per-port connect failures never show up here.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("scan worker failed: {0}")]
    Worker(String),

    #[error("scan cancelled after {scanned} of {total} ports")]
    Cancelled { scanned: usize, total: usize },
}

pub type ScanResult<T> = Result<T, ScanError>;
