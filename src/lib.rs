//! Library crate for port-sweep-rs: a bounded-concurrency TCP connect scanner.
pub mod cli;
pub mod error;
pub mod hostinfo;
pub mod output;
pub mod probe;
pub mod scanner;
pub mod spec;
pub mod types;

pub use error::{ScanError, ValidationError};
pub use scanner::ScanEngine;
pub use spec::ScanSpec;
