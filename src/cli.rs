use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::{ArgAction, Parser};
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::output;
use crate::spec::{
    ScanSpec, DEFAULT_CONCURRENCY, DEFAULT_END_PORT, DEFAULT_HOST, DEFAULT_START_PORT,
    DEFAULT_TIMEOUT_MS,
};

/// port-sweep-rs — concurrent TCP connect port scanner.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "port-sweep-rs",
    version,
    about = "Concurrent TCP connect port scanner.",
    long_about = None,
    disable_help_flag = true,
    after_help = "Run without --host for interactive mode."
)]
pub struct Cli {
    /// Target host or IPv4 address. Prompts interactively when omitted.
    #[arg(short = 'h', long, value_parser = NonEmptyStringValueParser::new())]
    pub host: Option<String>,

    /// First port of the range (inclusive).
    #[arg(short, long, default_value_t = DEFAULT_START_PORT)]
    pub start: u32,

    /// Last port of the range (inclusive).
    #[arg(short, long, default_value_t = DEFAULT_END_PORT)]
    pub end: u32,

    /// Connect timeout per port in milliseconds.
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// Number of concurrent workers.
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: u32,

    /// Print every port as it completes.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Print the scan report as JSON instead of the summary.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Disable ANSI colors.
    #[arg(long = "no-color", default_value_t = false)]
    pub no_color: bool,

    /// Help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Cli {
    /// The spec described by the flags, or `None` when no host was given.
    pub fn to_spec(&self) -> Option<ScanSpec> {
        let host = self.host.as_ref()?;
        Some(
            ScanSpec::new(host.trim())
                .ports(self.start, self.end)
                .timeout_ms(self.timeout)
                .concurrency(self.concurrency)
                .verbose(self.verbose),
        )
    }
}

/// Ask for each scan parameter on `out`, reading answers line by line from `input`.
///
/// A blank answer (or end of input) keeps the default. Numbers that fail to
/// parse are an error rather than silently falling back.
pub fn prompt_spec<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<ScanSpec> {
    let host = ask(input, out, "Enter host/IP: ")?;
    let host = if host.is_empty() { DEFAULT_HOST.to_string() } else { host };

    let start = ask_number(
        input,
        out,
        "start port",
        &format!("Enter start port (default {DEFAULT_START_PORT}): "),
        DEFAULT_START_PORT,
    )?;
    let end = ask_number(
        input,
        out,
        "end port",
        &format!("Enter end port (default {DEFAULT_END_PORT}): "),
        DEFAULT_END_PORT,
    )?;
    let timeout = ask_number(
        input,
        out,
        "timeout",
        &format!("Enter timeout (ms, default {DEFAULT_TIMEOUT_MS}): "),
        DEFAULT_TIMEOUT_MS,
    )?;
    let concurrency = ask_number(
        input,
        out,
        "concurrency",
        &format!("Enter concurrency (default {DEFAULT_CONCURRENCY}): "),
        DEFAULT_CONCURRENCY,
    )?;

    let verbose = ask(input, out, "Verbose mode? (y/n, default n): ")?;
    let verbose = matches!(verbose.chars().next(), Some('y' | 'Y'));

    Ok(ScanSpec::new(host)
        .ports(start, end)
        .timeout_ms(timeout)
        .concurrency(concurrency)
        .verbose(verbose))
}

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<String> {
    write!(out, "{}", output::prompt(question))?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("failed to read answer")?;
    Ok(line.trim().to_string())
}

fn ask_number<T, R, W>(input: &mut R, out: &mut W, what: &str, question: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    R: BufRead,
    W: Write,
{
    let answer = ask(input, out, question)?;
    if answer.is_empty() {
        return Ok(default);
    }
    answer
        .parse()
        .with_context(|| format!("invalid {what}: {answer}"))
}
