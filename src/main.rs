use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use port_sweep_rs::cli::{self, Cli};
use port_sweep_rs::hostinfo::HostInfo;
use port_sweep_rs::output;
use port_sweep_rs::scanner::{ResultObserver, ScanEngine};
use port_sweep_rs::types::ProbeResult;
use port_sweep_rs::ScanError;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    output::init_colors(cli.no_color);

    if !cli.json {
        println!("{}\n", output::banner(&HostInfo::detect()));
    }

    // No --host: fall back to the interactive prompts.
    let spec = match cli.to_spec() {
        Some(spec) => spec,
        None => {
            // Prompts go to stderr under --json so stdout stays parseable.
            let prompted = {
                let mut input = io::stdin().lock();
                if cli.json {
                    cli::prompt_spec(&mut input, &mut io::stderr())
                } else {
                    cli::prompt_spec(&mut input, &mut io::stdout())
                }
            };
            match prompted {
                Ok(spec) => spec,
                Err(e) => {
                    println!("{}", output::error_line(&format!("{e:#}")));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    };

    if !cli.json {
        println!("\n{}", output::scanning_line(&spec));
    }

    let mut engine = match ScanEngine::new(spec).await {
        Ok(engine) => engine,
        Err(e) => {
            println!("{}", output::error_line(&e));
            return Ok(ExitCode::FAILURE);
        }
    };

    let observer = if engine.spec().verbose && !cli.json {
        let print: ResultObserver = Arc::new(|port: u16, open: bool| {
            println!("{}", output::port_line(ProbeResult { port, open }))
        });
        Some(print)
    } else {
        None
    };

    // Ctrl-C stops handing out new ports; whatever was found so far is still reported.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_ctrlc.cancel();
        }
    });

    let mut status = ExitCode::SUCCESS;
    match engine.scan_with_cancel(observer, cancel).await {
        Ok(()) => {}
        Err(e @ ScanError::Cancelled { .. }) => {
            eprintln!("{}", output::error_line(&e));
            status = ExitCode::FAILURE;
        }
        Err(e) => {
            println!("{}", output::error_line(&e));
            return Ok(ExitCode::FAILURE);
        }
    }

    if cli.json {
        if let Some(report) = engine.report() {
            output::write_report_json(io::stdout().lock(), &report)?;
        }
    } else {
        print!("{}", output::summary(engine.open_ports()));
    }

    Ok(status)
}
