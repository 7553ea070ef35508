//! worker — runs one line simulation per process.
//!
//! Reads a `SimRequest` JSON document from stdin and answers on stdout.
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`).
//!
//! | Flag       | Output                                                        |
//! |------------|---------------------------------------------------------------|
//! | *(none)*   | One `SimResponse` document: `{ "report": …, "replay": […] }`  |
//! | `--stream` | One replay record per line, then the report on the last line  |
//!
//! A request that cannot be run produces `{ "error": "…" }` and exit code 1.

use std::io::{self, BufReader, BufWriter, Write};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use ls_config::{SimRequest, validate};
use ls_output::{ErrorResponse, ReplayRecorder, ReplayStream};
use ls_sim::{SimBuilder, SimReport};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    init_logging();

    let stream = std::env::args().skip(1).any(|a| a == "--stream");
    match run(stream) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            // Best effort: stdout may be the thing that failed.
            let _ = ErrorResponse::new(format!("{e:#}")).write_json(io::stdout().lock());
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// ── Run ───────────────────────────────────────────────────────────────────────

fn run(stream: bool) -> Result<()> {
    let t0 = Instant::now();
    let request = SimRequest::from_reader(BufReader::new(io::stdin().lock()))
        .context("reading request")?;
    let scenario = validate(&request).context("validating request")?;
    info!(
        stations = scenario.line.stations.len(),
        buffers = scenario.line.buffers.len(),
        orders = scenario.orders.len(),
        "request validated"
    );

    let mut sim = SimBuilder::from_scenario(scenario).build()?;
    let stdout = BufWriter::new(io::stdout().lock());

    if stream {
        let mut sink = ReplayStream::new(stdout);
        let report = sim.run(&mut sink)?;
        if let Some(e) = sink.take_error() {
            return Err(e).context("writing replay stream");
        }
        write_report(sink.into_inner(), &report)?;
    } else {
        let mut recorder = ReplayRecorder::new();
        let report = sim.run(&mut recorder)?;
        recorder.into_response(report).write_json(stdout).context("writing response")?;
    }

    info!(elapsed_ms = t0.elapsed().as_millis() as u64, "done");
    Ok(())
}

fn write_report<W: Write>(mut out: W, report: &SimReport) -> Result<()> {
    serde_json::to_writer(&mut out, &serde_json::json!({ "report": report }))?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
