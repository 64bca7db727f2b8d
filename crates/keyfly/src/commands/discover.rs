//! Discovery command handler.

use std::time::Duration;

use tabled::Tabled;

use keyfly_core::scan::{ScanOptions, ScanResult, Scanner};

use crate::cli::{DiscoverArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Latency (ms)")]
    latency: String,
}

impl From<&ScanResult> for ResultRow {
    fn from(r: &ScanResult) -> Self {
        Self {
            port: r.target.port,
            method: format!("{:?}", r.target.endpoint.method).to_uppercase(),
            path: r.target.endpoint.path.clone(),
            status: r
                .outcome
                .http_status
                .map_or_else(|| "-".into(), |s| s.to_string()),
            latency: format!("{:.0}", r.outcome.latency.as_secs_f64() * 1000.0),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DiscoverArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if !args.delay.is_finite() || args.delay < 0.0 {
        return Err(CliError::Validation {
            field: "delay".into(),
            reason: format!("must be a non-negative number, got {}", args.delay),
        });
    }

    let options = ScanOptions::default()
        .with_delay(Duration::from_secs_f64(args.delay))
        .with_concurrency(args.concurrency);
    let scanner = Scanner::new(options);

    // Ctrl-C stops dispatching new probes; in-flight ones finish and the
    // partial report is still printed.
    let cancel = scanner.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    if !global.quiet {
        eprintln!("Scanning {} ...", args.host);
    }
    let report = scanner.scan(&args.host).await?;

    let reachable: Vec<ScanResult> = report.reachable().cloned().collect();
    let out = output::render_list(&global.output, &reachable, |r| ResultRow::from(r), |r| {
        format!("{}:{}{}", report.host, r.target.port, r.target.endpoint.path)
    });
    output::print_output(&out, global.quiet);

    if !global.quiet {
        eprintln!(
            "{} open ports, {} endpoints probed, {} reachable",
            report.open_ports.len(),
            report.results.len(),
            reachable.len()
        );
    }
    Ok(())
}
