//! Benchmark command handler.

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use keyfly_core::{Gateway, GatewayConfig, run_benchmark};

use crate::cli::{BenchmarkArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::{output, report};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Samples")]
    count: usize,
    #[tabled(rename = "Mean (s)")]
    mean: String,
    #[tabled(rename = "Median (s)")]
    median: String,
    #[tabled(rename = "Min (s)")]
    min: String,
    #[tabled(rename = "Max (s)")]
    max: String,
    #[tabled(rename = "Std dev (s)")]
    std_dev: String,
}

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Min delay (s)")]
    delay: String,
    #[tabled(rename = "Max req/s")]
    rate: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    gw: &Gateway,
    config: &GatewayConfig,
    args: BenchmarkArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let bar = progress_bar(global);

    let result = run_benchmark(gw, config, args.iterations, |p| {
        if let Some(ref bar) = bar {
            bar.set_length(p.total as u64);
            bar.set_position(p.completed as u64);
        }
    })
    .await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    let report = result?;

    match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            let summaries = output::render_list(
                &global.output,
                &report.summaries,
                |s| SummaryRow {
                    class: s.class.to_string(),
                    count: s.count,
                    mean: format!("{:.3}", s.mean),
                    median: format!("{:.3}", s.median),
                    min: format!("{:.3}", s.min),
                    max: format!("{:.3}", s.max),
                    std_dev: s.std_dev.map_or_else(|| "-".into(), |v| format!("{v:.3}")),
                },
                |s| format!("{} {:.3}", s.class, s.mean),
            );
            output::print_output(&summaries, global.quiet);

            let recs = output::render_list(
                &global.output,
                &report.recommendations,
                |r| RecommendationRow {
                    class: r.class.to_string(),
                    delay: format!("{:.2}", r.recommended_delay_secs),
                    rate: format!("{:.2}", r.max_requests_per_sec),
                },
                |r| format!("{} {:.2}", r.class, r.recommended_delay_secs),
            );
            output::print_output(&recs, global.quiet);

            if !global.quiet {
                if report.skipped > 0 {
                    eprintln!("{} calls failed and were skipped", report.skipped);
                }
                if let Some(workers) = report.suggested_scan_workers {
                    eprintln!("Suggested scanner concurrency: {workers}");
                }
            }
        }
        OutputFormat::Json => {
            output::print_output(&output::render_json_pretty(&report), global.quiet);
        }
        OutputFormat::JsonCompact => {
            output::print_output(&output::render_json_compact(&report), global.quiet);
        }
        OutputFormat::Yaml => {
            output::print_output(&output::render_yaml(&report), global.quiet);
        }
    }

    if !args.no_report {
        let path = report::write_report(&report)?;
        if !global.quiet {
            eprintln!("Report written to {}", path.display());
        }
    }

    Ok(())
}

/// An indicatif bar for interactive runs; nothing under `--quiet`.
fn progress_bar(global: &GlobalOpts) -> Option<ProgressBar> {
    if global.quiet {
        return None;
    }
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} benchmarking [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    Some(bar)
}
