use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use delstat::{process_path, report::RunReport, summary, ParsePolicy, ProcessOptions};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::PathBuf,
    time::Instant,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Summarise a USPS delivery statistics file by ZIP code"
)]
struct Args {
    /// The delstat file from an Address Information System product (raw or .zip)
    delstatfile: PathBuf,

    /// Directory for the summary CSV; defaults to the input's directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// What to do with a record whose counts do not parse
    #[arg(long, value_enum, default_value_t = ParsePolicy::Halt)]
    on_parse_error: ParsePolicy,

    /// Records decoded per batch
    #[arg(long, default_value_t = 4096)]
    batch_size: usize,

    /// Decoder threads; 1 decodes on the main thread
    #[arg(long)]
    threads: Option<usize>,

    /// Also write a JSON run report here
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();

    // ─── 2) configure decoding ──────────────────────────────────────
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n.max(1))
            .build_global()
            .ok();
    }
    let opts = ProcessOptions {
        on_parse_error: args.on_parse_error,
        batch_size: args.batch_size,
        parallel: args.threads != Some(1),
    };

    // ─── 3) aggregate ───────────────────────────────────────────────
    info!(input = %args.delstatfile.display(), "working");
    let started_at = Utc::now();
    let start = Instant::now();
    let outcome = process_path(&args.delstatfile, &opts)
        .with_context(|| format!("processing {}", args.delstatfile.display()))?;

    // ─── 4) write summary beside the input ──────────────────────────
    let summary = outcome.summary();
    let out_path = summary::output_path(&args.delstatfile, args.output_dir.as_deref(), &summary);
    if let Some(dir) = out_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = File::create(&out_path)
        .with_context(|| format!("creating summary {}", out_path.display()))?;
    summary
        .write_csv(BufWriter::new(file))
        .with_context(|| format!("writing summary {}", out_path.display()))?;

    info!(output = %out_path.display(), elapsed = ?start.elapsed(), "saved output");
    info!(
        records = outcome.stats.records_processed,
        skipped = outcome.stats.records_skipped,
        zip_codes = outcome.aggregates.len(),
        truncated_bytes = ?outcome.stats.truncated_bytes,
        "total records processed"
    );

    // ─── 5) optional run report ─────────────────────────────────────
    if let Some(report_path) = &args.report {
        RunReport::new(
            &args.delstatfile,
            &out_path,
            opts.on_parse_error,
            &outcome,
            started_at,
            Utc::now(),
        )
        .write_json(report_path)?;
        info!(report = %report_path.display(), "wrote run report");
    }

    Ok(())
}
