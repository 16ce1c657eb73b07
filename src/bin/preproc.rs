use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use eegprep::{run_all, PrepConfig};

#[derive(Parser)]
#[command(name = "preproc", about = "Align EDF recordings to per-patient channel layouts")]
struct Args {
    /// JSON configuration with `Paths` and `Parameters` sections
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Worker threads (default: one per CPU core)
    #[arg(long)]
    jobs: Option<usize>,

    /// Only run these patient ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    patients: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let mut cfg = PrepConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if !args.patients.is_empty() {
        cfg.tasks.retain(|t| args.patients.contains(&t.patient));
    }
    println!("{} patient tasks from {}", cfg.tasks.len(), args.config.display());

    let results = run_all(&cfg, args.jobs)?;

    let mut failed = 0usize;
    for (task, result) in &results {
        match result {
            Ok(report) => println!(
                "chb{}: {} written, {} skipped",
                task.patient,
                report.written.len(),
                report.skipped.len()
            ),
            Err(e) => {
                failed += 1;
                eprintln!("chb{}: FAILED: {e}", task.patient);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} patient tasks failed", results.len());
    }
    println!("Written → {}", cfg.paths.clean_path.display());
    Ok(())
}
