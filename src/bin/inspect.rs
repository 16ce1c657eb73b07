use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use eegprep::{read_record, Summary};

#[derive(Parser)]
#[command(name = "inspect", about = "Show the contents of summaries and prepared records")]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print channel names, lengths and seizure metadata of a record
    Record {
        file: PathBuf,
    },
    /// Print the channel layout a summary file declares
    Summary {
        file: PathBuf,
        /// Layout epoch (0 = initial layout)
        #[arg(long, default_value_t = 0)]
        epoch: usize,
        /// Also print the seizures of this recording file name
        #[arg(long)]
        recording: Option<String>,
    },
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

    match args.cmd {
        Cmd::Record { file } => {
            let rec = read_record(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            println!("{}", file.display());
            println!("  samples   : {}", rec.n_samples());
            println!("  seizures  : {}", rec.metadata.seizure_count);
            for (start, end) in &rec.metadata.intervals {
                println!("    [{start}, {end}]");
            }
            println!("  channels  : {}", rec.channels.len());
            for (name, data) in &rec.channels {
                let zero = data.iter().all(|&v| v == 0.0);
                println!("    {name:<12} {:>10}{}", data.len(), if zero { "  (zero)" } else { "" });
            }
        }
        Cmd::Summary { file, epoch, recording } => {
            let summary = Summary::load(&file)?;
            let epochs = summary.layout_epochs();
            println!("{}: {epochs} layout epochs", file.display());

            let layout = summary.channel_layout(epoch)?;
            println!("epoch {epoch}: {} channels", layout.len());
            for ch in layout.channels() {
                println!("  {:<12} index {:?} source {:?}", ch.name, ch.indices, ch.source);
            }

            if let Some(name) = recording {
                let events = summary.seizures(&name)?;
                println!("{name}: {} seizures", events.count);
                for (start, end) in &events.intervals {
                    println!("  [{start}, {end}]");
                }
            }
        }
    }
    Ok(())
}
