use clap::{Parser, Subcommand};
use mmkp_bench::config::{Paths, Settings};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON settings file. Embedded defaults are used when omitted.
    #[arg(global = true, short, long)]
    settings: Option<PathBuf>,

    #[command(flatten)]
    paths: Paths,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one algorithm, or the configured sequence, over every benchmark group.
    Run(cmd::run::RunArgs),
    /// Correlate item profits with constraint weights for every instance.
    Analyze,
    /// Pairwise significance tests over a consolidated results sheet.
    Stats(cmd::stats::StatsArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let settings = match &cli.settings {
        Some(path) => {
            info!("📂 Loading settings: {}", path.display());
            Settings::load_from_file(path)
        }
        None => {
            info!("Using embedded settings.");
            let s = Settings::default();
            s.validate().map(|_| s)
        }
    }
    .unwrap_or_else(|e| {
        error!("❌ {}", e);
        process::exit(1);
    });

    let result = match cli.command {
        Commands::Run(args) => cmd::run::run(args, &settings, &cli.paths),
        Commands::Analyze => cmd::analyze::run(&settings, &cli.paths),
        Commands::Stats(args) => cmd::stats::run(args, &settings, &cli.paths),
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        process::exit(1);
    }
}
