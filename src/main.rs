use clap::{Parser, Subcommand};
use tracing::{info, warn};

use gunstats_pipeline::config::Config;
use gunstats_pipeline::constants;
use gunstats_pipeline::logging;
use gunstats_pipeline::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "gunstats_pipeline")]
#[command(about = "Firearm statistics transform-and-load pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the transform-and-load pipeline for the configured sources
    Run {
        /// Specific sources to run (comma-separated). Available: nics, cdc
        #[arg(long)]
        sources: Option<String>,
    },
    /// List the supported source names
    ListSources,
}

fn parse_source_list(sources: Option<String>) -> Vec<String> {
    match sources {
        Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
        None => constants::get_supported_sources()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();

    // Invoking with no arguments runs every configured source
    let command = cli.command.unwrap_or(Commands::Run { sources: None });

    match command {
        Commands::Run { sources } => {
            let config = Config::load()?;
            std::fs::create_dir_all(config.data_dir())?;

            let source_names = parse_source_list(sources);
            for name in &source_names {
                if !constants::get_supported_sources().contains(&name.as_str()) {
                    warn!("Unknown source specified: {}", name);
                    println!("⚠️  Unknown source: {name}");
                }
            }

            println!("🔄 Running transform-and-load pipeline...");
            info!("Running sources: {}", source_names.join(", "));
            let summary = Pipeline::run_all(&config, &source_names);

            println!("\n📊 Pipeline results:");
            for report in &summary.reports {
                println!(
                    "   ✅ {}: {} raw rows -> {} loaded into '{}' ({})",
                    report.source,
                    report.rows_extracted,
                    report.rows_loaded,
                    report.relation,
                    report.store_file
                );
            }
            for failure in &summary.failures {
                println!("   ❌ {}: {}", failure.source, failure.error);
            }

            if summary.has_failures() {
                println!("\n⚠️  {} source(s) failed", summary.failures.len());
                std::process::exit(1);
            }
            println!("\n✅ All sources processed successfully");
        }
        Commands::ListSources => {
            println!("Supported sources:");
            for name in constants::get_supported_sources() {
                println!("   {name}");
            }
        }
    }
    Ok(())
}
