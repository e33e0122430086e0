//! Epiwear CLI
//!
//! Offline windowed feature extraction for wearable seizure-study recordings.

use chrono::Utc;
use clap::{Parser, Subcommand};
use epiwear::{
    client::{ApiConfig, BlockingClient},
    config::Config,
    pipeline::{Pipeline, StageOptions},
    VERSION,
};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "epiwear")]
#[command(version = VERSION)]
#[command(about = "Windowed feature extraction for wearable seizure-study recordings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and export a feature table
    Run {
        /// Study name (prompted for when omitted)
        #[arg(long)]
        study: Option<String>,

        /// Fixed window size in milliseconds (default: shortest seizure duration)
        #[arg(long)]
        window_ms: Option<i64>,

        /// Preictal horizon in minutes
        #[arg(long)]
        preictal_min: Option<i64>,

        /// Min-max normalize sensor columns before windowing
        #[arg(long)]
        normalize: bool,

        /// Output file for the feature table (default: export directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the per-sensor null/outlier report without removing anything
    Info {
        /// Study name (prompted for when omitted)
        #[arg(long)]
        study: Option<String>,
    },

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            study,
            window_ms,
            preictal_min,
            normalize,
            output,
        } => cmd_run(study, window_ms, preictal_min, normalize, output),
        Commands::Info { study } => cmd_info(study),
        Commands::Config => cmd_config(),
    }
}

fn cmd_run(
    study: Option<String>,
    window_ms: Option<i64>,
    preictal_min: Option<i64>,
    normalize: bool,
    output: Option<PathBuf>,
) {
    println!("Epiwear v{VERSION}");
    println!();

    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let study = study.unwrap_or_else(prompt_study);
    let opts = StageOptions {
        preictal_ms: preictal_min.unwrap_or(config.preictal_minutes) * 60 * 1000,
        window_ms: window_ms.or(config.window_ms),
        normalize: normalize || config.normalize,
    };

    let pipeline = match build_pipeline(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match pipeline.run(&study, &opts) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!("Study '{}' ({})", result.study.name, result.study.id);
    println!(
        "Synchronized {} co-recorded segments across {} sensors",
        result.segments,
        config.sensors.len()
    );
    println!(
        "Merged {} rows on the shared time index; {} seizure annotations",
        result.merged_rows, result.events
    );
    println!(
        "Removed {} rows ({} all-null timestamps, {} all-outlier timestamps)",
        result.removal.rows_removed,
        result.removal.common_null_times,
        result.removal.common_outlier_times
    );
    println!(
        "Windowed {} rows into {} feature rows ({}ms windows)",
        result.rows,
        result.features.windows.len(),
        result.features.window_ms
    );
    let (non_seizure, ictal, preictal) = result.features.phase_counts();
    println!(
        "Windows: {} non-seizure, {} ictal, {} preictal",
        non_seizure, ictal, preictal
    );

    let export_path = output.unwrap_or_else(|| {
        config.export_path.join(format!(
            "features_{}_{}.json",
            sanitize_filename(&result.study.name),
            Utc::now().format("%Y%m%d_%H%M%S")
        ))
    });

    if let Some(parent) = export_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match serde_json::to_string_pretty(&result.features) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&export_path, json) {
                eprintln!("Error writing feature table: {e}");
                std::process::exit(1);
            }
            println!(
                "Exported {} feature rows to {:?}",
                result.features.windows.len(),
                export_path
            );
        }
        Err(e) => {
            eprintln!("Error serializing feature table: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_info(study: Option<String>) {
    let config = Config::load().unwrap_or_default();
    let study = study.unwrap_or_else(prompt_study);

    let pipeline = match build_pipeline(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match pipeline.inspect(&study, config.preictal_ms()) {
        Ok((summary, report)) => {
            println!();
            println!("Null/outlier report for study '{}'", summary.name);
            println!("{report}");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Build the blocking client and pipeline from config + environment.
fn build_pipeline(config: &Config) -> Result<Pipeline, epiwear::ApiError> {
    let api = ApiConfig::from_env(&config.api_base_url)?;
    let client = BlockingClient::new(api)?;
    Ok(Pipeline::new(client, config.sensors.clone()))
}

/// Replace filesystem-hostile characters in a study name with underscores.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

/// Interactive fallback matching the original study-selection prompt.
fn prompt_study() -> String {
    print!("Study name: ");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() || line.trim().is_empty() {
        eprintln!("Error: a study name is required");
        std::process::exit(1);
    }
    line.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Study A (v2)"), "Study_A__v2_");
        assert_eq!(sanitize_filename("epi-2024.1"), "epi-2024.1");
    }
}
