use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use xrefmig_core::{CoreError, ExitCode, MigratorConfig};
use xrefmig_science::{Doi, Lookup, MigrationRun, RegistryResolver, ScienceError};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xrefmig",
    about = "Move journal article DOIs to a new prefix and build Crossref deposit batches",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting XREFMIG_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Config file to use instead of the standard location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate every DOI listed in the input directory.
    Run {
        /// Directory of `DOI,new URL` CSV files.
        #[arg(long)]
        input: Option<String>,
        /// Directory for deposit batches and ledger files.
        #[arg(long)]
        output: Option<String>,
        #[arg(long)]
        old_prefix: Option<String>,
        #[arg(long)]
        new_prefix: Option<String>,
    },

    /// Look up one DOI and print its normalized record.
    Resolve { doi: String },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective config.
    Show,
    /// Print the config file path.
    Path,
    /// Write a default config file.
    Init {
        #[arg(long)]
        force: bool,
    },
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json_output = cli.json || std::env::var("XREFMIG_JSON").as_deref() == Ok("1");
    let config_path = cli.config.clone().unwrap_or_else(MigratorConfig::config_path);
    let mut config = MigratorConfig::load_from(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    match cli.command {
        Commands::Run {
            input,
            output,
            old_prefix,
            new_prefix,
        } => {
            if let Some(dir) = input {
                config.migration.input_dir = dir;
            }
            if let Some(dir) = output {
                config.migration.output_dir = dir;
            }
            if let Some(prefix) = old_prefix {
                config.migration.old_prefix = prefix;
            }
            if let Some(prefix) = new_prefix {
                config.migration.new_prefix = prefix;
            }
            exit_on_invalid(&config, json_output)?;

            info!(
                old_prefix = %config.migration.old_prefix,
                new_prefix = %config.migration.new_prefix,
                input = %config.migration.input_dir,
                "starting migration"
            );
            let resolver = RegistryResolver::from_config(&config)?;
            let summary = match MigrationRun::new(config, resolver)?.run().await {
                Ok(summary) => summary,
                Err(e) => exit_on_failure(&e, json_output),
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": summary,
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!(
                    "Processed {} file(s): {} migrated, {} failed, {} batch(es) in {}",
                    summary.files_processed,
                    summary.records_migrated,
                    summary.records_failed,
                    summary.batches_written,
                    summary.output_dir,
                );
            }
        }

        Commands::Resolve { doi } => {
            let doi = match Doi::parse(&doi) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(ExitCode::GeneralError as i32);
                }
            };
            let resolver = RegistryResolver::from_config(&config)?;
            let lookup = match resolver.resolve_record(&doi).await {
                Ok(lookup) => lookup,
                Err(e) => exit_on_failure(&e, json_output),
            };
            let dur = start.elapsed().as_millis();

            match lookup {
                Lookup::Found(record) => {
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":record,"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("{}", serde_json::to_string_pretty(&record)?);
                    }
                }
                Lookup::NotFound => {
                    if json_output {
                        print_json(&serde_json::json!({"status":"error","error":"not_found","message":format!("{doi} not found at any registry"),"meta":{"duration_ms":dur}}))?;
                    } else {
                        eprintln!("{doi} not found at any registry");
                    }
                    std::process::exit(ExitCode::NotFound as i32);
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":config}))?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Path => {
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"path":config_path}}))?;
                } else {
                    println!("{}", config_path.display());
                }
            }
            ConfigAction::Init { force } => {
                init_config(&config_path, force)?;
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"path":config_path}}))?;
                } else {
                    println!("Wrote default config to {}", config_path.display());
                }
            }
        },
    }

    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn exit_on_invalid(config: &MigratorConfig, json_output: bool) -> Result<()> {
    if let Err(e) = config.validate() {
        if json_output {
            print_json(&serde_json::json!({"status":"error","error":"invalid_config","message":e.to_string()}))?;
        } else {
            eprintln!("{e}");
        }
        std::process::exit(ExitCode::InvalidConfig as i32);
    }
    Ok(())
}

/// Report a run-halting error and exit with a code scripts can branch on.
fn exit_on_failure(e: &ScienceError, json_output: bool) -> ! {
    let code = match e {
        ScienceError::Http(_) | ScienceError::ApiError(..) => ExitCode::NetworkError,
        ScienceError::Core(CoreError::Io(_) | CoreError::DirectoryNotFound(_)) => {
            ExitCode::FileSystemError
        }
        _ => ExitCode::GeneralError,
    };
    if json_output {
        let val = serde_json::json!({"status":"error","error":"run_failed","message":e.to_string()});
        println!("{val}");
    } else {
        eprintln!("error: {e}");
    }
    std::process::exit(code as i32);
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        eprintln!(
            "Config already exists at {}. Add --force to overwrite.",
            path.display()
        );
        std::process::exit(ExitCode::FileSystemError as i32);
    }
    MigratorConfig::default()
        .save_to(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
