mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Parser)]
#[command(author, version, about = "BDN - Bali Document Notation checker and formatter")]
struct Cli {
    /// Configuration file (defaults to ./bdn.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check BDN documents for errors
    Check {
        /// Documents to check
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
    /// Rewrite BDN documents in canonical form
    Format {
        /// Documents to format
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<bool> {
    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Check { files } => check_files(&files, &config),
        Commands::Format { files, check } => format_files(&files, check, &config),
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
}

fn check_files(files: &[PathBuf], config: &Config) -> Result<bool> {
    let parser = bdn_syntax::Parser::with_config(config.parse_config());
    let mut all_ok = true;

    for path in files {
        let content = read(path)?;
        match parser.document(&content) {
            Ok(_) => println!("{} {}", "✓".green().bold(), path.display()),
            Err(e) => {
                eprintln!("{}: {}: {}", "error".red().bold(), path.display(), e);
                all_ok = false;
            }
        }
    }

    if !all_ok {
        eprintln!(
            "\n{}: some documents failed to parse",
            "error".red().bold()
        );
    }
    Ok(all_ok)
}

fn format_files(files: &[PathBuf], check: bool, config: &Config) -> Result<bool> {
    if files.is_empty() {
        eprintln!("{}: No files specified", "error".red().bold());
        return Ok(false);
    }

    let parser = bdn_syntax::Parser::with_config(config.parse_config());
    let format_config = config.format_config();
    let mut all_ok = true;

    for path in files {
        let content = read(path)?;

        let document = match parser.document(&content) {
            Ok(document) => document,
            Err(e) => {
                eprintln!(
                    "{}: Failed to parse {}: {}",
                    "error".red().bold(),
                    path.display(),
                    e
                );
                all_ok = false;
                continue;
            }
        };

        let formatted = bdn_syntax::format_document(&document, &format_config);

        if check {
            if formatted != content {
                println!(
                    "{}: {} would be reformatted",
                    "warning".yellow().bold(),
                    path.display()
                );
                all_ok = false;
            } else {
                println!("{} {}", "✓".green().bold(), path.display());
            }
        } else if formatted != content {
            std::fs::write(path, &formatted)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
            println!("{} {}", "formatted".green().bold(), path.display());
        } else {
            println!("{} {} (unchanged)", "✓".green().bold(), path.display());
        }
    }

    Ok(all_ok)
}
