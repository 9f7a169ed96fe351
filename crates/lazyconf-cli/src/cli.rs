//! lazyconf CLI - read key/value configuration files from the command line
//!
//! Usage:
//!   lazyconf get app.conf local.conf database.url
//!   lazyconf dump app.conf --format json
//!   lazyconf check app.conf

use clap::{Parser, Subcommand};
use colored::Colorize;
use lazyconf_core::{Store, StoreOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// lazyconf - key/value configuration with lazy interpolation
#[derive(Parser)]
#[command(name = "lazyconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get one expanded value from the configuration
    Get {
        /// Configuration file(s), later files override earlier ones
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Key to look up
        key: String,

        /// Default value if the key is not found
        #[arg(short, long)]
        default: Option<String>,

        /// Disable variable interpolation
        #[arg(long)]
        literal: bool,

        /// INI flavor: ';' comments, ':' separators
        #[arg(long)]
        ini: bool,
    },

    /// Print every key with its expanded value
    Dump {
        /// Configuration file(s), later files override earlier ones
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Disable variable interpolation
        #[arg(long)]
        literal: bool,

        /// INI flavor: ';' comments, ':' separators
        #[arg(long)]
        ini: bool,
    },

    /// Parse files and report how many keys each contributes
    Check {
        /// Configuration file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// INI flavor: ';' comments, ':' separators
        #[arg(long)]
        ini: bool,
    },
}

/// Run the CLI with the given arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Get {
            files,
            key,
            default,
            literal,
            ini,
        } => cmd_get(files, &key, default, options(literal, ini)),

        Commands::Dump {
            files,
            format,
            literal,
            ini,
        } => cmd_dump(files, &format, options(literal, ini)),

        Commands::Check { files, ini } => cmd_check(files, options(false, ini)),
    }
}

fn options(literal: bool, ini: bool) -> StoreOptions {
    let base = if literal {
        StoreOptions::literal()
    } else {
        StoreOptions::interpolating()
    };
    if ini {
        base.ini()
    } else {
        base
    }
}

fn load_store(files: &[PathBuf], options: StoreOptions) -> Result<Store, String> {
    Store::from_files(files, options).map_err(|e| format!("Failed to load configuration: {}", e))
}

fn cmd_get(
    files: Vec<PathBuf>,
    key: &str,
    default: Option<String>,
    options: StoreOptions,
) -> ExitCode {
    let store = match load_store(&files, options) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    match store.get(key) {
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(default) = default {
                println!("{}", default);
                return ExitCode::SUCCESS;
            }
            eprintln!("{}", e.to_string().red());
            ExitCode::from(1)
        }
    }
}

fn cmd_dump(files: Vec<PathBuf>, format: &str, options: StoreOptions) -> ExitCode {
    let store = match load_store(&files, options) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    let map = match store.to_map() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            return ExitCode::from(1);
        }
    };

    if format == "json" {
        match serde_json::to_string_pretty(&map) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{}", format!("Failed to serialize: {}", e).red());
                return ExitCode::from(1);
            }
        }
    } else {
        for (key, value) in &map {
            println!("{} = {}", key, value);
        }
    }

    ExitCode::SUCCESS
}

fn cmd_check(files: Vec<PathBuf>, options: StoreOptions) -> ExitCode {
    let mut store = Store::with_options(options);
    let mut failed = false;

    for file in &files {
        let before = store.len();
        match store.load_file(file, true) {
            Ok(lazyconf_core::LoadOutcome::Missing) => {
                eprintln!("{} {} not found", "✗".red(), file.display());
                failed = true;
            }
            Ok(_) => {
                println!(
                    "{} {} ({} new keys, {} total)",
                    "✓".green(),
                    file.display(),
                    store.len() - before,
                    store.len()
                );
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
