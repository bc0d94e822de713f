mod commands;

use std::path::PathBuf;
use std::process;

use clap::{error::ErrorKind, Parser};
use tracing_subscriber::EnvFilter;

use commands::Commands;

/// Exit status for usage errors and failures the user has to fix.
const EXIT_FATAL: i32 = 128;
/// Exit status for operations refused to protect repository state.
const EXIT_REFUSED: i32 = 1;

#[derive(Parser)]
#[command(name = "hst", about = "A small distributed version control system", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Run as if started in <path>
    #[arg(short = 'C', global = true, value_name = "path")]
    change_dir: Option<PathBuf>,
}

/// Log to stderr, filtered by `HST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("HST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(EXIT_FATAL),
            }
        }
    };
    init_tracing();

    if let Some(dir) = &cli.change_dir {
        if let Err(e) = std::env::set_current_dir(dir) {
            eprintln!("fatal: cannot change to '{}': {}", dir.display(), e);
            process::exit(EXIT_FATAL);
        }
    }

    match commands::run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("fatal: {e}");
            let code = if commands::is_refusal(&e) {
                EXIT_REFUSED
            } else {
                EXIT_FATAL
            };
            process::exit(code);
        }
    }
}
