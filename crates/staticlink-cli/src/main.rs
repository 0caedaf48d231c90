use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "staticlink",
    version,
    about = "Verify that binaries are statically linked"
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify a single binary
    Verify {
        binary: PathBuf,
        /// Warn on any dynamic dependency, even system ones
        #[arg(long)]
        strict: bool,
        /// Show library paths
        #[arg(short, long)]
        verbose: bool,
        #[arg(long)]
        json: bool,
    },
    /// Find executables under a build directory and verify each one
    Sweep {
        dir: PathBuf,
        #[arg(long)]
        strict: bool,
        #[arg(short, long)]
        verbose: bool,
        #[arg(long)]
        json: bool,
    },
    Init {
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        force: bool,
    },
    Config {
        #[arg(long)]
        print: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let code = match cli.command {
        Commands::Verify {
            binary,
            strict,
            verbose,
            json,
        } => commands::verify::execute(commands::verify::VerifyInputs {
            config_path: cli.config,
            binary,
            strict,
            verbose,
            json,
        })?,
        Commands::Sweep {
            dir,
            strict,
            verbose,
            json,
        } => commands::sweep::execute(commands::sweep::SweepInputs {
            config_path: cli.config,
            dir,
            strict,
            verbose,
            json,
        })?,
        Commands::Init { path, force } => {
            commands::config::init(path, force)?;
            0
        }
        Commands::Config { print } => {
            if print {
                commands::config::print_effective(cli.config)?;
            }
            0
        }
    };
    Ok(exit_code(code))
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map(ExitCode::from).unwrap_or(ExitCode::FAILURE)
}
