use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::GlobalArgs;

#[derive(Debug, Clone, Copy)]
enum ResponseMode {
    Json,
    Raw,
}

mod commands;
mod output;
mod tty;

use commands::{clean, exec, map, path};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const LOG_ENV_VAR: &str = "GRASSFLOW_LOG";

#[derive(Parser)]
#[command(name = "grassflow")]
#[command(version = VERSION)]
#[command(about = "GRASS GIS location addressing and cleanup for workflow steps")]
struct Cli {
    /// Configuration file (default: $GRASSFLOW_CONFIG, then ./grassflow.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove leftovers of deleted outputs and empty scaffolding directories
    Clean(clean::CleanArgs),
    /// Resolve map references to workflow paths
    Path(path::PathArgs),
    /// Render the shell command running a GRASS module in a workflow step
    Exec(exec::ExecArgs),
    /// Render the shell expression recovering a map name from a placeholder
    Map(map::MapArgs),
}

fn response_mode(command: &Commands) -> ResponseMode {
    match command {
        Commands::Exec(args) if args.raw => ResponseMode::Raw,
        Commands::Map(args) if args.raw => ResponseMode::Raw,
        _ => ResponseMode::Json,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> std::process::ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let global = GlobalArgs { config: cli.config };
    let mode = response_mode(&cli.command);

    let (printed, exit_code) = match mode {
        ResponseMode::Raw => {
            let (raw_result, exit_code) = commands::run_raw(cli.command, &global);
            (output::print_raw_result(raw_result), exit_code)
        }
        ResponseMode::Json => {
            let (json_result, exit_code) = commands::run_json(cli.command, &global);
            (output::print_json_result(json_result), exit_code)
        }
    };

    if let Err(err) = printed {
        tracing::error!(code = err.code.as_str(), "{}", err.message);
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
