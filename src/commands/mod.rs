use std::path::PathBuf;

use grassflow::{config, GrassLocation};

pub type CmdResult<T> = grassflow::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Location described by the discovered configuration file.
    pub fn location(&self) -> grassflow::Result<GrassLocation> {
        let config = config::load(self.config.as_deref())?;
        Ok(GrassLocation::from_config(&config))
    }
}

pub mod clean;
pub mod exec;
pub mod map;
pub mod path;

pub(crate) fn run_raw(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (grassflow::Result<String>, i32) {
    match command {
        crate::Commands::Exec(args) => {
            crate::output::map_cmd_result_to_raw(exec::run_raw(args, global))
        }
        crate::Commands::Map(args) => crate::output::map_cmd_result_to_raw(map::run_raw(args)),
        _ => {
            let err = grassflow::Error::validation_invalid_argument(
                "raw",
                "Command does not support raw output",
                None,
                None,
            );
            crate::output::map_cmd_result_to_raw(Err(err))
        }
    }
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (grassflow::Result<serde_json::Value>, i32) {
    crate::tty::status("grassflow is working...");

    match command {
        // Commands without configuration
        crate::Commands::Clean(args) => dispatch!(args, clean),
        crate::Commands::Map(args) => dispatch!(args, map),

        // Commands resolving the configured location
        crate::Commands::Path(args) => dispatch!(args, global, path),
        crate::Commands::Exec(args) => dispatch!(args, global, exec),
    }
}
