use std::sync::OnceLock;

use clap::Args;
use regex::Regex;
use serde::Serialize;

use grassflow::invocation::DEFAULT_OUTPUTS_PLACEHOLDER;
use grassflow::validation::split_key_value;
use grassflow::{
    input_to_map, output_to_map, Error, Fragment, GrassLocation, KwargValue, PlaceholderIndex,
};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ExecArgs {
    /// GRASS module to run (e.g. r.slope.aspect)
    pub command: String,

    /// Positional arguments passed to the module
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Mapset to run in (default mapset when omitted)
    #[arg(long)]
    pub mapset: Option<String>,

    /// Skip the cleanup step before the command
    #[arg(long)]
    pub no_clean: bool,

    /// Output list handed to the cleanup step
    #[arg(long, value_name = "OUTPUTS", default_value = DEFAULT_OUTPUTS_PLACEHOLDER)]
    pub outputs: String,

    /// Module option, repeatable, rendered in the order given.
    /// `@input`, `@input[N]`, `@input.NAME` and the `@output` forms take the
    /// map name from that placeholder (e.g. --kw elevation=@input)
    #[arg(long = "kw", value_name = "KEY=VALUE")]
    pub kwargs: Vec<String>,

    /// Print only the rendered shell command
    #[arg(long)]
    pub raw: bool,
}

#[derive(Debug, Serialize)]
pub struct ExecOutput {
    pub shell: String,
    pub fragments: Vec<Fragment>,
}

pub fn run(args: ExecArgs, global: &GlobalArgs) -> CmdResult<ExecOutput> {
    let location = global.location()?;
    Ok((build(&location, &args)?, 0))
}

pub fn run_raw(args: ExecArgs, global: &GlobalArgs) -> CmdResult<String> {
    let location = global.location()?;
    Ok((build(&location, &args)?.shell, 0))
}

fn build(location: &GrassLocation, args: &ExecArgs) -> grassflow::Result<ExecOutput> {
    let command = args.command.trim();
    if command.is_empty() {
        return Err(Error::validation_missing_argument(vec!["command".to_string()]));
    }

    let mut invocation = location
        .invocation(command)
        .args(args.args.iter().map(String::as_str))
        .clean(!args.no_clean)
        .cleanup_outputs(args.outputs.as_str());

    if let Some(mapset) = &args.mapset {
        invocation = invocation.mapset(mapset.as_str());
    }

    for raw in &args.kwargs {
        let (key, value) = module_option(raw)?;
        invocation = invocation.kwarg(key, value);
    }

    let fragments = invocation.fragments()?;
    let shell = fragments.iter().map(Fragment::render).collect::<String>();

    Ok(ExecOutput { shell, fragments })
}

fn map_placeholder_regex() -> &'static Regex {
    static MAP_PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    MAP_PLACEHOLDER.get_or_init(|| {
        Regex::new(r"^@(input|output)(?:\[([0-9]+)\]|\.([A-Za-z_][A-Za-z0-9_]*))?$")
            .expect("map placeholder regex is valid")
    })
}

/// Split `KEY=VALUE`, turning `@input`/`@output` values into map names.
fn module_option(raw: &str) -> grassflow::Result<(&str, KwargValue)> {
    let (key, value) = split_key_value(raw, "kw")?;

    let Some(caps) = map_placeholder_regex().captures(value) else {
        return Ok((key, value.into()));
    };

    let index = caps
        .get(2)
        .or_else(|| caps.get(3))
        .map(|m| PlaceholderIndex::parse(m.as_str()));
    let map = if &caps[1] == "input" {
        input_to_map(index)
    } else {
        output_to_map(index)
    };
    Ok((key, map.into()))
}
