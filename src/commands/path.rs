use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;

use grassflow::config::{is_json_input, read_json_spec_to_string};
use grassflow::validation::{require_non_empty, split_key_values};
use grassflow::{Artifact, Error, GrassLocation, Resolved, Selection};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct PathArgs {
    #[command(subcommand)]
    command: PathCommand,
}

#[derive(Args)]
pub struct SelectionArgs {
    /// Reference pattern (e.g. `dem_{year}@basin`), or JSON string/array/object
    /// (supports @file and - for stdin)
    pub selection: String,

    /// Pattern variable values, repeatable (e.g. --var year=2000,2010)
    #[arg(long = "var", value_name = "KEY=V1,V2")]
    pub vars: Vec<String>,
}

#[derive(Subcommand)]
enum PathCommand {
    /// Resolve raster references to their `cellhd` paths
    Raster(SelectionArgs),
    /// Resolve vector references to their map directories
    Vector {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Mark the maps as pre-existing inputs instead of step outputs
        #[arg(long)]
        ancient: bool,
    },
    /// Region file standing in for a mapset
    Mapset {
        /// Mapset name (default mapset when omitted)
        name: Option<String>,

        /// Mark the mapset as created by the step
        #[arg(long)]
        output: bool,
    },
    /// Projection file standing in for the location
    Location,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum PathOutput {
    Rasters(RastersOutput),
    Vectors(VectorsOutput),
    Marker(MarkerOutput),
}

#[derive(Serialize)]
pub struct RastersOutput {
    pub location: PathBuf,
    pub rasters: Resolved<PathBuf>,
}

#[derive(Serialize)]
pub struct VectorsOutput {
    pub location: PathBuf,
    pub vectors: Resolved<Artifact>,
}

#[derive(Serialize)]
pub struct MarkerOutput {
    pub location: PathBuf,
    pub marker: Artifact,
}

pub fn run(args: PathArgs, global: &GlobalArgs) -> CmdResult<PathOutput> {
    let location = global.location()?;
    let output = resolve(&location, args.command)?;
    Ok((output, 0))
}

fn resolve(location: &GrassLocation, command: PathCommand) -> grassflow::Result<PathOutput> {
    let location_path = location.location_path();

    Ok(match command {
        PathCommand::Raster(args) => PathOutput::Rasters(RastersOutput {
            rasters: location.rasters(&parse_selection(&args)?)?,
            location: location_path,
        }),
        PathCommand::Vector { selection, ancient } => PathOutput::Vectors(VectorsOutput {
            vectors: location.vectors(&parse_selection(&selection)?, !ancient)?,
            location: location_path,
        }),
        PathCommand::Mapset { name, output } => PathOutput::Marker(MarkerOutput {
            marker: location.mapset_marker(name.as_deref(), output)?,
            location: location_path,
        }),
        PathCommand::Location => PathOutput::Marker(MarkerOutput {
            marker: location.location_marker(),
            location: location_path,
        }),
    })
}

fn parse_selection(args: &SelectionArgs) -> grassflow::Result<Selection> {
    let raw = require_non_empty(&args.selection, "selection", "Selection must not be empty")?;

    let selection = if is_json_input(raw) || raw.starts_with('@') || raw == "-" {
        let content = read_json_spec_to_string(raw)?;
        let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            Error::validation_invalid_json(
                e,
                Some("parse selection".to_string()),
                Some(content.chars().take(200).collect::<String>()),
            )
        })?;
        Selection::from_value(&value)?
    } else {
        Selection::single(raw)
    };

    if args.vars.is_empty() {
        return Ok(selection);
    }

    let vars = args
        .vars
        .iter()
        .map(|raw| split_key_values(raw, "var"))
        .collect::<grassflow::Result<Vec<_>>>()?;

    match selection {
        Selection::Pattern { pattern, .. } => Ok(Selection::pattern(pattern, vars)),
        _ => Err(Error::validation_invalid_argument(
            "var",
            "--var only applies to a pattern selection",
            Some(args.selection.clone()),
            None,
        )),
    }
}
