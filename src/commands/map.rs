use clap::{Args, ValueEnum};
use serde::Serialize;

use grassflow::{input_to_map, output_to_map, path_to_map, MapNameExpr, PlaceholderIndex};

use super::CmdResult;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Args)]
pub struct MapArgs {
    /// Which placeholder the map name comes from
    #[arg(value_enum)]
    pub direction: Direction,

    /// Position (0, 1, ...) or name of the entry in the placeholder list
    #[arg(long)]
    pub index: Option<String>,

    /// Use a literal path instead of a placeholder
    #[arg(long, conflicts_with = "index")]
    pub path: Option<String>,

    /// Print only the expression
    #[arg(long)]
    pub raw: bool,
}

#[derive(Serialize)]
pub struct MapOutput {
    pub expression: MapNameExpr,
    pub qualified: bool,
}

pub fn run(args: MapArgs) -> CmdResult<MapOutput> {
    Ok((expression(&args), 0))
}

pub fn run_raw(args: MapArgs) -> CmdResult<String> {
    Ok((expression(&args).expression.into_string(), 0))
}

fn expression(args: &MapArgs) -> MapOutput {
    let qualified = matches!(args.direction, Direction::Input);
    let index = args.index.as_deref().map(PlaceholderIndex::parse);

    let expression = match (&args.path, args.direction) {
        (Some(path), _) => path_to_map(path, qualified),
        (None, Direction::Input) => input_to_map(index),
        (None, Direction::Output) => output_to_map(index),
    };

    MapOutput {
        expression,
        qualified,
    }
}
