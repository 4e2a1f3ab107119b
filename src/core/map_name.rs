//! Shell expressions that turn workflow placeholders back into map names.
//!
//! The concrete path of an input or output is only known once the workflow
//! tool substitutes `{input}`/`{output}`, so the map name is recovered by the
//! shell at run time:
//!
//! ```text
//! {input.dem}  ->  $(basename {input.dem})@$(basename $(dirname $(dirname {input.dem})))
//! {output}     ->  $(basename {output})
//! ```

use std::fmt;

use serde::Serialize;

/// Selects one entry of a placeholder list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderIndex {
    /// `{input[2]}`
    Position(usize),
    /// `{input.dem}`
    Named(String),
}

impl From<usize> for PlaceholderIndex {
    fn from(position: usize) -> Self {
        Self::Position(position)
    }
}

impl From<&str> for PlaceholderIndex {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl PlaceholderIndex {
    /// Numeric strings become positions, anything else a name.
    pub fn parse(raw: &str) -> Self {
        raw.parse::<usize>()
            .map(Self::Position)
            .unwrap_or_else(|_| Self::Named(raw.to_string()))
    }
}

/// A shell expression evaluating to a map name; never quoted when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MapNameExpr(String);

impl MapNameExpr {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MapNameExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn placeholder(base: &str, index: Option<&PlaceholderIndex>) -> String {
    match index {
        None => format!("{{{}}}", base),
        Some(PlaceholderIndex::Position(i)) => format!("{{{}[{}]}}", base, i),
        Some(PlaceholderIndex::Named(name)) => format!("{{{}.{}}}", base, name),
    }
}

/// Map name from a path placeholder, optionally qualified with its mapset.
pub fn path_to_map(path: &str, with_mapset: bool) -> MapNameExpr {
    let name = format!("$(basename {})", path);
    if with_mapset {
        MapNameExpr(format!(
            "{}@$(basename $(dirname $(dirname {})))",
            name, path
        ))
    } else {
        MapNameExpr(name)
    }
}

/// Inputs keep their mapset so maps from other mapsets resolve.
pub fn input_to_map(index: Option<PlaceholderIndex>) -> MapNameExpr {
    path_to_map(&placeholder("input", index.as_ref()), true)
}

/// Outputs are always written to the current mapset, so no qualifier.
pub fn output_to_map(index: Option<PlaceholderIndex>) -> MapNameExpr {
    path_to_map(&placeholder("output", index.as_ref()), false)
}
