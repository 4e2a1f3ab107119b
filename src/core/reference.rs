//! Map references: `name` or `name@mapset`.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MapRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapset: Option<String>,
}

impl MapRef {
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mapset: None,
        }
    }

    pub fn qualified(name: impl Into<String>, mapset: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mapset: Some(mapset.into()),
        }
    }

    /// Parse `name` or `name@mapset`.
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = |problem: &str| {
            Error::validation_invalid_argument(
                "reference",
                problem,
                Some(reference.to_string()),
                None,
            )
        };

        match reference.split_once('@') {
            None if reference.is_empty() => Err(invalid("Map name is empty")),
            None => Ok(Self::unqualified(reference)),
            Some((_, mapset)) if mapset.contains('@') => {
                Err(invalid("Expected name or name@mapset, found more than one '@'"))
            }
            Some(("", _)) => Err(invalid("Map name is empty")),
            Some((_, "")) => Err(invalid("Mapset after '@' is empty")),
            Some((name, mapset)) => Ok(Self::qualified(name, mapset)),
        }
    }

    /// Recover the reference from a resource path (`.../<mapset>/<element>/<name>`).
    pub fn from_map_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let mapset = path.parent()?.parent()?.file_name()?.to_str()?;
        Some(Self::qualified(name, mapset))
    }

    /// Mapset this reference points into, falling back to `default`.
    pub fn mapset_or<'a>(&'a self, default: Option<&'a str>) -> Result<&'a str> {
        self.mapset
            .as_deref()
            .or(default)
            .ok_or_else(|| Error::no_default_mapset(Some(&self.name)))
    }
}

impl fmt::Display for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mapset {
            Some(mapset) => write!(f, "{}@{}", self.name, mapset),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parse_unqualified() {
        let r = MapRef::parse("dem").unwrap();
        assert_eq!(r.name, "dem");
        assert_eq!(r.mapset, None);
    }

    #[test]
    fn parse_qualified() {
        let r = MapRef::parse("dem@basin").unwrap();
        assert_eq!(r, MapRef::qualified("dem", "basin"));
        assert_eq!(r.to_string(), "dem@basin");
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "@basin", "dem@", "a@b@c"] {
            let err = MapRef::parse(bad).unwrap_err();
            assert_eq!(err.code.as_str(), "validation.invalid_argument", "{}", bad);
        }
    }

    #[test]
    fn from_map_path_reads_name_and_mapset() {
        let path = PathBuf::from("/grassdata/utm/basin/cellhd/dem");
        assert_eq!(
            MapRef::from_map_path(&path),
            Some(MapRef::qualified("dem", "basin"))
        );
    }

    #[test]
    fn from_map_path_needs_two_parents() {
        assert_eq!(MapRef::from_map_path(Path::new("dem")), None);
    }

    #[test]
    fn mapset_or_prefers_qualifier() {
        let r = MapRef::qualified("dem", "basin");
        assert_eq!(r.mapset_or(Some("PERMANENT")).unwrap(), "basin");
    }

    #[test]
    fn mapset_or_without_default_is_configuration_error() {
        let err = MapRef::unqualified("dem").mapset_or(None).unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_key");
    }
}
