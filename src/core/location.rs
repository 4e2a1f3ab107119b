//! GRASS location addressing.
//!
//! A [`GrassLocation`] knows where a location lives on disk and turns map
//! references into the paths the GRASS database uses for them:
//!
//! ```text
//! <database>/<location>/<mapset>/vector/<name>/      vector map (directory)
//! <database>/<location>/<mapset>/cellhd/<name>       raster header
//! <database>/<location>/<mapset>/{cats,cell,...}/<name>  raster ancillaries
//! <database>/<location>/<mapset>/sqlite/sqlite.db    attribute tables
//! ```
//!
//! Nothing here touches the filesystem.

use std::path::{Path, PathBuf};

use crate::artifact::Artifact;
use crate::config::LocationConfig;
use crate::error::{Error, Result};
use crate::reference::MapRef;
use crate::selection::{Resolved, Selection};

pub const PERMANENT_MAPSET: &str = "PERMANENT";
pub const VECTOR_ELEMENT: &str = "vector";
pub const RASTER_ELEMENT: &str = "cellhd";
pub const SQLITE_ELEMENT: &str = "sqlite";
pub const SQLITE_DB: &str = "sqlite.db";

/// Elements that hold one entry per raster next to its `cellhd` header.
pub const RASTER_ANCILLARY_ELEMENTS: [&str; 6] =
    ["cats", "cell", "cell_misc", "colr", "fcell", "hist"];

pub const DEFAULT_GRASS_EXECUTABLE: &str = "grass";
pub const DEFAULT_CLEANUP_EXECUTABLE: &str = "grassflow";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrassLocation {
    pub database: PathBuf,
    pub location_name: String,
    pub default_mapset: Option<String>,
    pub epsg: Option<u32>,
    /// Georeferenced file to base a new location on; wins over `epsg`.
    pub location_file: Option<PathBuf>,
    pub grass_executable: String,
    pub cleanup_executable: String,
}

impl GrassLocation {
    pub fn new(database: impl Into<PathBuf>, location_name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            location_name: location_name.into(),
            default_mapset: Some(PERMANENT_MAPSET.to_string()),
            epsg: None,
            location_file: None,
            grass_executable: DEFAULT_GRASS_EXECUTABLE.to_string(),
            cleanup_executable: DEFAULT_CLEANUP_EXECUTABLE.to_string(),
        }
    }

    /// Location rooted at an existing location directory, with no default mapset.
    pub fn from_location_path(location_path: &Path) -> Result<Self> {
        let name = location_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::validation_invalid_argument(
                    "location",
                    "Location path has no final directory name",
                    Some(location_path.display().to_string()),
                    None,
                )
            })?;
        let database = location_path.parent().unwrap_or_else(|| Path::new(""));

        Ok(Self::new(database, name).with_default_mapset(None::<String>))
    }

    pub fn from_config(config: &LocationConfig) -> Self {
        let mut location = Self::new(&config.database, &config.location)
            .with_default_mapset(config.default_mapset.clone());
        location.epsg = config.epsg;
        location.location_file = config.location_file.clone();
        location.grass_executable = config.grass_executable.clone();
        location.cleanup_executable = config.cleanup_executable.clone();
        location
    }

    pub fn with_default_mapset(mut self, mapset: Option<impl Into<String>>) -> Self {
        self.default_mapset = mapset.map(Into::into);
        self
    }

    pub fn with_epsg(mut self, epsg: u32) -> Self {
        self.epsg = Some(epsg);
        self
    }

    pub fn with_location_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.location_file = Some(path.into());
        self
    }

    pub fn location_path(&self) -> PathBuf {
        self.database.join(&self.location_name)
    }

    /// Projection file that exists once the location has been created.
    pub fn location_marker(&self) -> Artifact {
        Artifact::file(
            self.location_path()
                .join(PERMANENT_MAPSET)
                .join("PROJ_INFO"),
        )
    }

    pub fn mapset_path(&self, name: Option<&str>) -> Result<PathBuf> {
        let mapset = name
            .or(self.default_mapset.as_deref())
            .ok_or_else(|| Error::no_default_mapset(None))?;
        Ok(self.location_path().join(mapset))
    }

    /// Region file of a mapset, standing in for the mapset itself.
    pub fn mapset_marker(&self, name: Option<&str>, as_output: bool) -> Result<Artifact> {
        let wind = self.mapset_path(name)?.join("WIND");
        Ok(if as_output {
            Artifact::file(wind)
        } else {
            Artifact::ancient(wind)
        })
    }

    /// Split a reference into name and mapset, applying the default mapset.
    pub fn map_mapset(&self, reference: &str) -> Result<(String, String)> {
        let map = MapRef::parse(reference)?;
        let mapset = map.mapset_or(self.default_mapset.as_deref())?.to_string();
        Ok((map.name, mapset))
    }

    /// Fully qualified form of `reference`.
    pub fn resolve_reference(&self, reference: &str) -> Result<MapRef> {
        let (name, mapset) = self.map_mapset(reference)?;
        Ok(MapRef::qualified(name, mapset))
    }

    /// Path of `map` inside `element` of its mapset.
    pub fn element_path(&self, element: &str, map: &MapRef) -> Result<PathBuf> {
        let mapset = map.mapset_or(self.default_mapset.as_deref())?;
        Ok(self
            .location_path()
            .join(mapset)
            .join(element)
            .join(&map.name))
    }

    pub fn vector_path(&self, reference: &str) -> Result<PathBuf> {
        self.element_path(VECTOR_ELEMENT, &MapRef::parse(reference)?)
    }

    /// Vector map as a workflow artifact: a directory when produced by the
    /// step, an ancient input otherwise.
    pub fn vector(&self, reference: &str, as_output: bool) -> Result<Artifact> {
        let path = self.vector_path(reference)?;
        Ok(if as_output {
            Artifact::directory(path)
        } else {
            Artifact::ancient(path)
        })
    }

    pub fn raster(&self, reference: &str) -> Result<PathBuf> {
        self.element_path(RASTER_ELEMENT, &MapRef::parse(reference)?)
    }

    pub fn vectors(&self, selection: &Selection, as_output: bool) -> Result<Resolved<Artifact>> {
        selection
            .references()?
            .try_map(|reference| self.vector(&reference, as_output))
    }

    pub fn rasters(&self, selection: &Selection) -> Result<Resolved<PathBuf>> {
        selection
            .references()?
            .try_map(|reference| self.raster(&reference))
    }

    /// Ancillary entries belonging to the raster whose header is `raster_path`.
    pub fn ancillary_paths(raster_path: &Path) -> Vec<PathBuf> {
        let (Some(name), Some(mapset_path)) = (
            raster_path.file_name(),
            raster_path.parent().and_then(Path::parent),
        ) else {
            return Vec::new();
        };

        RASTER_ANCILLARY_ELEMENTS
            .iter()
            .map(|element| mapset_path.join(element).join(name))
            .collect()
    }

    /// Attribute database of the mapset holding the map at `map_path`.
    pub fn sqlite_db_path(map_path: &Path) -> Option<PathBuf> {
        map_path
            .parent()
            .and_then(Path::parent)
            .map(|mapset| mapset.join(SQLITE_ELEMENT).join(SQLITE_DB))
    }
}
