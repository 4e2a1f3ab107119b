//! Reconcile a GRASS location after the workflow tool touched its outputs.
//!
//! The workflow tool treats outputs as plain files or directories. Before a
//! step runs it deletes outputs (leaving raster ancillaries and vector
//! attribute tables behind) and it pre-creates parent directories, which
//! GRASS then mistakes for existing mapsets or locations. [`reconcile`]
//! undoes both:
//!
//! - empty element, mapset and location directories above each output are
//!   removed
//! - raster outputs lose their `cats`, `cell`, `cell_misc`, `colr`, `fcell`
//!   and `hist` entries
//! - vector outputs lose their directory and their table in the mapset's
//!   `sqlite/sqlite.db`
//!
//! Only "not found" conditions are tolerated. Every other filesystem or
//! database error aborts with `cleanup.failed`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use serde::Serialize;

use crate::base_path::{is_missing, is_within, normalize};
use crate::error::{Error, Result};
use crate::io::is_empty_dir;
use crate::location::{GrassLocation, RASTER_ELEMENT, VECTOR_ELEMENT};
use crate::reference::MapRef;

/// Levels above an output that may be scaffolding: element, mapset, location.
const SCAFFOLD_DEPTH: usize = 3;

/// Output paths of one workflow step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPaths(Vec<PathBuf>);

impl OutputPaths {
    /// Split a whitespace-separated list, as the workflow tool renders `{output}`.
    pub fn from_joined(joined: &str) -> Self {
        joined.split_whitespace().collect()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for OutputPaths {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for OutputPaths {
    fn from(joined: &str) -> Self {
        Self::from_joined(joined)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedTable {
    pub database: PathBuf,
    pub table: String,
}

/// What [`reconcile`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub location_path: PathBuf,
    /// Outputs outside the location, left untouched.
    pub skipped: Vec<PathBuf>,
    pub removed_dirs: Vec<PathBuf>,
    pub removed_raster_fragments: Vec<PathBuf>,
    pub removed_vectors: Vec<PathBuf>,
    pub dropped_tables: Vec<DroppedTable>,
}

impl CleanupReport {
    pub fn changed_anything(&self) -> bool {
        !(self.removed_dirs.is_empty()
            && self.removed_raster_fragments.is_empty()
            && self.removed_vectors.is_empty()
            && self.dropped_tables.is_empty())
    }
}

/// Reconcile `location_root` with the outputs a workflow step is about to
/// produce. Outputs outside the location are reported as skipped.
pub fn reconcile(location_root: &Path, outputs: &OutputPaths) -> Result<CleanupReport> {
    let location_root =
        normalize(location_root).map_err(|e| failed(location_root, "resolve", &e))?;
    let grass = GrassLocation::from_location_path(&location_root)?;
    let mut report = CleanupReport {
        location_path: location_root.clone(),
        ..CleanupReport::default()
    };

    for output in outputs.paths() {
        let in_location =
            is_within(output, &location_root).map_err(|e| failed(output, "resolve", &e))?;
        if !in_location {
            tracing::debug!(path = %output.display(), "output outside location, skipping");
            report.skipped.push(output.clone());
            continue;
        }

        let path = normalize(output).map_err(|e| failed(output, "resolve", &e))?;
        remove_empty_scaffold(&path, &mut report)?;

        let Some(map) = MapRef::from_map_path(&path) else {
            continue;
        };

        if grass.element_path(RASTER_ELEMENT, &map)? == path {
            clean_raster(&path, &mut report)?;
        } else if grass.element_path(VECTOR_ELEMENT, &map)? == path {
            clean_vector(&path, &map.name, &mut report)?;
        }
    }

    tracing::info!(
        location = %report.location_path.display(),
        outputs = outputs.len(),
        skipped = report.skipped.len(),
        removed_dirs = report.removed_dirs.len(),
        removed_raster_fragments = report.removed_raster_fragments.len(),
        removed_vectors = report.removed_vectors.len(),
        dropped_tables = report.dropped_tables.len(),
        "reconciled outputs"
    );

    Ok(report)
}

fn failed(path: &Path, operation: &str, err: &dyn std::fmt::Display) -> Error {
    Error::cleanup_failed(path.display().to_string(), operation, err.to_string())
}

/// Remove the element, mapset and location directories above `path`,
/// innermost first, as long as they exist and are empty.
fn remove_empty_scaffold(path: &Path, report: &mut CleanupReport) -> Result<()> {
    for dir in path.ancestors().skip(1).take(SCAFFOLD_DEPTH) {
        if dir.as_os_str().is_empty() {
            break;
        }

        match is_empty_dir(dir) {
            Ok(true) => match fs::remove_dir(dir) {
                Ok(()) => {
                    tracing::debug!(dir = %dir.display(), "removed empty directory");
                    report.removed_dirs.push(dir.to_path_buf());
                }
                Err(e) if is_missing(&e) => {}
                Err(e) => return Err(failed(dir, "remove directory", &e)),
            },
            Ok(false) => {}
            Err(e) if is_missing(&e) => {}
            Err(e) => return Err(failed(dir, "list directory", &e)),
        }
    }
    Ok(())
}

/// Remove a file or a whole directory tree. `Ok(false)` when nothing was there.
fn remove_entry(path: &Path) -> io::Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if is_missing(&e) => return Ok(false),
        Err(e) => return Err(e),
    };

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match removed {
        Ok(()) => Ok(true),
        Err(e) if is_missing(&e) => Ok(false),
        Err(e) => Err(e),
    }
}

fn clean_raster(path: &Path, report: &mut CleanupReport) -> Result<()> {
    for fragment in GrassLocation::ancillary_paths(path) {
        if remove_entry(&fragment).map_err(|e| failed(&fragment, "remove", &e))? {
            tracing::debug!(fragment = %fragment.display(), "removed raster fragment");
            report.removed_raster_fragments.push(fragment);
        }
    }
    Ok(())
}

fn clean_vector(path: &Path, name: &str, report: &mut CleanupReport) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!(vector = %path.display(), "removed vector directory");
            report.removed_vectors.push(path.to_path_buf());
        }
        Err(e) if is_missing(&e) => {}
        Err(e) => return Err(failed(path, "remove vector", &e)),
    }

    let Some(database) = GrassLocation::sqlite_db_path(path) else {
        return Ok(());
    };
    if !database.is_file() {
        return Ok(());
    }

    if drop_table(&database, name)? {
        tracing::debug!(table = name, database = %database.display(), "dropped attribute table");
        report.dropped_tables.push(DroppedTable {
            database,
            table: name.to_string(),
        });
    }
    Ok(())
}

/// Quote an SQLite identifier so it matches exactly one table name.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Drop `table` from the database at `database`. Returns whether it existed.
/// Table names match case-insensitively, as SQLite resolves identifiers.
pub fn drop_table(database: &Path, table: &str) -> Result<bool> {
    let db_err = |operation: &str, e: rusqlite::Error| failed(database, operation, &e);

    let conn = Connection::open_with_flags(database, OpenFlags::SQLITE_OPEN_READ_WRITE)
        .map_err(|e| db_err("open database", e))?;

    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE)",
            [table],
            |row| row.get(0),
        )
        .map_err(|e| db_err("look up table", e))?;

    if !exists {
        return Ok(false);
    }

    conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", quote_identifier(table)))
        .map_err(|e| db_err("drop table", e))?;
    Ok(true)
}
