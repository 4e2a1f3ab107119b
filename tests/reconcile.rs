use std::fs;
use std::path::{Path, PathBuf};

use grassflow::cleanup::{reconcile, OutputPaths};
use grassflow::ErrorCode;
use rusqlite::Connection;
use tempfile::{tempdir, TempDir};

const ANCILLARIES: [&str; 6] = ["cats", "cell", "cell_misc", "colr", "fcell", "hist"];

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let root = dir.path().join("grassdata");
        fs::create_dir(&root).unwrap();
        let fixture = Self { _dir: dir, root };
        fixture.touch("utm/PERMANENT/PROJ_INFO");
        fixture.touch("utm/PERMANENT/WIND");
        fixture
    }

    fn location(&self) -> PathBuf {
        self.root.join("utm")
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn touch(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "x").unwrap();
        path
    }

    fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    fn raster_leftovers(&self, mapset: &str, name: &str) {
        for element in ANCILLARIES {
            if element == "cell_misc" {
                self.touch(&format!("utm/{}/cell_misc/{}/null", mapset, name));
            } else {
                self.touch(&format!("utm/{}/{}/{}", mapset, element, name));
            }
        }
    }

    fn sqlite(&self, mapset: &str, tables: &[&str]) -> PathBuf {
        let db = self.path(&format!("utm/{}/sqlite/sqlite.db", mapset));
        fs::create_dir_all(db.parent().unwrap()).unwrap();
        let conn = Connection::open(&db).unwrap();
        for table in tables {
            let sql = format!(
                "CREATE TABLE \"{}\" (cat INTEGER PRIMARY KEY)",
                table.replace('"', "\"\"")
            );
            conn.execute_batch(&sql).unwrap();
        }
        db
    }
}

fn tables(db: &Path) -> Vec<String> {
    let conn = Connection::open(db).unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .map(Result::unwrap)
        .collect()
}

fn outputs(paths: &[&Path]) -> OutputPaths {
    paths.iter().map(|p| p.to_path_buf()).collect()
}

#[test]
fn raster_output_removes_ancillaries_in_same_mapset_only() {
    let fx = Fixture::new();
    fx.raster_leftovers("basin", "dem");
    fx.raster_leftovers("other", "dem");
    fx.touch("utm/basin/cellhd/slope");
    let header = fx.path("utm/basin/cellhd/dem");

    let report = reconcile(&fx.location(), &outputs(&[&header])).unwrap();

    for element in ANCILLARIES {
        assert!(!fx.path(&format!("utm/basin/{}/dem", element)).exists());
        assert!(fx.path(&format!("utm/other/{}/dem", element)).exists());
    }
    assert_eq!(report.removed_raster_fragments.len(), ANCILLARIES.len());
    assert!(fx.path("utm/basin/cellhd/slope").exists());
    assert!(report.removed_dirs.is_empty());
}

#[test]
fn vector_output_removes_directory_and_table() {
    let fx = Fixture::new();
    let vector = fx.mkdir("utm/basin/vector/roads");
    fs::write(vector.join("coor"), "x").unwrap();
    let db = fx.sqlite("basin", &["rivers", "roads"]);

    let report = reconcile(&fx.location(), &outputs(&[&vector])).unwrap();

    assert!(!vector.exists());
    assert_eq!(tables(&db), vec!["rivers".to_string()]);
    assert_eq!(report.removed_vectors, vec![vector]);
    assert_eq!(report.dropped_tables.len(), 1);
    assert_eq!(report.dropped_tables[0].table, "roads");
}

#[test]
fn vector_table_name_is_quoted() {
    let fx = Fixture::new();
    let vector = fx.mkdir("utm/basin/vector/odd\"name");
    let db = fx.sqlite("basin", &["odd\"name", "odd"]);

    reconcile(&fx.location(), &outputs(&[&vector])).unwrap();

    assert_eq!(tables(&db), vec!["odd".to_string()]);
}

#[test]
fn vector_table_differing_in_case_is_dropped() {
    let fx = Fixture::new();
    let vector = fx.mkdir("utm/basin/vector/roads");
    let db = fx.sqlite("basin", &["Roads", "rivers"]);

    let report = reconcile(&fx.location(), &outputs(&[&vector])).unwrap();

    assert_eq!(tables(&db), vec!["rivers".to_string()]);
    assert_eq!(report.dropped_tables.len(), 1);
}

#[test]
fn vector_without_database_is_not_an_error() {
    let fx = Fixture::new();
    let vector = fx.mkdir("utm/basin/vector/roads");
    fx.touch("utm/basin/WIND");

    let report = reconcile(&fx.location(), &outputs(&[&vector])).unwrap();

    assert!(!vector.exists());
    assert!(report.dropped_tables.is_empty());
}

#[test]
fn missing_vector_still_drops_table() {
    let fx = Fixture::new();
    fx.mkdir("utm/basin/vector/rivers");
    let db = fx.sqlite("basin", &["roads"]);
    let vector = fx.path("utm/basin/vector/roads");

    let report = reconcile(&fx.location(), &outputs(&[&vector])).unwrap();

    assert!(report.removed_vectors.is_empty());
    assert!(tables(&db).is_empty());
}

#[test]
fn empty_scaffolding_is_removed_innermost_first() {
    let fx = Fixture::new();
    let location = fx.mkdir("fresh/newms/cellhd");
    let location = location.parent().unwrap().parent().unwrap().to_path_buf();
    let output = fx.path("fresh/newms/cellhd/dem");

    let report = reconcile(&location, &outputs(&[&output])).unwrap();

    assert_eq!(
        report.removed_dirs,
        vec![
            fx.path("fresh/newms/cellhd"),
            fx.path("fresh/newms"),
            fx.path("fresh"),
        ]
    );
    assert!(!location.exists());
    assert!(fx.root.exists());
}

#[test]
fn non_empty_parents_are_kept() {
    let fx = Fixture::new();
    fx.touch("utm/basin/cellhd/slope");
    let output = fx.path("utm/basin/cellhd/dem");

    let report = reconcile(&fx.location(), &outputs(&[&output])).unwrap();

    assert!(report.removed_dirs.is_empty());
    assert!(fx.path("utm/basin/cellhd").is_dir());
}

#[test]
fn element_directory_alone_can_be_removed() {
    let fx = Fixture::new();
    fx.touch("utm/basin/WIND");
    fx.mkdir("utm/basin/vector");
    let output = fx.path("utm/basin/vector/roads");

    let report = reconcile(&fx.location(), &outputs(&[&output])).unwrap();

    assert_eq!(report.removed_dirs, vec![fx.path("utm/basin/vector")]);
    assert!(fx.path("utm/basin").is_dir());
}

#[test]
fn outputs_outside_location_are_untouched() {
    let fx = Fixture::new();
    fx.mkdir("utm2/basin/cellhd");
    fx.raster_leftovers("basin", "dem");
    let sibling = fx.path("utm2/basin/cellhd/dem");
    let elsewhere = fx._dir.path().join("results/dem.tif");

    let report = reconcile(&fx.location(), &outputs(&[&sibling, &elsewhere])).unwrap();

    assert_eq!(report.skipped, vec![sibling, elsewhere]);
    assert!(fx.path("utm2/basin/cellhd").is_dir());
    assert!(fx.path("utm/basin/cell/dem").exists());
    assert!(!report.changed_anything());
}

#[test]
fn relative_dot_segments_resolve_inside_location() {
    let fx = Fixture::new();
    fx.raster_leftovers("basin", "dem");
    fx.touch("utm/basin/cellhd/slope");
    let output = fx.path("utm/basin/./cellhd/../cellhd/dem");

    let report = reconcile(&fx.location(), &outputs(&[&output])).unwrap();

    assert!(report.skipped.is_empty());
    assert_eq!(report.removed_raster_fragments.len(), ANCILLARIES.len());
}

#[test]
fn whitespace_joined_outputs_are_all_processed() {
    let fx = Fixture::new();
    fx.raster_leftovers("basin", "dem");
    fx.touch("utm/basin/cellhd/slope");
    let vector = fx.mkdir("utm/basin/vector/roads");
    let joined = format!(
        "{} {}",
        fx.path("utm/basin/cellhd/dem").display(),
        vector.display()
    );

    let report = reconcile(&fx.location(), &OutputPaths::from_joined(&joined)).unwrap();

    assert_eq!(report.removed_raster_fragments.len(), ANCILLARIES.len());
    assert_eq!(report.removed_vectors.len(), 1);
}

#[test]
fn corrupt_database_fails_with_cleanup_error() {
    let fx = Fixture::new();
    let vector = fx.mkdir("utm/basin/vector/roads");
    fx.touch("utm/basin/sqlite/sqlite.db");
    fs::write(fx.path("utm/basin/sqlite/sqlite.db"), "definitely not sqlite").unwrap();

    let err = reconcile(&fx.location(), &outputs(&[&vector])).unwrap_err();

    assert_eq!(err.code, ErrorCode::CleanupFailed);
    assert_eq!(err.code.as_str(), "cleanup.failed");
    assert!(err.details["path"]
        .as_str()
        .unwrap()
        .ends_with("sqlite.db"));
}
