//! Paths tagged with how the workflow orchestrator should treat them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A plain file tracked by modification time.
    File,
    /// A whole directory produced by a step.
    Directory,
    /// An existing input that is never considered out of date.
    Ancient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, kind: ArtifactKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ArtifactKind::File)
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ArtifactKind::Directory)
    }

    pub fn ancient(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ArtifactKind::Ancient)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for Artifact {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_snake_case() {
        let artifact = Artifact::directory("/db/loc/ms/vector/roads");
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["kind"], "directory");
        assert_eq!(json["path"], "/db/loc/ms/vector/roads");
    }

    #[test]
    fn constructors_share_path() {
        let a = Artifact::ancient("/x");
        let d = Artifact::directory("/x");
        assert_eq!(a.path(), d.path());
        assert_ne!(a.kind, d.kind);
    }
}
