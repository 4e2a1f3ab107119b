//! Path resolution that tolerates paths which do not exist (yet).

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Error kinds that mean "there is nothing at this path".
pub fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Make `path` absolute and drop `.`/`..` components without touching the disk.
pub fn normalize(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Canonical form of `path`: symlinks of the deepest existing ancestor are
/// resolved and the missing tail is appended unchanged.
pub fn resolve_real(path: &Path) -> io::Result<PathBuf> {
    let normalized = normalize(path)?;
    let mut tail: Vec<OsString> = Vec::new();
    let mut current = normalized.as_path();

    loop {
        match fs::canonicalize(current) {
            Ok(mut resolved) => {
                for name in tail.iter().rev() {
                    resolved.push(name);
                }
                return Ok(resolved);
            }
            Err(e) if is_missing(&e) => {
                let (Some(parent), Some(name)) = (current.parent(), current.file_name()) else {
                    return Err(e);
                };
                tail.push(name.to_os_string());
                current = parent;
            }
            Err(e) => return Err(e),
        }
    }
}

/// True when `path` resolves to `root` or somewhere below it.
pub fn is_within(path: &Path, root: &Path) -> io::Result<bool> {
    Ok(resolve_real(path)?.starts_with(resolve_real(root)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn normalize_drops_dot_components() {
        assert_eq!(
            normalize(Path::new("/a/./b/../c")).unwrap(),
            PathBuf::from("/a/c")
        );
    }

    #[test]
    fn resolve_real_keeps_missing_tail() {
        let dir = tempdir().unwrap();
        let real_root = fs::canonicalize(dir.path()).unwrap();
        let missing = dir.path().join("loc/ms/cellhd/dem");

        assert_eq!(
            resolve_real(&missing).unwrap(),
            real_root.join("loc/ms/cellhd/dem")
        );
    }

    #[cfg(unix)]
    #[test]
    fn resolve_real_follows_symlinked_ancestor() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        fs::create_dir(&target).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert_eq!(
            resolve_real(&link.join("x")).unwrap(),
            fs::canonicalize(&target).unwrap().join("x")
        );
    }

    #[test]
    fn is_within_compares_whole_components() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("loc");
        fs::create_dir(&root).unwrap();

        assert!(is_within(&root.join("ms/cellhd/dem"), &root).unwrap());
        assert!(is_within(&root, &root).unwrap());
        assert!(!is_within(&dir.path().join("loc2/ms/cellhd/dem"), &root).unwrap());
    }
}
