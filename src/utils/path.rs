//! Path normalization and tree copy utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - resolve relative paths against a base directory
//! - `copy_dir_recursively` - overwrite-copy of a whole tree

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a path against a base directory.
///
/// Absolute paths are used as-is; relative paths are joined onto `base`
/// and normalized. Always returns an absolute path.
#[inline]
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    normalize_path(&base.join(path))
}

/// Copy a directory tree into `dst`, overwriting existing files.
pub fn copy_dir_recursively(src: &Path, dst: &Path) -> Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)
            .with_context(|| format!("creating destination directory {}", dst.display()))?;
    }

    for entry in
        fs::read_dir(src).with_context(|| format!("reading source directory {}", src.display()))?
    {
        let entry = entry.context("invalid directory entry")?;
        let entry_path = entry.path();
        let dest_path = dst.join(entry.file_name());

        if entry_path.is_dir() {
            copy_dir_recursively(&entry_path, &dest_path)?;
        } else {
            fs::copy(&entry_path, &dest_path).with_context(|| {
                format!(
                    "copying {} to {}",
                    entry_path.display(),
                    dest_path.display()
                )
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_resolve_path_absolute() {
        let path = Path::new("/absolute/path");
        let resolved = resolve_path(path, Path::new("/base"));
        assert_eq!(resolved, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_resolve_path_relative_joins_base() {
        let resolved = resolve_path(Path::new("browser/sitemap.xml"), Path::new("/project"));
        assert_eq!(resolved, PathBuf::from("/project/browser/sitemap.xml"));
    }

    #[test]
    fn test_copy_dir_recursively_copies_nested_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("sub/inner")).unwrap();
        fs::write(src.join("a.txt"), "a").unwrap();
        fs::write(src.join("sub/inner/b.txt"), "b").unwrap();

        copy_dir_recursively(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "a");
        assert_eq!(
            fs::read_to_string(dst.join("sub/inner/b.txt")).unwrap(),
            "b"
        );
    }

    #[test]
    fn test_copy_dir_recursively_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("index.html"), "new").unwrap();
        fs::write(dst.join("index.html"), "old").unwrap();

        copy_dir_recursively(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("index.html")).unwrap(), "new");
    }
}
