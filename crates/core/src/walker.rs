//! Directory walker producing the files to sync

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// A regular file found under the sync root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Object key: path relative to the root, `/`-separated
    pub key: String,
}

/// Iterator over every regular file below a root directory.
///
/// Directories are descended into but never yielded. Symlinks are
/// followed and keep the key of the link, not of its target; a link loop
/// is reported as an error. Entries are visited in file-name order.
pub struct SiteWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl SiteWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let inner = WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();
        Self { root, inner }
    }
}

impl Iterator for SiteWalker {
    type Item = Result<LocalFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(Error::Walk(e))),
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            return Some(object_key(&self.root, &path).map(|key| LocalFile { path, key }));
        }
    }
}

/// Object key for `path` relative to `root`, joined with forward slashes
pub fn object_key(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        Error::InvalidInput(format!(
            "{} is not inside {}",
            path.display(),
            root.display()
        ))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        let part = component.as_os_str().to_str().ok_or_else(|| {
            Error::InvalidInput(format!("Path is not valid UTF-8: {}", path.display()))
        })?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_walk_yields_files_with_posix_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css").join("style.css"), "body {}").unwrap();

        let keys: Vec<String> = SiteWalker::new(dir.path())
            .map(|f| f.unwrap().key)
            .collect();

        assert_eq!(keys, vec!["css/style.css".to_string(), "index.html".to_string()]);
    }

    #[test]
    fn test_empty_directories_yield_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a").join("b").join("c")).unwrap();

        assert_eq!(SiteWalker::new(dir.path()).count(), 0);
    }

    #[test]
    fn test_deep_nesting() {
        let dir = tempfile::tempdir().unwrap();
        let mut nested = dir.path().to_path_buf();
        for i in 0..50 {
            nested = nested.join(format!("d{}", i));
        }
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("leaf.txt"), "x").unwrap();

        let files: Vec<LocalFile> = SiteWalker::new(dir.path()).map(|f| f.unwrap()).collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].key.ends_with("d49/leaf.txt"));
        assert_eq!(files[0].key.split('/').count(), 51);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let mut walker = SiteWalker::new("/nonexistent/site/root");
        assert!(matches!(walker.next(), Some(Err(Error::Walk(_)))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_yielded_under_link_name() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("theme.css"), "body {}").unwrap();

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        std::os::unix::fs::symlink(outside.path().join("theme.css"), dir.path().join("shared.css"))
            .unwrap();

        let files: Vec<LocalFile> = SiteWalker::new(dir.path()).map(|f| f.unwrap()).collect();
        let keys: Vec<&str> = files.iter().map(|f| f.key.as_str()).collect();

        assert_eq!(keys, vec!["index.html", "shared.css"]);
        assert_eq!(fs::read_to_string(&files[1].path).unwrap(), "body {}");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("a").join("back")).unwrap();

        assert!(SiteWalker::new(dir.path()).any(|f| matches!(f, Err(Error::Walk(_)))));
    }

    #[test]
    fn test_object_key_outside_root() {
        assert!(object_key(Path::new("/site"), Path::new("/other/file.txt")).is_err());
        assert_eq!(
            object_key(Path::new("/site"), Path::new("/site/a/b.txt")).unwrap(),
            "a/b.txt"
        );
    }
}
