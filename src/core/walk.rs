//! Recursive directory listing shared by the unpack, upload and reconcile stages

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Every regular file under `root` whose name ends with `suffix`, sorted
///
/// Symlinks are not followed.
pub(crate) fn files_with_suffix(root: &Path, suffix: &str) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file()
                && entry.file_name().to_string_lossy().ends_with(suffix)
            {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// File name of `path` as UTF-8, lossily converted
pub(crate) fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_finds_nested_files_with_suffix() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("top.json"), "{}").unwrap();
        fs::write(dir.path().join("a/b/deep.json"), "{}").unwrap();
        fs::write(dir.path().join("a/skip.txt"), "").unwrap();
        fs::create_dir_all(dir.path().join("dir.json")).unwrap();

        let files = files_with_suffix(dir.path(), ".json").unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name_lossy(p)).collect();

        assert_eq!(files.len(), 2);
        assert!(names.contains(&"top.json".to_string()));
        assert!(names.contains(&"deep.json".to_string()));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(files_with_suffix(&dir.path().join("absent"), ".json").is_err());
    }
}
