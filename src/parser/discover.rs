//! Source file discovery

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Name prefix of office lock files
const LOCK_FILE_PREFIX: &str = "~$";

/// Collect files under `root` whose extension is in `extensions`.
///
/// Only `root` itself and its immediate subdirectories are searched. Names
/// starting with `~$` (office lock files) are ignored. Results are absolute
/// and sorted.
pub fn discover_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve source directory: {}", root.display()))?;

    let mut files = Vec::new();
    for path in list_dir(&root)? {
        if path.is_dir() {
            files.extend(list_dir(&path)?.into_iter().filter(|p| p.is_file()));
        } else {
            files.push(path);
        }
    }

    files.retain(|path| is_candidate(path, extensions));
    files.sort();
    Ok(files)
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        paths.push(entry?.path());
    }
    Ok(paths)
}

fn is_candidate(path: &Path, extensions: &[String]) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.is_empty() || name.starts_with(LOCK_FILE_PREFIX) {
        return false;
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_one_level_deep() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.xlsx"));
        touch(&dir.path().join("sub/a.XLSX"));
        touch(&dir.path().join("sub/deeper/c.xlsx"));
        touch(&dir.path().join("notes.txt"));

        let files = discover_files(dir.path(), &["xlsx".to_string()]).unwrap();
        assert_eq!(names(&files), vec!["b.xlsx", "a.XLSX"]);
        assert!(files.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_skips_lock_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Items.xlsx"));
        touch(&dir.path().join("~$Items.xlsx"));
        touch(&dir.path().join("~Config.xlsx"));

        let files = discover_files(dir.path(), &["xlsx".to_string()]).unwrap();
        assert_eq!(names(&files), vec!["Items.xlsx", "~Config.xlsx"]);
    }

    #[test]
    fn test_missing_root() {
        assert!(discover_files(Path::new("/no/such/dir"), &[]).is_err());
    }
}
