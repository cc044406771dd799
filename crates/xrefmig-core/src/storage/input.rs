use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{CoreError, Result};

/// One input row: a legacy DOI and the URL its content now lives at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationEntry {
    pub legacy_doi: String,
    pub new_url: String,
}

impl MigrationEntry {
    pub fn new(legacy_doi: impl Into<String>, new_url: impl Into<String>) -> Self {
        Self {
            legacy_doi: legacy_doi.into(),
            new_url: new_url.into(),
        }
    }
}

/// Regular files of `dir` sorted by name. Directories and dot-files are skipped.
pub fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CoreError::DirectoryNotFound(dir.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            continue;
        }
        let hidden = path
            .file_name()
            .map(|name| name.to_string_lossy().starts_with('.'))
            .unwrap_or(true);
        if hidden {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Read `DOI,new URL` rows from a header-less CSV file.
pub fn read_entries(path: &Path) -> Result<Vec<MigrationEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut entries = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        match (row.get(0), row.get(1)) {
            (Some(doi), Some(url)) if !doi.is_empty() && !url.is_empty() => {
                entries.push(MigrationEntry::new(doi, url));
            }
            _ => warn!(
                file = %path.display(),
                line = line + 1,
                "skipping row without a DOI and URL"
            ),
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.csv");
        fs::write(
            &path,
            "10.1111/abc, http://new.example/abc\n10.1111/def,http://new.example/def\n",
        )
        .unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(
            entries,
            vec![
                MigrationEntry::new("10.1111/abc", "http://new.example/abc"),
                MigrationEntry::new("10.1111/def", "http://new.example/def"),
            ]
        );
    }

    #[test]
    fn skips_incomplete_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.csv");
        fs::write(&path, "10.1111/abc\n\n10.1111/def,http://new.example/def\n").unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].legacy_doi, "10.1111/def");
    }

    #[test]
    fn lists_files_sorted_without_dirs_or_dotfiles() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.csv"), "").unwrap();
        fs::write(dir.path().join("a.csv"), "").unwrap();
        fs::write(dir.path().join(".hidden.csv"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let files = list_input_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = list_input_files(Path::new("/tmp/xrefmig-no-such-input-dir"));
        assert!(matches!(result, Err(CoreError::DirectoryNotFound(_))));
    }
}
