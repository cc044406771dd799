use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::BatchKey;
use crate::error::Result;

pub const TRANSFER_LIST_FILE: &str = "transfer_list.tsv";
pub const FAILED_DOI_FILE: &str = "failed_doi.txt";

/// Destination directory for deposit documents and ledger files.
/// Every write replaces the previous file content.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn batch_path(&self, key: &BatchKey) -> PathBuf {
        self.root.join(batch_file_name(key))
    }

    pub fn write_batch(&self, key: &BatchKey, xml: &str) -> Result<PathBuf> {
        let path = self.batch_path(key);
        fs::write(&path, xml)?;
        Ok(path)
    }

    pub fn write_transfer_list(&self, lines: &[String]) -> Result<PathBuf> {
        self.write_lines(TRANSFER_LIST_FILE, lines)
    }

    pub fn write_failures(&self, dois: &[String]) -> Result<PathBuf> {
        self.write_lines(FAILED_DOI_FILE, dois)
    }

    fn write_lines(&self, name: &str, lines: &[String]) -> Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, lines.join("\n"))?;
        Ok(path)
    }
}

/// `<volume>-<issue>-articles.xml`, with path-hostile characters replaced.
pub fn batch_file_name(key: &BatchKey) -> String {
    format!(
        "{}-{}-articles.xml",
        sanitize(&key.volume),
        sanitize(&key.issue)
    )
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
