use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use xrefmig_core::{
    BatchGrouper, MigrationEntry, MigratorConfig, OutputDir, TransferLedger, list_input_files,
    read_entries,
};

use crate::error::{Result, ScienceError};
use crate::formats::deposit::{DepositHead, render_batch};
use crate::identifiers::doi::Doi;
use crate::resolver::RegistryResolver;
use crate::sources::Lookup;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub files_processed: usize,
    pub records_read: usize,
    pub records_migrated: usize,
    pub records_failed: usize,
    pub batches_written: usize,
    pub output_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    InvalidDoi,
    NotFound,
    Incomplete(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Migrated { new_doi: String },
    Failed(FailureReason),
}

/// One migration run. Owns the batch grouping and the ledger for the whole
/// run; both accumulate across input files.
pub struct MigrationRun {
    config: MigratorConfig,
    resolver: RegistryResolver,
    batches: BatchGrouper,
    ledger: TransferLedger,
    output: OutputDir,
    summary: RunSummary,
}

impl MigrationRun {
    pub fn new(config: MigratorConfig, resolver: RegistryResolver) -> Result<Self> {
        config.validate()?;
        let output = OutputDir::create(config.output_dir())?;
        let summary = RunSummary {
            output_dir: output.root().display().to_string(),
            ..Default::default()
        };
        Ok(Self {
            config,
            resolver,
            batches: BatchGrouper::new(),
            ledger: TransferLedger::new(),
            output,
            summary,
        })
    }

    /// Process every file of the configured input directory.
    pub async fn run(mut self) -> Result<RunSummary> {
        let files = list_input_files(&self.config.input_dir())?;
        if files.is_empty() {
            warn!(dir = %self.config.input_dir().display(), "no input files found");
        }
        for path in files {
            self.process_file(&path).await?;
        }
        Ok(self.summary)
    }

    pub async fn process_file(&mut self, path: &Path) -> Result<()> {
        info!(file = %path.display(), "processing input file");
        let entries = read_entries(path)?;
        for entry in &entries {
            self.migrate_entry(entry).await?;
        }
        self.summary.files_processed += 1;
        self.flush()
    }

    /// Resolve one row and add the migrated record to its batch. Unresolvable
    /// rows go to the failure ledger; transport and parse errors are returned.
    pub async fn migrate_entry(&mut self, entry: &MigrationEntry) -> Result<EntryOutcome> {
        self.summary.records_read += 1;

        let legacy = match Doi::parse(&entry.legacy_doi) {
            Ok(doi) => doi,
            Err(e) => {
                warn!(doi = %entry.legacy_doi, error = %e, "skipping malformed legacy DOI");
                return Ok(self.fail(&entry.legacy_doi, FailureReason::InvalidDoi));
            }
        };
        if !legacy.has_prefix(&self.config.migration.old_prefix) {
            warn!(
                doi = %legacy,
                old_prefix = %self.config.migration.old_prefix,
                "legacy DOI does not carry the configured old prefix"
            );
        }

        let record = match self.resolver.resolve_record(&legacy).await {
            Ok(Lookup::Found(record)) => record,
            Ok(Lookup::NotFound) => {
                return Ok(self.fail(&entry.legacy_doi, FailureReason::NotFound));
            }
            Err(ScienceError::Incomplete { reason, .. }) => {
                warn!(doi = %legacy, %reason, "rejecting incomplete record");
                return Ok(self.fail(&entry.legacy_doi, FailureReason::Incomplete(reason)));
            }
            Err(e) => return Err(e),
        };

        let new_doi = legacy.with_prefix(&self.config.migration.new_prefix);
        self.batches
            .add(record.migrate(new_doi.value.clone(), entry.new_url.clone()));
        self.summary.records_migrated += 1;

        Ok(EntryOutcome::Migrated {
            new_doi: new_doi.value,
        })
    }

    /// Render every batch accumulated so far and rewrite the ledger files.
    pub fn flush(&mut self) -> Result<()> {
        let timestamp = Utc::now();

        for batch in self.batches.iter() {
            let head = DepositHead::from_config(&self.config, batch.key.to_string(), timestamp);
            let xml = render_batch(batch, &head)?;
            let path = self.output.write_batch(&batch.key, &xml)?;
            info!(
                file = %path.display(),
                articles = batch.len(),
                "wrote deposit batch"
            );

            for record in &batch.records {
                if let Some(doi) = &record.article.doi {
                    self.ledger.record_success(doi);
                }
            }
        }
        self.summary.batches_written = self.batches.len();

        if !self.ledger.processed().is_empty() {
            let lines = self.ledger.mapping_lines(
                &self.config.migration.old_prefix,
                &self.config.migration.new_prefix,
            );
            self.output.write_transfer_list(&lines)?;
        }
        if !self.ledger.failed().is_empty() {
            self.output.write_failures(self.ledger.failed())?;
        }
        Ok(())
    }

    pub fn ledger(&self) -> &TransferLedger {
        &self.ledger
    }

    pub fn batches(&self) -> &BatchGrouper {
        &self.batches
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    fn fail(&mut self, legacy_doi: &str, reason: FailureReason) -> EntryOutcome {
        self.ledger.record_failure(legacy_doi);
        self.summary.records_failed += 1;
        EntryOutcome::Failed(reason)
    }
}
