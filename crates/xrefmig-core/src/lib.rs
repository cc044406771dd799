//! xrefmig core: article records, run configuration, batch grouping and the transfer ledger.

pub mod batch;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod storage;

pub use batch::{Batch, BatchGrouper, BatchKey};
pub use config::{DepositorConfig, MigrationConfig, MigratorConfig, RegistryConfig};
pub use error::{CoreError, ExitCode, Result};
pub use ledger::TransferLedger;
pub use models::*;
pub use storage::input::{MigrationEntry, list_input_files, read_entries};
pub use storage::output::OutputDir;
