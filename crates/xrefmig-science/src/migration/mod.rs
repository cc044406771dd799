pub mod pipeline;

pub use pipeline::{EntryOutcome, FailureReason, MigrationRun, RunSummary};
