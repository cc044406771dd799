//! xrefmig science: registry lookups, metadata normalization, Crossref deposit rendering.

pub mod error;
pub mod http;
pub mod identifiers;
pub mod sources;
pub mod normalize;
pub mod resolver;
pub mod formats;
pub mod migration;

pub use error::{Result, ScienceError};
pub use identifiers::doi::Doi;
pub use migration::{MigrationRun, RunSummary};
pub use resolver::RegistryResolver;
pub use sources::{Lookup, MetadataRegistry, RawMetadata};
