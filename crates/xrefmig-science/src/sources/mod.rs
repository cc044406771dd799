use async_trait::async_trait;
use xrefmig_core::CanonicalArticleRecord;

use crate::error::Result;
use crate::identifiers::doi::Doi;
use crate::normalize::Normalize;

pub mod crossref;
pub mod medra;

use crossref::CrossRefWork;
use medra::MedraRecord;

/// Outcome of a registry lookup. A missing record is an answer, not an error.
#[derive(Debug, Clone)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

/// Registry response in its source-specific shape.
#[derive(Debug, Clone)]
pub enum RawMetadata {
    CrossRef(CrossRefWork),
    Medra(MedraRecord),
}

impl RawMetadata {
    pub fn registry(&self) -> &'static str {
        match self {
            RawMetadata::CrossRef(_) => crossref::NAME,
            RawMetadata::Medra(_) => medra::NAME,
        }
    }

    /// Pick the normalizer matching the registry that answered.
    pub fn normalize(&self, doi: &Doi) -> Result<CanonicalArticleRecord> {
        match self {
            RawMetadata::CrossRef(work) => work.normalize(doi),
            RawMetadata::Medra(record) => record.normalize(doi),
        }
    }
}

#[async_trait]
pub trait MetadataRegistry: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, doi: &Doi) -> Result<Lookup<RawMetadata>>;
}
