use std::time::Duration;

use tracing::{info, warn};
use xrefmig_core::{CanonicalArticleRecord, MigratorConfig};

use crate::error::Result;
use crate::identifiers::doi::Doi;
use crate::sources::crossref::CrossRefSource;
use crate::sources::medra::MedraSource;
use crate::sources::{Lookup, MetadataRegistry, RawMetadata};

/// Looks a DOI up at the primary registry and, only when that registry has
/// no record, at the secondary one. Errors from either lookup are returned
/// as-is.
pub struct RegistryResolver {
    primary: Box<dyn MetadataRegistry>,
    secondary: Box<dyn MetadataRegistry>,
}

impl RegistryResolver {
    pub fn new(primary: Box<dyn MetadataRegistry>, secondary: Box<dyn MetadataRegistry>) -> Self {
        Self { primary, secondary }
    }

    /// Crossref first, mEDRA as fallback, both configured from `config.registry`.
    pub fn from_config(config: &MigratorConfig) -> Result<Self> {
        let user_agent = config.user_agent();
        let interval = Duration::from_millis(config.registry.min_interval_ms);
        Ok(Self::new(
            Box::new(CrossRefSource::with_params(
                &config.registry.crossref_base_url,
                interval,
                &user_agent,
            )?),
            Box::new(MedraSource::with_params(
                &config.registry.medra_base_url,
                interval,
                &user_agent,
            )?),
        ))
    }

    pub async fn resolve(&self, doi: &Doi) -> Result<Lookup<RawMetadata>> {
        info!(doi = %doi, "looking up DOI metadata");

        if let Lookup::Found(raw) = self.primary.lookup(doi).await? {
            return Ok(Lookup::Found(raw));
        }

        info!(
            doi = %doi,
            primary = self.primary.name(),
            secondary = self.secondary.name(),
            "not found at primary registry, trying secondary"
        );
        let lookup = self.secondary.lookup(doi).await?;
        if !lookup.is_found() {
            warn!(doi = %doi, registry = self.secondary.name(), "secondary lookup failed as well");
        }
        Ok(lookup)
    }

    /// Resolve and normalize with whichever registry answered.
    pub async fn resolve_record(&self, doi: &Doi) -> Result<Lookup<CanonicalArticleRecord>> {
        match self.resolve(doi).await? {
            Lookup::Found(raw) => raw.normalize(doi).map(Lookup::Found),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::ScienceError;
    use crate::sources::crossref::CrossRefWork;
    use crate::sources::medra::MedraRecord;

    /// In-memory registry answering from a fixed table.
    pub(crate) struct StubRegistry {
        name: &'static str,
        records: HashMap<String, RawMetadata>,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl StubRegistry {
        pub(crate) fn new(name: &'static str) -> Self {
            Self {
                name,
                records: HashMap::new(),
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub(crate) fn with(mut self, doi: &str, raw: RawMetadata) -> Self {
            self.records.insert(doi.to_string(), raw);
            self
        }

        pub(crate) fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn calls(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait]
    impl MetadataRegistry for StubRegistry {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn lookup(&self, doi: &Doi) -> Result<Lookup<RawMetadata>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ScienceError::ApiError(self.name.to_string(), "HTTP 500".to_string()));
            }
            Ok(match self.records.get(&doi.value) {
                Some(raw) => Lookup::Found(raw.clone()),
                None => Lookup::NotFound,
            })
        }
    }

    fn crossref() -> RawMetadata {
        RawMetadata::CrossRef(CrossRefWork::default())
    }

    fn medra() -> RawMetadata {
        RawMetadata::Medra(MedraRecord::default())
    }

    #[tokio::test]
    async fn primary_hit_skips_secondary() {
        let secondary = StubRegistry::new("secondary").with("10.1/a", medra());
        let secondary_calls = secondary.calls();
        let resolver = RegistryResolver::new(
            Box::new(StubRegistry::new("primary").with("10.1/a", crossref())),
            Box::new(secondary),
        );

        let lookup = resolver.resolve(&Doi::parse("10.1/a").unwrap()).await.unwrap();
        assert_eq!(lookup.found().map(|raw| raw.registry()), Some("Crossref"));
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn primary_miss_falls_back() {
        let resolver = RegistryResolver::new(
            Box::new(StubRegistry::new("primary")),
            Box::new(StubRegistry::new("secondary").with("10.1/a", medra())),
        );

        let lookup = resolver.resolve(&Doi::parse("10.1/a").unwrap()).await.unwrap();
        assert_eq!(lookup.found().map(|raw| raw.registry()), Some("mEDRA"));
    }

    #[tokio::test]
    async fn both_missing_is_not_found() {
        let resolver = RegistryResolver::new(
            Box::new(StubRegistry::new("primary")),
            Box::new(StubRegistry::new("secondary")),
        );

        let lookup = resolver.resolve(&Doi::parse("10.1/a").unwrap()).await.unwrap();
        assert!(!lookup.is_found());
    }

    #[tokio::test]
    async fn primary_error_does_not_fall_back() {
        let secondary = StubRegistry::new("secondary").with("10.1/a", medra());
        let secondary_calls = secondary.calls();
        let resolver = RegistryResolver::new(
            Box::new(StubRegistry::new("primary").failing()),
            Box::new(secondary),
        );

        let result = resolver.resolve(&Doi::parse("10.1/a").unwrap()).await;
        assert!(matches!(result, Err(ScienceError::ApiError(..))));
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }
}
