use std::collections::HashSet;

/// Run-scoped record of migrated DOI suffixes and unresolved legacy DOIs.
#[derive(Debug, Default)]
pub struct TransferLedger {
    processed: Vec<String>,
    seen: HashSet<String>,
    failed: Vec<String>,
}

impl TransferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the suffix of a migrated DOI. Repeated suffixes are kept once.
    pub fn record_success(&mut self, new_doi: &str) {
        let suffix = doi_suffix(new_doi).to_string();
        if self.seen.insert(suffix.clone()) {
            self.processed.push(suffix);
        }
    }

    /// Store a legacy DOI that could not be resolved. No deduplication.
    pub fn record_failure(&mut self, legacy_doi: impl Into<String>) {
        self.failed.push(legacy_doi.into());
    }

    pub fn processed(&self) -> &[String] {
        &self.processed
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// `<old_prefix>/<suffix>\t<new_prefix>/<suffix>` for every processed suffix.
    pub fn mapping_lines(&self, old_prefix: &str, new_prefix: &str) -> Vec<String> {
        self.processed
            .iter()
            .map(|suffix| format!("{old_prefix}/{suffix}\t{new_prefix}/{suffix}"))
            .collect()
    }
}

/// Everything after the first `/`. A string without a separator is its own suffix.
pub fn doi_suffix(doi: &str) -> &str {
    doi.split_once('/').map(|(_, suffix)| suffix).unwrap_or(doi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_deduplicates_suffixes() {
        let mut ledger = TransferLedger::new();
        ledger.record_success("10.2222/abc");
        ledger.record_success("10.2222/def");
        ledger.record_success("10.2222/abc");

        assert_eq!(ledger.processed(), &["abc".to_string(), "def".to_string()]);
    }

    #[test]
    fn failures_keep_order_and_duplicates() {
        let mut ledger = TransferLedger::new();
        ledger.record_failure("10.1111/x");
        ledger.record_failure("10.1111/y");
        ledger.record_failure("10.1111/x");

        assert_eq!(ledger.failed(), &["10.1111/x", "10.1111/y", "10.1111/x"]);
    }

    #[test]
    fn mapping_lines_pair_old_and_new_prefix() {
        let mut ledger = TransferLedger::new();
        ledger.record_success("10.mmmmm/abc");
        assert_eq!(
            ledger.mapping_lines("10.nnnnn", "10.mmmmm"),
            vec!["10.nnnnn/abc\t10.mmmmm/abc".to_string()]
        );
    }

    #[test]
    fn suffix_keeps_inner_slashes() {
        assert_eq!(doi_suffix("10.1000/jnl/2019/7"), "jnl/2019/7");
        assert_eq!(doi_suffix("nosuffix"), "nosuffix");
    }
}
