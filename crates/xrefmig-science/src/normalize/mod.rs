//! Registry-specific mapping of raw responses onto [`CanonicalArticleRecord`].
//!
//! Values the deposit cannot do without (the publication year) make a record
//! [`ScienceError::Incomplete`]; other missing strings become empty and
//! missing optional values stay `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use xrefmig_core::CanonicalArticleRecord;

use crate::error::{Result, ScienceError};
use crate::identifiers::doi::Doi;

mod crossref;
mod medra;

pub use medra::split_person_names;

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid regex"));

pub trait Normalize {
    fn normalize(&self, doi: &Doi) -> Result<CanonicalArticleRecord>;
}

/// `"12-34"` → (`"12"`, `Some("34")`); a range without a hyphen has no last page.
pub fn split_page_range(range: &str) -> (String, Option<String>) {
    let mut parts = range.split('-').map(str::trim);
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts
        .next()
        .filter(|last| !last.is_empty())
        .map(str::to_string);
    (first, last)
}

/// Registry abstracts may carry JATS or HTML markup; keep the text only.
pub fn clean_abstract(raw: &str) -> Option<String> {
    let text = MARKUP_RE.replace_all(raw, " ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() { None } else { Some(text) }
}

fn incomplete(doi: &Doi, reason: &str) -> ScienceError {
    ScienceError::Incomplete {
        doi: doi.value.clone(),
        reason: reason.to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
