use once_cell::sync::Lazy;
use regex::Regex;
use xrefmig_core::{ArticleInfo, Author, CanonicalArticleRecord, JournalInfo, OnlineDate, PublicationDate};

use super::{Normalize, incomplete, non_empty};
use crate::error::Result;
use crate::identifiers::doi::Doi;
use crate::sources::medra::MedraRecord;

/// Tokens such as `J.`, `J. R.` or `J.-P.` that trail a surname.
static INITIALS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?:\p{Lu}\.[\s-]*)+|\p{Lu}{1,2})$").expect("valid regex"));

impl Normalize for MedraRecord {
    fn normalize(&self, doi: &Doi) -> Result<CanonicalArticleRecord> {
        let year = self
            .issue_date
            .as_deref()
            .and_then(parse_year)
            .ok_or_else(|| incomplete(doi, "mEDRA record has no issue year"))?;

        Ok(CanonicalArticleRecord {
            journal: JournalInfo {
                full_title: self.journal_title.clone().unwrap_or_default(),
                publisher: self.publisher.clone().unwrap_or_default(),
                issn: non_empty(self.issn.as_deref()),
            },
            article: ArticleInfo {
                volume: self.volume.clone().unwrap_or_default(),
                issue: self.issue.clone().unwrap_or_default(),
                title: self.title.clone().unwrap_or_default(),
                first_page: self.first_page.clone().unwrap_or_default(),
                last_page: non_empty(self.last_page.as_deref()),
                authors: self
                    .person_names
                    .iter()
                    .map(String::as_str)
                    .flat_map(split_person_names)
                    .map(Author::family_only)
                    .collect(),
                resource_url: self.resource_url.clone().unwrap_or_default(),
                doi: None,
                published: PublicationDate::year_only(year),
                published_online: Some(OnlineDate {
                    year: Some(year),
                    month: None,
                    day: None,
                }),
                abstract_text: None,
            },
        })
    }
}

/// Split a legacy `PersonName` that lists several people separated by commas.
/// Initials following a surname stay attached to it, so
/// `"Smith, J., Doe, A."` yields `["Smith, J.", "Doe, A."]`.
pub fn split_person_names(field: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in field.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match names.last_mut() {
            Some(previous) if INITIALS_RE.is_match(token) => {
                previous.push_str(", ");
                previous.push_str(token);
            }
            _ => names.push(token.to_string()),
        }
    }
    names
}

/// Leading four-digit year of an ONIX date (`YYYY`, `YYYYMM`, `YYYYMMDD`).
fn parse_year(date: &str) -> Option<i32> {
    let date = date.trim();
    date.get(..4)
        .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        .and_then(|y| y.parse().ok())
}
