use tracing::debug;
use xrefmig_core::{ArticleInfo, Author, CanonicalArticleRecord, JournalInfo, OnlineDate, PublicationDate};

use super::{Normalize, clean_abstract, incomplete, non_empty, split_page_range};
use crate::error::Result;
use crate::identifiers::doi::Doi;
use crate::sources::crossref::{CrossRefAuthor, CrossRefWork};

impl Normalize for CrossRefWork {
    fn normalize(&self, doi: &Doi) -> Result<CanonicalArticleRecord> {
        let published = publication_date(&self.published)
            .ok_or_else(|| incomplete(doi, "Crossref record has no publication year"))?;

        let (first_page, last_page) = self
            .page
            .as_deref()
            .map(split_page_range)
            .unwrap_or_default();

        Ok(CanonicalArticleRecord {
            journal: JournalInfo {
                full_title: self.container_title.first().cloned().unwrap_or_default(),
                publisher: self.publisher.clone().unwrap_or_default(),
                issn: non_empty(self.issn.first().map(String::as_str)),
            },
            article: ArticleInfo {
                volume: self.volume.clone().unwrap_or_default(),
                issue: self.issue.clone().unwrap_or_default(),
                title: self.title.first().cloned().unwrap_or_default(),
                first_page,
                last_page,
                authors: self.author.iter().filter_map(|a| author(doi, a)).collect(),
                resource_url: self.resource_url.clone().unwrap_or_default(),
                doi: None,
                published,
                published_online: self.published_online.as_deref().map(online_date),
                abstract_text: self.abstract_text.as_deref().and_then(clean_abstract),
            },
        })
    }
}

fn author(doi: &Doi, a: &CrossRefAuthor) -> Option<Author> {
    // organisational authors only carry `name`
    let family = non_empty(a.family.as_deref()).or_else(|| non_empty(a.name.as_deref()));
    match family {
        Some(family) => Some(Author::new(family, non_empty(a.given.as_deref()))),
        None => {
            debug!(doi = %doi, "dropping Crossref author without a name");
            None
        }
    }
}

fn publication_date(parts: &[i64]) -> Option<PublicationDate> {
    let year = i32::try_from(*parts.first()?).ok()?;
    Some(PublicationDate {
        year,
        month: component(parts, 1),
        day: component(parts, 2),
    })
}

fn online_date(parts: &[i64]) -> OnlineDate {
    OnlineDate {
        year: parts.first().and_then(|&y| i32::try_from(y).ok()),
        month: component(parts, 1),
        day: component(parts, 2),
    }
}

fn component(parts: &[i64], index: usize) -> Option<u32> {
    parts.get(index).and_then(|&v| u32::try_from(v).ok())
}
