use serde::{Deserialize, Serialize};

/// Journal-level metadata shared by every article of an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalInfo {
    pub full_title: String,
    pub publisher: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub family: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
}

impl Author {
    pub fn new(family: impl Into<String>, given: Option<String>) -> Self {
        Self {
            family: family.into(),
            given,
        }
    }

    pub fn family_only(family: impl Into<String>) -> Self {
        Self::new(family, None)
    }
}

/// A print publication date. The year is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationDate {
    pub year: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl PublicationDate {
    pub fn year_only(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }
}

/// Online publication date; every component may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineDate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInfo {
    pub volume: String,
    pub issue: String,
    pub title: String,
    pub first_page: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_page: Option<String>,

    /// Citation order. Index 0 is the first author.
    #[serde(default)]
    pub authors: Vec<Author>,

    pub resource_url: String,

    /// Only set once the legacy DOI has been moved to the new prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    pub published: PublicationDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_online: Option<OnlineDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
}

/// Registry-independent article record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalArticleRecord {
    pub journal: JournalInfo,
    pub article: ArticleInfo,
}

impl CanonicalArticleRecord {
    /// Attach the migrated DOI and overwrite the resource URL with the new location.
    pub fn migrate(mut self, new_doi: impl Into<String>, resource_url: impl Into<String>) -> Self {
        self.article.doi = Some(new_doi.into());
        self.article.resource_url = resource_url.into();
        self
    }

    pub fn is_migrated(&self) -> bool {
        self.article.doi.is_some()
    }
}
