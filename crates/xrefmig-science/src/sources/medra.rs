use std::time::Duration;

use async_trait::async_trait;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScienceError};
use crate::http::PoliteClient;
use crate::identifiers::doi::Doi;
use crate::sources::{Lookup, MetadataRegistry, RawMetadata};

pub const NAME: &str = "mEDRA";

pub struct MedraSource {
    client: PoliteClient,
    base_url: String,
}

impl MedraSource {
    pub fn with_params(base_url: &str, min_interval: Duration, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: PoliteClient::new(min_interval, user_agent)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn metadata_url(&self, doi: &Doi) -> String {
        format!("{}/metadata/{}", self.base_url, doi.url_path())
    }

    pub async fn fetch_by_doi(&self, doi: &Doi) -> Result<Lookup<MedraRecord>> {
        let url = self.metadata_url(doi);
        let Some(xml) = self.client.get_optional(&url).await? else {
            return Ok(Lookup::NotFound);
        };

        debug!(doi = %doi, "mEDRA record received");
        MedraRecord::from_xml(&xml).map(Lookup::Found)
    }
}

#[async_trait]
impl MetadataRegistry for MedraSource {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn lookup(&self, doi: &Doi) -> Result<Lookup<RawMetadata>> {
        Ok(match self.fetch_by_doi(doi).await? {
            Lookup::Found(record) => Lookup::Found(RawMetadata::Medra(record)),
            Lookup::NotFound => Lookup::NotFound,
        })
    }
}

/// Values picked out of an ONIX for DOI serial-article record. Each field is
/// the text of the first element matching its path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedraRecord {
    pub journal_title: Option<String>,
    pub publisher: Option<String>,
    pub issn: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub title: Option<String>,
    pub first_page: Option<String>,
    pub last_page: Option<String>,
    /// Raw `PersonName` texts; legacy records may list several people in one.
    pub person_names: Vec<String>,
    pub resource_url: Option<String>,
    pub issue_date: Option<String>,
}

impl MedraRecord {
    pub fn from_xml(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)
            .map_err(|e| ScienceError::Parse(format!("invalid mEDRA xml: {e}")))?;

        Ok(Self {
            journal_title: first_text(&doc, &["SerialWork", "TitleText"]),
            publisher: first_text(&doc, &["SerialWork", "PublisherName"]),
            issn: first_text(&doc, &["SerialVersion", "IDValue"]),
            volume: first_text(&doc, &["JournalIssueDesignation"]),
            issue: first_text(&doc, &["JournalIssueNumber"]),
            title: first_text(&doc, &["ContentItem", "Title", "TitleText"]),
            first_page: first_text(&doc, &["FirstPageNumber"]),
            last_page: first_text(&doc, &["LastPageNumber"]),
            person_names: all_texts(&doc, &["Contributor", "PersonName"]),
            resource_url: first_text(&doc, &["DOIWebsiteLink"]),
            issue_date: first_text(&doc, &["JournalIssueDate", "Date"]),
        })
    }
}

/// Text of the first element, in document order, matching `//a//b//c`.
fn first_text(doc: &Document, path: &[&str]) -> Option<String> {
    doc.descendants()
        .find(|node| matches_path(*node, path))
        .and_then(element_text)
}

fn all_texts(doc: &Document, path: &[&str]) -> Vec<String> {
    doc.descendants()
        .filter(|node| matches_path(*node, path))
        .filter_map(element_text)
        .collect()
}

fn element_text(node: Node) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Local-name match of `node` against the last path step, with the earlier
/// steps found among its ancestors in order (descendant axis).
fn matches_path(node: Node, path: &[&str]) -> bool {
    let Some((last, ancestors)) = path.split_last() else {
        return false;
    };
    if !node.is_element() || node.tag_name().name() != *last {
        return false;
    }

    let mut wanted = ancestors.iter().rev().peekable();
    for ancestor in node.ancestors().skip(1) {
        let Some(name) = wanted.peek() else { break };
        if ancestor.is_element() && ancestor.tag_name().name() == **name {
            wanted.next();
        }
    }
    wanted.peek().is_none()
}
