use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, ScienceError};
use crate::http::PoliteClient;
use crate::identifiers::doi::Doi;
use crate::sources::{Lookup, MetadataRegistry, RawMetadata};

pub const NAME: &str = "Crossref";

pub struct CrossRefSource {
    client: PoliteClient,
    base_url: String,
}

impl CrossRefSource {
    pub fn with_params(base_url: &str, min_interval: Duration, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: PoliteClient::new(min_interval, user_agent)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_by_doi(&self, doi: &Doi) -> Result<Lookup<CrossRefWork>> {
        let url = format!("{}/works/{}", self.base_url, doi.url_path());
        let Some(body) = self.client.get_optional(&url).await? else {
            return Ok(Lookup::NotFound);
        };

        let val: Value = serde_json::from_str(&body)
            .map_err(|e| ScienceError::Parse(format!("invalid Crossref JSON for {doi}: {e}")))?;
        let message = val
            .get("message")
            .ok_or_else(|| ScienceError::Parse(format!("Crossref response for {doi} has no message")))?;

        debug!(doi = %doi, "Crossref record received");
        Ok(Lookup::Found(CrossRefWork::from_json(message)))
    }
}

#[async_trait]
impl MetadataRegistry for CrossRefSource {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn lookup(&self, doi: &Doi) -> Result<Lookup<RawMetadata>> {
        Ok(match self.fetch_by_doi(doi).await? {
            Lookup::Found(work) => Lookup::Found(RawMetadata::CrossRef(work)),
            Lookup::NotFound => Lookup::NotFound,
        })
    }
}

/// The subset of a Crossref `works` message needed for a deposit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossRefWork {
    pub doi: Option<String>,
    pub container_title: Vec<String>,
    pub publisher: Option<String>,
    pub issn: Vec<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub title: Vec<String>,
    /// Combined range such as `12-34`.
    pub page: Option<String>,
    pub author: Vec<CrossRefAuthor>,
    pub resource_url: Option<String>,
    /// `date-parts[0]` of `published`: year, then optional month and day.
    pub published: Vec<i64>,
    pub published_online: Option<Vec<i64>>,
    pub abstract_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossRefAuthor {
    pub given: Option<String>,
    pub family: Option<String>,
    pub name: Option<String>,
}

impl CrossRefWork {
    pub fn from_json(v: &Value) -> Self {
        let published = date_parts(&v["published"])
            .or_else(|| date_parts(&v["issued"]))
            .unwrap_or_default();

        Self {
            doi: string(&v["DOI"]),
            container_title: strings(&v["container-title"]),
            publisher: string(&v["publisher"]),
            issn: strings(&v["ISSN"]),
            volume: string(&v["volume"]),
            issue: string(&v["issue"]),
            title: strings(&v["title"]),
            page: string(&v["page"]),
            author: v["author"]
                .as_array()
                .map(|a| a.iter().map(CrossRefAuthor::from_json).collect())
                .unwrap_or_default(),
            resource_url: string(&v["resource"]["primary"]["URL"]),
            published,
            published_online: date_parts(&v["published-online"]),
            abstract_text: string(&v["abstract"]),
        }
    }
}

impl CrossRefAuthor {
    fn from_json(v: &Value) -> Self {
        Self {
            given: string(&v["given"]),
            family: string(&v["family"]),
            name: string(&v["name"]),
        }
    }
}

fn string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        // volume and issue occasionally arrive as numbers
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn strings(v: &Value) -> Vec<String> {
    v.as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str()).map(|s| s.to_string()).collect())
        .unwrap_or_default()
}

/// Leading integer components of `{"date-parts": [[y, m, d]]}`.
fn date_parts(v: &Value) -> Option<Vec<i64>> {
    let parts: Vec<i64> = v["date-parts"][0]
        .as_array()?
        .iter()
        .map_while(Value::as_i64)
        .collect();
    if parts.is_empty() { None } else { Some(parts) }
}
