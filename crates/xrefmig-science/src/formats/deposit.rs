//! Crossref 5.3.1 deposit documents, one per (volume, issue) batch.

use std::io::Cursor;

use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use xrefmig_core::{Author, Batch, CanonicalArticleRecord, MigratorConfig, PublicationDate};

use crate::error::{Result, ScienceError};

pub const SCHEMA_VERSION: &str = "5.3.1";

const NAMESPACES: &[(&str, &str)] = &[
    ("xmlns", "http://www.crossref.org/schema/5.3.1"),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    (
        "xsi:schemaLocation",
        "http://www.crossref.org/schema/5.3.1 https://www.crossref.org/schemas/crossref5.3.1.xsd",
    ),
    ("xmlns:jats", "http://www.ncbi.nlm.nih.gov/JATS1"),
    ("xmlns:fr", "http://www.crossref.org/fundref.xsd"),
    ("xmlns:mml", "http://www.w3.org/1998/Math/MathML"),
];

/// Document-level values that come from the run, not from any record.
#[derive(Debug, Clone)]
pub struct DepositHead {
    pub batch_id: String,
    pub timestamp: DateTime<Utc>,
    pub depositor_name: String,
    pub depositor_email: String,
    pub registrant: String,
}

impl DepositHead {
    pub fn from_config(config: &MigratorConfig, batch_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            batch_id: batch_id.into(),
            timestamp,
            depositor_name: config.depositor.name.clone(),
            depositor_email: config.depositor_email().to_string(),
            registrant: config.depositor.registrant.clone(),
        }
    }
}

/// Render one batch. Journal and issue metadata are taken from the first record.
pub fn render_batch(batch: &Batch, head: &DepositHead) -> Result<String> {
    let first = batch
        .first()
        .ok_or_else(|| ScienceError::Render(format!("batch {} has no records", batch.key)))?;

    let mut x = DepositWriter::new();
    x.declaration()?;

    let mut root = BytesStart::new("doi_batch");
    root.push_attribute(("version", SCHEMA_VERSION));
    for &(name, value) in NAMESPACES {
        root.push_attribute((name, value));
    }
    x.open(root)?;

    write_head(&mut x, head)?;

    x.start("body")?;
    x.start("journal")?;

    let mut metadata = BytesStart::new("journal_metadata");
    metadata.push_attribute(("reference_distribution_opts", "any"));
    x.open(metadata)?;
    x.text_element("full_title", &first.journal.full_title)?;
    if let Some(issn) = &first.journal.issn {
        x.text_element("issn", issn)?;
    }
    x.end("journal_metadata")?;

    x.start("journal_issue")?;
    write_date(&mut x, &first.article.published)?;
    if !first.article.volume.is_empty() {
        x.start("journal_volume")?;
        x.text_element("volume", &first.article.volume)?;
        x.end("journal_volume")?;
    }
    if !first.article.issue.is_empty() {
        x.text_element("issue", &first.article.issue)?;
    }
    x.end("journal_issue")?;

    for record in &batch.records {
        write_article(&mut x, record)?;
    }

    x.end("journal")?;
    x.end("body")?;
    x.end("doi_batch")?;
    x.finish()
}

fn write_head(x: &mut DepositWriter, head: &DepositHead) -> Result<()> {
    x.start("head")?;
    x.text_element("doi_batch_id", &head.batch_id)?;
    x.text_element("timestamp", &head.timestamp.format("%Y%m%d%H%M%S").to_string())?;
    x.start("depositor")?;
    x.text_element("depositor_name", &head.depositor_name)?;
    x.text_element("email_address", &head.depositor_email)?;
    x.end("depositor")?;
    x.text_element("registrant", &head.registrant)?;
    x.end("head")
}

fn write_article(x: &mut DepositWriter, record: &CanonicalArticleRecord) -> Result<()> {
    let article = &record.article;
    let doi = article.doi.as_deref().ok_or_else(|| {
        ScienceError::Render(format!("article `{}` has no migrated DOI", article.title))
    })?;

    x.start("journal_article")?;

    x.start("titles")?;
    x.text_element("title", &article.title)?;
    x.end("titles")?;

    if !article.authors.is_empty() {
        x.start("contributors")?;
        for (index, author) in article.authors.iter().enumerate() {
            write_person(x, author, index == 0)?;
        }
        x.end("contributors")?;
    }

    if let Some(text) = &article.abstract_text {
        x.start("jats:abstract")?;
        x.text_element("jats:p", text)?;
        x.end("jats:abstract")?;
    }

    write_date(x, &article.published)?;

    // the schema rejects an empty first_page
    if !article.first_page.is_empty() {
        x.start("pages")?;
        x.text_element("first_page", &article.first_page)?;
        if let Some(last) = &article.last_page {
            x.text_element("last_page", last)?;
        }
        x.end("pages")?;
    }

    x.start("doi_data")?;
    x.text_element("doi", doi)?;
    x.text_element("resource", &article.resource_url)?;
    x.end("doi_data")?;

    x.end("journal_article")
}

fn write_person(x: &mut DepositWriter, author: &Author, first: bool) -> Result<()> {
    let mut person = BytesStart::new("person_name");
    person.push_attribute(("sequence", if first { "first" } else { "additional" }));
    person.push_attribute(("contributor_role", "author"));
    x.open(person)?;
    if let Some(given) = &author.given {
        x.text_element("given_name", given)?;
    }
    x.text_element("surname", &author.family)?;
    x.end("person_name")
}

fn write_date(x: &mut DepositWriter, date: &PublicationDate) -> Result<()> {
    x.start("publication_date")?;
    if let Some(month) = date.month {
        x.text_element("month", &month.to_string())?;
    }
    if let Some(day) = date.day {
        x.text_element("day", &day.to_string())?;
    }
    x.text_element("year", &date.year.to_string())?;
    x.end("publication_date")
}

/// Indenting event writer with element helpers.
struct DepositWriter {
    inner: Writer<Cursor<Vec<u8>>>,
}

impl DepositWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        }
    }

    fn declaration(&mut self) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn open(&mut self, element: BytesStart) -> Result<()> {
        self.write(Event::Start(element))
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.open(BytesStart::new(name))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn write(&mut self, event: Event) -> Result<()> {
        self.inner
            .write_event(event)
            .map_err(|e| ScienceError::Render(format!("XML write failed: {e}")))
    }

    fn finish(self) -> Result<String> {
        let bytes = self.inner.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| ScienceError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use xrefmig_core::{ArticleInfo, BatchGrouper, JournalInfo};

    fn head() -> DepositHead {
        DepositHead {
            batch_id: "12.3".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
            depositor_name: "Jo Depositor".to_string(),
            depositor_email: "jo@example.org".to_string(),
            registrant: "Example Society".to_string(),
        }
    }

    fn record(title: &str, journal: &str, issn: &str, suffix: &str) -> CanonicalArticleRecord {
        CanonicalArticleRecord {
            journal: JournalInfo {
                full_title: journal.to_string(),
                publisher: "Example Press".to_string(),
                issn: Some(issn.to_string()),
            },
            article: ArticleInfo {
                volume: "12".to_string(),
                issue: "3".to_string(),
                title: title.to_string(),
                first_page: "12".to_string(),
                last_page: Some("34".to_string()),
                authors: vec![
                    Author::new("Lovelace", Some("Ada".to_string())),
                    Author::family_only("Babbage"),
                ],
                resource_url: format!("http://old.example/{suffix}"),
                doi: None,
                published: PublicationDate {
                    year: 2019,
                    month: Some(6),
                    day: None,
                },
                published_online: None,
                abstract_text: None,
            },
        }
        .migrate(format!("10.mmmmm/{suffix}"), format!("http://new.example/{suffix}"))
    }

    fn render(records: Vec<CanonicalArticleRecord>) -> String {
        let mut grouper = BatchGrouper::new();
        for r in records {
            grouper.add(r);
        }
        let batch = grouper.iter().next().unwrap();
        render_batch(batch, &head()).unwrap()
    }

    #[test]
    fn head_comes_from_run_values() {
        let xml = render(vec![record("A", "J", "1234-5678", "a")]);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(r#"<doi_batch version="5.3.1" xmlns="http://www.crossref.org/schema/5.3.1""#));
        assert!(xml.contains(r#"xmlns:jats="http://www.ncbi.nlm.nih.gov/JATS1""#));
        assert!(xml.contains("<doi_batch_id>12.3</doi_batch_id>"));
        assert!(xml.contains("<timestamp>20240309140507</timestamp>"));
        assert!(xml.contains("<depositor_name>Jo Depositor</depositor_name>"));
        assert!(xml.contains("<email_address>jo@example.org</email_address>"));
        assert!(xml.contains("<registrant>Example Society</registrant>"));
    }

    #[test]
    fn batch_header_uses_first_record() {
        let xml = render(vec![
            record("First title", "First Journal", "1111-1111", "a"),
            record("Second title", "Second Journal", "2222-2222", "b"),
        ]);

        assert!(xml.contains("<full_title>First Journal</full_title>"));
        assert!(xml.contains("<issn>1111-1111</issn>"));
        assert!(!xml.contains("Second Journal"));
        assert_eq!(xml.matches("<journal_article>").count(), 2);
        assert!(xml.contains("<title>First title</title>"));
        assert!(xml.contains("<title>Second title</title>"));
        assert!(xml.find("First title").unwrap() < xml.find("Second title").unwrap());
        assert!(xml.contains("<issue>3</issue>"));
        assert!(xml.contains("<volume>12</volume>"));
    }

    #[test]
    fn author_sequence_first_then_additional() {
        let xml = render(vec![record("A", "J", "1234-5678", "a")]);

        assert!(xml.contains(r#"<person_name sequence="first" contributor_role="author">"#));
        assert!(xml.contains(r#"<person_name sequence="additional" contributor_role="author">"#));
        assert_eq!(xml.matches("sequence=\"first\"").count(), 1);
        assert!(xml.contains("<given_name>Ada</given_name>"));
        assert!(xml.contains("<surname>Babbage</surname>"));
        assert_eq!(xml.matches("<given_name>").count(), 1);
    }

    #[test]
    fn repeated_author_is_still_additional() {
        let mut r = record("A", "J", "1234-5678", "a");
        r.article.authors = vec![Author::family_only("Same"), Author::family_only("Same")];
        let xml = render(vec![r]);
        assert_eq!(xml.matches("sequence=\"first\"").count(), 1);
        assert_eq!(xml.matches("sequence=\"additional\"").count(), 1);
    }

    #[test]
    fn no_authors_means_no_contributors_element() {
        let mut r = record("A", "J", "1234-5678", "a");
        r.article.authors.clear();
        let xml = render(vec![r]);

        assert!(xml.contains("<journal_article>"));
        assert!(!xml.contains("contributors"));
    }

    #[test]
    fn dates_omit_missing_month_and_day() {
        let xml = render(vec![record("A", "J", "1234-5678", "a")]);
        // issue level and article level
        assert_eq!(xml.matches("<month>6</month>").count(), 2);
        assert_eq!(xml.matches("<year>2019</year>").count(), 2);
        assert!(!xml.contains("<day>"));
    }

    #[test]
    fn article_date_is_independent_of_issue_date() {
        let first = record("A", "J", "1234-5678", "a");
        let mut second = record("B", "J", "1234-5678", "b");
        second.article.published = PublicationDate {
            year: 2020,
            month: Some(1),
            day: Some(15),
        };
        let xml = render(vec![first, second]);

        assert_eq!(xml.matches("<year>2019</year>").count(), 2);
        assert_eq!(xml.matches("<year>2020</year>").count(), 1);
        assert!(xml.contains("<day>15</day>"));
    }

    #[test]
    fn last_page_and_issn_are_optional() {
        let mut r = record("A", "J", "1234-5678", "a");
        r.article.last_page = None;
        r.journal.issn = None;
        let xml = render(vec![r]);

        assert!(xml.contains("<first_page>12</first_page>"));
        assert!(!xml.contains("last_page"));
        assert!(!xml.contains("<issn>"));
    }

    #[test]
    fn article_without_first_page_has_no_pages_block() {
        let mut r = record("Online only", "J", "1234-5678", "a");
        r.article.first_page.clear();
        let xml = render(vec![r]);

        assert!(!xml.contains("<pages>"));
        assert!(!xml.contains("<first_page"));
        assert!(!xml.contains("last_page"));
        assert!(xml.contains("<doi>10.mmmmm/a</doi>"));
    }

    #[test]
    fn doi_data_pairs_new_doi_and_url() {
        let xml = render(vec![record("A", "J", "1234-5678", "abc")]);
        assert!(xml.contains("<doi>10.mmmmm/abc</doi>"));
        assert!(xml.contains("<resource>http://new.example/abc</resource>"));
    }

    #[test]
    fn abstract_only_when_present() {
        let without = render(vec![record("A", "J", "1234-5678", "a")]);
        assert!(!without.contains("jats:abstract"));

        let mut r = record("A", "J", "1234-5678", "a");
        r.article.abstract_text = Some("Results & discussion".to_string());
        let with = render(vec![r]);
        assert!(with.contains("<jats:abstract>"));
        assert!(with.contains("<jats:p>Results &amp; discussion</jats:p>"));
    }

    #[test]
    fn unmigrated_record_is_rejected() {
        let mut r = record("A", "J", "1234-5678", "a");
        r.article.doi = None;
        let mut grouper = BatchGrouper::new();
        grouper.add(r);
        let err = render_batch(grouper.iter().next().unwrap(), &head()).unwrap_err();
        assert!(matches!(err, ScienceError::Render(_)));
    }
}
