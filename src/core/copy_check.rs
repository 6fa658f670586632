//! Read-only reconciliation of the copy sheet against the documents in Sanity.
//! Only the summary text and the number of FAQs are compared, and only
//! against published documents.

use crate::adapters::sanity::{Perspective, SanityClient};
use crate::core::copy_patches::MISSING_PREVIEW;
use crate::core::records::decode_csv;
use crate::core::text::faq_count;
use crate::core::{Pipeline, Storage};
use crate::domain::model::{CopyRow, RemoteCopy};
use crate::utils::error::Result;
use serde_json::json;
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_BATCH_SIZE: usize = 50;

pub fn check_query(doc_type: &str) -> String {
    format!(
        "*[_type == \"{}\" && slug.current in $slugs]{{ \"slug\": slug.current, summary, faqs[]{{question, answer}} }}",
        doc_type
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckedField {
    Summary,
    Faqs,
}

impl CheckedField {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckedField::Summary => "summary",
            CheckedField::Faqs => "faqs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub slug: String,
    pub field: CheckedField,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.slug, self.field.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyCheckReport {
    pub checked: usize,
    pub missing: Vec<String>,
    pub mismatches: Vec<Mismatch>,
}

impl CopyCheckReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.mismatches.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Checked {} CSV rows", self.checked),
            format!("Missing docs in Sanity: {}", self.missing.len()),
        ];
        if !self.missing.is_empty() {
            let preview: Vec<&String> = self.missing.iter().take(MISSING_PREVIEW).collect();
            lines.push(format!("{:?}", preview));
        }
        lines.push(format!("Mismatches: {}", self.mismatches.len()));
        if !self.mismatches.is_empty() {
            let preview: Vec<String> = self
                .mismatches
                .iter()
                .take(MISSING_PREVIEW)
                .map(Mismatch::to_string)
                .collect();
            lines.push(format!("{:?}", preview));
        }
        lines
    }
}

impl fmt::Display for CopyCheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "checked {} rows, {} missing, {} mismatches",
            self.checked,
            self.missing.len(),
            self.mismatches.len()
        )
    }
}

/// Trimmed, non-empty slugs in sheet order.
pub fn sheet_slugs(rows: &[CopyRow]) -> Vec<String> {
    rows.iter()
        .map(CopyRow::trimmed_slug)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn reconcile(rows: &[CopyRow], remote: &HashMap<String, RemoteCopy>) -> CopyCheckReport {
    let mut report = CopyCheckReport {
        checked: rows.len(),
        ..Default::default()
    };

    for row in rows {
        let slug = row.trimmed_slug();
        if slug.is_empty() {
            continue;
        }
        let Some(doc) = remote.get(slug) else {
            report.missing.push(slug.to_string());
            continue;
        };

        let remote_summary = doc.summary.as_deref().unwrap_or("");
        let sheet_summary = row.summary.as_deref().unwrap_or("");
        if remote_summary != sheet_summary {
            report.mismatches.push(Mismatch {
                slug: slug.to_string(),
                field: CheckedField::Summary,
            });
        }

        let sheet_faqs = faq_count(row.faqs.as_deref().unwrap_or(""));
        let remote_faqs = doc.faqs.as_ref().map_or(0, Vec::len);
        if sheet_faqs != remote_faqs {
            report.mismatches.push(Mismatch {
                slug: slug.to_string(),
                field: CheckedField::Faqs,
            });
        }
    }

    report
}

pub struct CopyCheckInput {
    pub rows: Vec<CopyRow>,
    pub remote: HashMap<String, RemoteCopy>,
}

pub struct CopyCheckPipeline<S: Storage> {
    storage: S,
    client: SanityClient,
    document_type: String,
    csv_path: String,
    batch_size: usize,
}

impl<S: Storage> CopyCheckPipeline<S> {
    pub fn new(
        storage: S,
        client: SanityClient,
        document_type: impl Into<String>,
        csv_path: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            client,
            document_type: document_type.into(),
            csv_path: csv_path.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn fetch_remote(&self, slugs: &[String]) -> Result<HashMap<String, RemoteCopy>> {
        let query = check_query(&self.document_type);
        let mut by_slug = HashMap::new();

        for (batch, chunk) in slugs.chunks(self.batch_size).enumerate() {
            tracing::debug!("Fetching batch {} ({} slugs)", batch + 1, chunk.len());
            let params = json!({ "slugs": chunk });
            let docs: Vec<RemoteCopy> = self
                .client
                .query_with_params(&query, &params, Perspective::Published)
                .await?;
            for doc in docs {
                if let Some(slug) = doc.slug.clone().filter(|s| !s.is_empty()) {
                    by_slug.insert(slug, doc);
                }
            }
        }

        Ok(by_slug)
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for CopyCheckPipeline<S> {
    type Extracted = CopyCheckInput;
    type Transformed = CopyCheckReport;
    type Report = CopyCheckReport;

    async fn extract(&self) -> Result<CopyCheckInput> {
        let data = self.storage.read_file(&self.csv_path).await?;
        let rows = decode_csv::<CopyRow>(&data, &self.csv_path)?.rows;
        let slugs = sheet_slugs(&rows);
        tracing::info!("Checking {} slugs against Sanity", slugs.len());

        let remote = self.fetch_remote(&slugs).await?;
        Ok(CopyCheckInput { rows, remote })
    }

    async fn transform(&self, input: CopyCheckInput) -> Result<CopyCheckReport> {
        Ok(reconcile(&input.rows, &input.remote))
    }

    async fn load(&self, report: CopyCheckReport) -> Result<CopyCheckReport> {
        for line in report.lines() {
            println!("{}", line);
        }
        Ok(report)
    }
}
