//! Turns the neighborhood copy sheet into id-targeted patch mutations, one per
//! matching published or draft document.

use crate::adapters::sanity::{Perspective, SanityClient};
use crate::core::records::{decode_csv, encode_ndjson};
use crate::core::text::{faq_items, non_empty, split_list, text_to_blocks};
use crate::core::{Pipeline, Storage};
use crate::domain::model::{
    CopyRow, MutationBatch, NeighborhoodCopySet, Patch, PatchTarget, RunReport, SlugDoc,
};
use crate::utils::error::Result;
use std::collections::BTreeMap;

/// How many missing slugs the summary line lists before truncating.
pub const MISSING_PREVIEW: usize = 20;

/// slug -> document ids. A slug can have a published and a draft copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlugIndex {
    ids: BTreeMap<String, Vec<String>>,
}

impl SlugIndex {
    pub fn merge(&mut self, docs: impl IntoIterator<Item = SlugDoc>) {
        for doc in docs {
            let (Some(slug), Some(id)) = (doc.slug, doc.id) else {
                continue;
            };
            if slug.is_empty() || id.is_empty() {
                continue;
            }
            self.ids.entry(slug).or_default().push(id);
        }
    }

    pub fn get(&self, slug: &str) -> Option<&[String]> {
        self.ids
            .get(slug)
            .map(Vec::as_slice)
            .filter(|ids| !ids.is_empty())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub fn published_query(doc_type: &str) -> String {
    format!(
        "*[_type == \"{}\" && !(_id match \"drafts.*\")]{{_id, \"slug\": slug.current}}",
        doc_type
    )
}

pub fn drafts_query(doc_type: &str) -> String {
    format!(
        "*[_type == \"{}\" && _id match \"drafts.*\"]{{_id, \"slug\": slug.current}}",
        doc_type
    )
}

/// Published documents first, then drafts.
pub async fn fetch_slug_index(client: &SanityClient, doc_type: &str) -> Result<SlugIndex> {
    let mut index = SlugIndex::default();

    let published: Vec<SlugDoc> = client
        .query(&published_query(doc_type), Perspective::Published)
        .await?;
    tracing::info!("Fetched {} published {} documents", published.len(), doc_type);
    index.merge(published);

    let drafts: Vec<SlugDoc> = client
        .query(&drafts_query(doc_type), Perspective::Drafts)
        .await?;
    tracing::info!("Fetched {} draft {} documents", drafts.len(), doc_type);
    index.merge(drafts);

    Ok(index)
}

pub fn copy_set(row: &CopyRow) -> NeighborhoodCopySet {
    let text = |field: &Option<String>| field.as_deref().unwrap_or("").to_string();

    NeighborhoodCopySet {
        summary: non_empty(row.summary.as_deref()),
        overview: text_to_blocks(&text(&row.overview)),
        lifestyle: text_to_blocks(&text(&row.lifestyle)),
        buyer_insights: text_to_blocks(&text(&row.buyer_insights)),
        seller_insights: text_to_blocks(&text(&row.seller_insights)),
        highlights: split_list(&text(&row.highlights)),
        amenities: split_list(&text(&row.amenities)),
        faqs: faq_items(&text(&row.faqs)),
        best_for: non_empty(row.best_for.as_deref()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct CopyPatchPlan {
    pub mutations: Vec<MutationBatch<NeighborhoodCopySet>>,
    /// Slug, or the row's name when the slug is blank.
    pub missing: Vec<String>,
}

pub fn build_copy_patches(rows: &[CopyRow], index: &SlugIndex) -> CopyPatchPlan {
    let mut plan = CopyPatchPlan::default();

    for row in rows {
        let slug = row.trimmed_slug();
        let Some(doc_ids) = index.get(slug) else {
            let label = if slug.is_empty() {
                row.name.clone().unwrap_or_default()
            } else {
                slug.to_string()
            };
            plan.missing.push(label);
            continue;
        };

        let set = copy_set(row);
        for id in doc_ids {
            plan.mutations.push(MutationBatch::single(Patch {
                target: PatchTarget::Id { id: id.clone() },
                set: set.clone(),
            }));
        }
    }

    plan
}

pub fn missing_summary(missing: &[String]) -> Option<String> {
    if missing.is_empty() {
        return None;
    }
    let preview: Vec<&String> = missing.iter().take(MISSING_PREVIEW).collect();
    Some(format!(
        "Missing slugs: {:?} ... total {}",
        preview,
        missing.len()
    ))
}

/// What the tool prints once the file is written: the summary, then the
/// missing-slug line if any.
pub fn report_lines(report: &RunReport) -> Vec<String> {
    let mut lines = vec![report.summary()];
    lines.extend(missing_summary(&report.skipped));
    lines
}

pub struct CopyPatchInput {
    pub rows: Vec<CopyRow>,
    pub index: SlugIndex,
}

pub struct CopyPatchesPipeline<S: Storage> {
    storage: S,
    client: SanityClient,
    document_type: String,
    csv_path: String,
    output_path: String,
}

impl<S: Storage> CopyPatchesPipeline<S> {
    pub fn new(
        storage: S,
        client: SanityClient,
        document_type: impl Into<String>,
        csv_path: impl Into<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            client,
            document_type: document_type.into(),
            csv_path: csv_path.into(),
            output_path: output_path.into(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for CopyPatchesPipeline<S> {
    type Extracted = CopyPatchInput;
    type Transformed = CopyPatchPlan;
    type Report = RunReport;

    async fn extract(&self) -> Result<CopyPatchInput> {
        let index = fetch_slug_index(&self.client, &self.document_type).await?;
        tracing::info!("Resolved {} distinct slugs", index.len());

        let data = self.storage.read_file(&self.csv_path).await?;
        let decoded = decode_csv::<CopyRow>(&data, &self.csv_path)?;
        Ok(CopyPatchInput {
            rows: decoded.rows,
            index,
        })
    }

    async fn transform(&self, input: CopyPatchInput) -> Result<CopyPatchPlan> {
        Ok(build_copy_patches(&input.rows, &input.index))
    }

    async fn load(&self, plan: CopyPatchPlan) -> Result<RunReport> {
        let data = encode_ndjson(&plan.mutations)?;
        self.storage.write_file(&self.output_path, &data).await?;

        if !plan.missing.is_empty() {
            tracing::warn!("{} slugs have no matching document", plan.missing.len());
        }

        Ok(RunReport {
            written: plan.mutations.len(),
            noun: "patches",
            output_path: Some(self.output_path.clone()),
            skipped: plan.missing,
            failed: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, slug: &str) -> SlugDoc {
        SlugDoc {
            id: Some(id.to_string()),
            slug: Some(slug.to_string()),
        }
    }

    fn row(slug: &str) -> CopyRow {
        CopyRow {
            slug: Some(slug.to_string()),
            name: Some(format!("{} name", slug)),
            summary: Some("Tree-lined streets near the harbor.".to_string()),
            overview: Some("Para one.\n\nPara two.".to_string()),
            highlights: Some("Waterfront, Walkable".to_string()),
            faqs: Some("Q: What?\nA: This.\nQ: When?\nA: Now.".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_slug_index_merges_published_and_drafts() {
        let mut index = SlugIndex::default();
        index.merge(vec![doc("abc", "old-village"), doc("def", "ansonborough")]);
        index.merge(vec![
            doc("drafts.abc", "old-village"),
            SlugDoc {
                id: Some("drafts.x".to_string()),
                slug: None,
            },
        ]);

        assert_eq!(
            index.get("old-village").unwrap(),
            &["abc".to_string(), "drafts.abc".to_string()]
        );
        assert_eq!(index.get("ansonborough").unwrap().len(), 1);
        assert!(index.get("nowhere").is_none());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_one_patch_per_document_id() {
        let mut index = SlugIndex::default();
        index.merge(vec![doc("abc", "old-village"), doc("drafts.abc", "old-village")]);

        let plan = build_copy_patches(&[row("old-village"), row("nowhere")], &index);

        assert_eq!(plan.mutations.len(), 2);
        assert_eq!(plan.missing, vec!["nowhere".to_string()]);

        let ids: Vec<&PatchTarget> = plan
            .mutations
            .iter()
            .map(|m| &m.mutations[0].patch.target)
            .collect();
        assert_eq!(
            ids,
            vec![
                &PatchTarget::Id {
                    id: "abc".to_string()
                },
                &PatchTarget::Id {
                    id: "drafts.abc".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_blank_slug_reported_by_name() {
        let mut blank = row("");
        blank.name = Some("Unnamed Place".to_string());
        let plan = build_copy_patches(&[blank], &SlugIndex::default());
        assert_eq!(plan.missing, vec!["Unnamed Place".to_string()]);
        assert!(plan.mutations.is_empty());
    }

    #[test]
    fn test_copy_set_fields() {
        let set = copy_set(&row("old-village"));

        assert_eq!(set.summary.as_deref(), Some("Tree-lined streets near the harbor."));
        assert_eq!(set.overview.as_ref().unwrap().len(), 2);
        assert!(set.lifestyle.is_none());
        assert_eq!(set.highlights, vec!["Waterfront", "Walkable"]);
        assert!(set.amenities.is_empty());
        assert_eq!(set.faqs.len(), 2);
        assert_eq!(set.faqs[1].question, "When?");
        assert_eq!(set.faqs[1].answer, "Now.");
        assert!(set.best_for.is_none());

        let value = serde_json::to_value(&set).unwrap();
        assert!(value["bestFor"].is_null());
        assert!(value["sellerInsights"].is_null());
        assert_eq!(value["faqs"][0]["_type"], "faqItem");
        assert_eq!(value["overview"][1]["children"][0]["text"], "Para two.");
    }

    #[test]
    fn test_missing_summary_truncates() {
        assert!(missing_summary(&[]).is_none());

        let missing: Vec<String> = (0..25).map(|i| format!("slug-{}", i)).collect();
        let line = missing_summary(&missing).unwrap();
        assert!(line.starts_with("Missing slugs: [\"slug-0\""));
        assert!(line.contains("\"slug-19\""));
        assert!(!line.contains("\"slug-20\""));
        assert!(line.ends_with("... total 25"));
    }

    #[test]
    fn test_report_lines_summary_first() {
        let report = RunReport {
            written: 2,
            noun: "patches",
            output_path: Some("patches.ndjson".to_string()),
            skipped: vec!["ghost-town".to_string()],
            failed: Vec::new(),
        };
        assert_eq!(
            report_lines(&report),
            vec![
                "Wrote 2 patches to patches.ndjson".to_string(),
                "Missing slugs: [\"ghost-town\"] ... total 1".to_string(),
            ]
        );

        let clean = RunReport {
            skipped: Vec::new(),
            ..report
        };
        assert_eq!(report_lines(&clean).len(), 1);
    }

    #[test]
    fn test_queries() {
        assert_eq!(
            published_query("neighborhood"),
            "*[_type == \"neighborhood\" && !(_id match \"drafts.*\")]{_id, \"slug\": slug.current}"
        );
        assert_eq!(
            drafts_query("neighborhood"),
            "*[_type == \"neighborhood\" && _id match \"drafts.*\"]{_id, \"slug\": slug.current}"
        );
    }
}
