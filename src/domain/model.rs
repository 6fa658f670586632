use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MARKET_STAT_TYPE: &str = "marketStatMonthly";
pub const MARKET_STAT_SOURCE_LABEL: &str = "Realtor.com® Economic Research";
pub const MARKET_STAT_SOURCE_URL: &str = "https://www.realtor.com/research/data/";
pub const MARKET_STAT_NOTES: &str = "Imported from current-month ZIP dataset";

/// Unique `_key` for array items: a v4 UUID as 32 lowercase hex chars.
pub fn new_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// One row of the current-month core metrics CSV. Absent columns read as `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreMetricsRow {
    pub postal_code: Option<String>,
    pub month_date_yyyymm: Option<String>,
    pub median_listing_price: Option<String>,
    pub median_listing_price_yy: Option<String>,
    pub median_listing_price_mm: Option<String>,
    pub median_listing_price_per_square_foot: Option<String>,
    pub active_listing_count: Option<String>,
    pub active_listing_count_yy: Option<String>,
    pub pending_listing_count: Option<String>,
    pub median_days_on_market: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotnessRow {
    pub postal_code: Option<String>,
    pub month_date_yyyymm: Option<String>,
    pub hotness_score: Option<String>,
    pub hotness_rank: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HotnessMetrics {
    pub score: Option<f64>,
    pub rank: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatMonthly {
    #[serde(rename = "_type")]
    pub doc_type: &'static str,
    pub zip: String,
    pub month: String,
    pub median_listing_price: Option<f64>,
    #[serde(rename = "medianListingPriceYoY")]
    pub median_listing_price_yoy: Option<f64>,
    #[serde(rename = "medianListingPriceMoM")]
    pub median_listing_price_mom: Option<f64>,
    pub price_per_sqft: Option<f64>,
    pub active_listing_count: Option<f64>,
    #[serde(rename = "activeListingCountYoY")]
    pub active_listing_count_yoy: Option<f64>,
    pub pending_listing_count: Option<f64>,
    pub median_days_on_market: Option<f64>,
    pub inventory_months: Option<f64>,
    pub market_hotness_score: Option<f64>,
    pub market_hotness_rank: Option<f64>,
    pub source_label: &'static str,
    pub source_url: &'static str,
    pub notes: &'static str,
}

/// Neighborhood row as exported from the CMS (`slug` is `{ "current": ... }`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NeighborhoodRecord {
    pub name: Option<String>,
    pub municipality: Option<String>,
    pub slug: Option<serde_json::Value>,
}

impl NeighborhoodRecord {
    pub fn slug(&self) -> Option<&str> {
        self.slug
            .as_ref()
            .and_then(|s| s.get("current"))
            .and_then(|c| c.as_str())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub coordinates: Coordinates,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    #[serde(rename = "_type")]
    pub span_type: &'static str,
    #[serde(rename = "_key")]
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    #[serde(rename = "_type")]
    pub block_type: &'static str,
    #[serde(rename = "_key")]
    pub key: String,
    pub style: &'static str,
    pub children: Vec<Span>,
}

impl Block {
    pub fn paragraph(text: &str) -> Self {
        Self {
            block_type: "block",
            key: new_key(),
            style: "normal",
            children: vec![Span {
                span_type: "span",
                key: new_key(),
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqItem {
    #[serde(rename = "_type")]
    pub item_type: &'static str,
    #[serde(rename = "_key")]
    pub key: String,
    pub question: String,
    pub answer: String,
}

impl FaqItem {
    pub fn new(question: String, answer: String) -> Self {
        Self {
            item_type: "faqItem",
            key: new_key(),
            question,
            answer,
        }
    }
}

/// Which document a patch applies to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PatchTarget {
    Query {
        query: String,
        params: BTreeMap<String, String>,
    },
    Id {
        id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patch<S> {
    #[serde(flatten)]
    pub target: PatchTarget,
    pub set: S,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mutation<S> {
    pub patch: Patch<S>,
}

/// A single patch written as one NDJSON line: `{"_type":"mutation","patch":{...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchDocument<S> {
    #[serde(rename = "_type")]
    pub doc_type: &'static str,
    pub patch: Patch<S>,
}

impl<S> PatchDocument<S> {
    pub fn new(patch: Patch<S>) -> Self {
        Self {
            doc_type: "mutation",
            patch,
        }
    }
}

/// A batch line: `{"_type":"mutation","mutations":[...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationBatch<S> {
    #[serde(rename = "_type")]
    pub doc_type: &'static str,
    pub mutations: Vec<Mutation<S>>,
}

impl<S> MutationBatch<S> {
    pub fn single(patch: Patch<S>) -> Self {
        Self {
            doc_type: "mutation",
            mutations: vec![Mutation { patch }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCenter {
    pub center_lat: f64,
    pub center_lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapCenterSet {
    pub map: MapCenter,
}

/// Long-form neighborhood copy as stored on the CMS document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodCopySet {
    pub summary: Option<String>,
    pub overview: Option<Vec<Block>>,
    pub lifestyle: Option<Vec<Block>>,
    pub buyer_insights: Option<Vec<Block>>,
    pub seller_insights: Option<Vec<Block>>,
    pub highlights: Vec<String>,
    pub amenities: Vec<String>,
    pub faqs: Vec<FaqItem>,
    pub best_for: Option<String>,
}

/// One row of the neighborhood copy sheet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRow {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub overview: Option<String>,
    pub lifestyle: Option<String>,
    pub buyer_insights: Option<String>,
    pub seller_insights: Option<String>,
    pub highlights: Option<String>,
    pub amenities: Option<String>,
    pub faqs: Option<String>,
    pub best_for: Option<String>,
}

impl CopyRow {
    pub fn trimmed_slug(&self) -> &str {
        self.slug.as_deref().unwrap_or("").trim()
    }
}

/// `{_id, "slug": slug.current}` projection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlugDoc {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub slug: Option<String>,
}

/// `{"slug": slug.current, summary, faqs[]{question, answer}}` projection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteCopy {
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub faqs: Option<Vec<serde_json::Value>>,
}

/// What a finished run did, as printed at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub written: usize,
    pub noun: &'static str,
    pub output_path: Option<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

impl RunReport {
    pub fn summary(&self) -> String {
        match &self.output_path {
            Some(path) => format!("Wrote {} {} to {}", self.written, self.noun, path),
            None => format!("Dry run: {} {} not written", self.written, self.noun),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())?;
        if !self.skipped.is_empty() {
            write!(f, " ({} skipped)", self.skipped.len())?;
        }
        if !self.failed.is_empty() {
            write!(f, " ({} failed)", self.failed.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_key_is_hex() {
        let key = new_key();
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(key, new_key());
    }

    #[test]
    fn test_query_patch_shape() {
        let mut params = BTreeMap::new();
        params.insert("slug".to_string(), "ansonborough".to_string());
        let doc = PatchDocument::new(Patch {
            target: PatchTarget::Query {
                query: "*[_type==\"neighborhood\" && slug.current==$slug]".to_string(),
                params,
            },
            set: MapCenterSet {
                map: MapCenter {
                    center_lat: 32.78,
                    center_lng: -79.93,
                },
            },
        });

        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "_type": "mutation",
                "patch": {
                    "query": "*[_type==\"neighborhood\" && slug.current==$slug]",
                    "params": {"slug": "ansonborough"},
                    "set": {"map": {"centerLat": 32.78, "centerLng": -79.93}}
                }
            })
        );
    }

    #[test]
    fn test_id_patch_batch_shape() {
        let batch = MutationBatch::single(Patch {
            target: PatchTarget::Id {
                id: "drafts.abc".to_string(),
            },
            set: json!({"summary": null}),
        });
        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({
                "_type": "mutation",
                "mutations": [{"patch": {"id": "drafts.abc", "set": {"summary": null}}}]
            })
        );
    }

    #[test]
    fn test_neighborhood_slug() {
        let record: NeighborhoodRecord = serde_json::from_value(json!({
            "name": "Ansonborough",
            "municipality": "Charleston Peninsula",
            "slug": {"_type": "slug", "current": "ansonborough"}
        }))
        .unwrap();
        assert_eq!(record.slug(), Some("ansonborough"));

        let flat: NeighborhoodRecord =
            serde_json::from_value(json!({"name": "X", "slug": "x"})).unwrap();
        assert_eq!(flat.slug(), None);
    }

    #[test]
    fn test_run_report_summary() {
        let report = RunReport {
            written: 1,
            noun: "documents",
            output_path: Some("out.ndjson".to_string()),
            ..Default::default()
        };
        assert_eq!(report.summary(), "Wrote 1 documents to out.ndjson");
    }
}
