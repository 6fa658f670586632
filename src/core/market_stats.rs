//! Joins the Realtor.com current-month core metrics with the hotness history on
//! `(zip, month)` and emits one `marketStatMonthly` document per core row.

use crate::core::records::{decode_csv_where, encode_ndjson};
use crate::core::text::{month_from_yyyymm, to_num};
use crate::core::{Pipeline, Storage};
use crate::domain::model::{
    CoreMetricsRow, HotnessMetrics, HotnessRow, MarketStatMonthly, RunReport,
    MARKET_STAT_NOTES, MARKET_STAT_SOURCE_LABEL, MARKET_STAT_SOURCE_URL, MARKET_STAT_TYPE,
};
use crate::utils::error::Result;
use std::collections::{BTreeSet, HashMap};

pub type HotnessIndex = HashMap<(String, String), HotnessMetrics>;

fn in_zip_set(postal_code: Option<&str>, zips: &BTreeSet<String>) -> bool {
    postal_code.is_some_and(|zip| zips.contains(zip))
}

/// `(zip, month)` for a row that passes the ZIP filter and has a usable month.
fn join_key(
    postal_code: Option<&str>,
    month_raw: Option<&str>,
    zips: &BTreeSet<String>,
) -> Option<(String, String)> {
    if !in_zip_set(postal_code, zips) {
        return None;
    }
    let zip = postal_code?;
    let month = month_from_yyyymm(month_raw.unwrap_or(""))?;
    Some((zip.to_string(), month))
}

pub fn build_hotness_index(rows: &[HotnessRow], zips: &BTreeSet<String>) -> HotnessIndex {
    rows.iter()
        .filter_map(|row| {
            let key = join_key(
                row.postal_code.as_deref(),
                row.month_date_yyyymm.as_deref(),
                zips,
            )?;
            let metrics = HotnessMetrics {
                score: to_num(row.hotness_score.as_deref()),
                rank: to_num(row.hotness_rank.as_deref()),
            };
            Some((key, metrics))
        })
        .collect()
}

pub fn build_document(
    row: &CoreMetricsRow,
    zip: String,
    month: String,
    hot: HotnessMetrics,
) -> MarketStatMonthly {
    MarketStatMonthly {
        doc_type: MARKET_STAT_TYPE,
        zip,
        month,
        median_listing_price: to_num(row.median_listing_price.as_deref()),
        median_listing_price_yoy: to_num(row.median_listing_price_yy.as_deref()),
        median_listing_price_mom: to_num(row.median_listing_price_mm.as_deref()),
        price_per_sqft: to_num(row.median_listing_price_per_square_foot.as_deref()),
        active_listing_count: to_num(row.active_listing_count.as_deref()),
        active_listing_count_yoy: to_num(row.active_listing_count_yy.as_deref()),
        pending_listing_count: to_num(row.pending_listing_count.as_deref()),
        median_days_on_market: to_num(row.median_days_on_market.as_deref()),
        inventory_months: None,
        market_hotness_score: hot.score,
        market_hotness_rank: hot.rank,
        source_label: MARKET_STAT_SOURCE_LABEL,
        source_url: MARKET_STAT_SOURCE_URL,
        notes: MARKET_STAT_NOTES,
    }
}

/// One document per core row in the ZIP set with a valid month. A missing
/// hotness entry leaves the hotness fields null; it never drops the row.
pub fn build_documents(
    core: &[CoreMetricsRow],
    hotness: &HotnessIndex,
    zips: &BTreeSet<String>,
) -> Vec<MarketStatMonthly> {
    core.iter()
        .filter_map(|row| {
            let key = join_key(
                row.postal_code.as_deref(),
                row.month_date_yyyymm.as_deref(),
                zips,
            )?;
            let hot = hotness.get(&key).copied().unwrap_or_default();
            let (zip, month) = key;
            Some(build_document(row, zip, month, hot))
        })
        .collect()
}

pub struct MarketStatsInput {
    pub core: Vec<CoreMetricsRow>,
    pub hotness: Vec<HotnessRow>,
    pub skipped_rows: Vec<String>,
}

pub struct MarketStatsOutput {
    pub documents: Vec<MarketStatMonthly>,
    pub skipped_rows: Vec<String>,
}

pub struct MarketStatsPipeline<S: Storage> {
    storage: S,
    core_path: String,
    hotness_path: String,
    zips: BTreeSet<String>,
    output_path: String,
}

impl<S: Storage> MarketStatsPipeline<S> {
    pub fn new(
        storage: S,
        core_path: impl Into<String>,
        hotness_path: impl Into<String>,
        zips: BTreeSet<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            core_path: core_path.into(),
            hotness_path: hotness_path.into(),
            zips,
            output_path: output_path.into(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for MarketStatsPipeline<S> {
    type Extracted = MarketStatsInput;
    type Transformed = MarketStatsOutput;
    type Report = RunReport;

    async fn extract(&self) -> Result<MarketStatsInput> {
        // The hotness file is the full history; only ZIPs of interest are kept.
        let hotness_bytes = self.storage.read_file(&self.hotness_path).await?;
        let hotness = decode_csv_where(&hotness_bytes, &self.hotness_path, |row: &HotnessRow| {
            in_zip_set(row.postal_code.as_deref(), &self.zips)
        })?;
        drop(hotness_bytes);

        let core_bytes = self.storage.read_file(&self.core_path).await?;
        let core = decode_csv_where(&core_bytes, &self.core_path, |row: &CoreMetricsRow| {
            in_zip_set(row.postal_code.as_deref(), &self.zips)
        })?;

        tracing::info!(
            "Kept {} core rows and {} hotness rows for {} ZIPs",
            core.rows.len(),
            hotness.rows.len(),
            self.zips.len()
        );

        let mut skipped_rows = hotness.skipped;
        skipped_rows.extend(core.skipped);

        Ok(MarketStatsInput {
            core: core.rows,
            hotness: hotness.rows,
            skipped_rows,
        })
    }

    async fn transform(&self, data: MarketStatsInput) -> Result<MarketStatsOutput> {
        let index = build_hotness_index(&data.hotness, &self.zips);
        tracing::debug!("Hotness index holds {} (zip, month) keys", index.len());

        let documents = build_documents(&data.core, &index, &self.zips);
        Ok(MarketStatsOutput {
            documents,
            skipped_rows: data.skipped_rows,
        })
    }

    async fn load(&self, result: MarketStatsOutput) -> Result<RunReport> {
        let data = encode_ndjson(&result.documents)?;
        self.storage.write_file(&self.output_path, &data).await?;

        Ok(RunReport {
            written: result.documents.len(),
            noun: "documents",
            output_path: Some(self.output_path.clone()),
            skipped: result.skipped_rows,
            failed: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zips(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|z| z.to_string()).collect()
    }

    fn core_row(zip: &str, month: &str, price: &str) -> CoreMetricsRow {
        CoreMetricsRow {
            postal_code: Some(zip.to_string()),
            month_date_yyyymm: Some(month.to_string()),
            median_listing_price: Some(price.to_string()),
            ..Default::default()
        }
    }

    fn hot_row(zip: &str, month: &str, score: &str, rank: &str) -> HotnessRow {
        HotnessRow {
            postal_code: Some(zip.to_string()),
            month_date_yyyymm: Some(month.to_string()),
            hotness_score: Some(score.to_string()),
            hotness_rank: Some(rank.to_string()),
        }
    }

    #[test]
    fn test_join_fills_hotness_fields() {
        let wanted = zips(&["29401"]);
        let index = build_hotness_index(&[hot_row("29401", "202401", "88.5", "412")], &wanted);
        let docs = build_documents(&[core_row("29401", "202401", "350000")], &index, &wanted);

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].month, "2024-01");
        assert_eq!(docs[0].median_listing_price, Some(350000.0));
        assert_eq!(docs[0].market_hotness_score, Some(88.5));
        assert_eq!(docs[0].market_hotness_rank, Some(412.0));
    }

    #[test]
    fn test_missing_hotness_key_keeps_row() {
        let wanted = zips(&["29401"]);
        let index = build_hotness_index(&[hot_row("29401", "202312", "70", "9")], &wanted);
        let docs = build_documents(&[core_row("29401", "202401", "")], &index, &wanted);

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].market_hotness_score, None);
        assert_eq!(docs[0].market_hotness_rank, None);
        assert_eq!(docs[0].median_listing_price, None);
    }

    #[test]
    fn test_filters_zip_and_short_month() {
        let wanted = zips(&["29401"]);
        let core = vec![
            core_row("29401", "202401", "1"),
            core_row("29464", "202401", "2"),
            core_row("29401", "20", "3"),
            CoreMetricsRow::default(),
        ];
        let docs = build_documents(&core, &HotnessIndex::new(), &wanted);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].median_listing_price, Some(1.0));
    }

    #[test]
    fn test_unparseable_numbers_are_null() {
        let wanted = zips(&["29401"]);
        let core = [core_row("29401", "202401", "abc")];
        let docs = build_documents(&core, &HotnessIndex::new(), &wanted);
        let value = serde_json::to_value(&docs[0]).unwrap();

        assert!(value["medianListingPrice"].is_null());
        assert!(value["inventoryMonths"].is_null());
        assert_eq!(value["_type"], "marketStatMonthly");
        assert_eq!(value["sourceLabel"], "Realtor.com® Economic Research");
    }

    #[test]
    fn test_hotness_index_ignores_other_zips() {
        let index = build_hotness_index(
            &[hot_row("29401", "202401", "1", "1"), hot_row("10001", "202401", "2", "2")],
            &zips(&["29401"]),
        );
        assert_eq!(index.len(), 1);
        assert!(index.contains_key(&("29401".to_string(), "2024-01".to_string())));
    }

    #[tokio::test]
    async fn test_extract_keeps_only_requested_zips() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("hot.csv"),
            "postal_code,month_date_yyyymm,hotness_score,hotness_rank\n\
             10001,202401,1,1\n29401,202401,88.5,412\n29401,202312,80,500\n90210,202401,2,2\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("core.csv"),
            "postal_code,month_date_yyyymm,median_listing_price\n\
             10001,202401,1\n29401,202401,350000\n",
        )
        .unwrap();

        let pipeline = MarketStatsPipeline::new(
            crate::adapters::storage::LocalStorage::new(dir.path()),
            "core.csv",
            "hot.csv",
            zips(&["29401"]),
            "out.ndjson",
        );
        let input = pipeline.extract().await.unwrap();

        assert_eq!(input.hotness.len(), 2);
        assert!(input
            .hotness
            .iter()
            .all(|row| row.postal_code.as_deref() == Some("29401")));
        assert_eq!(input.core.len(), 1);
        assert!(input.skipped_rows.is_empty());
    }
}
