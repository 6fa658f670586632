use anyhow::Result;
use cms_etl::core::market_stats::MarketStatsPipeline;
use cms_etl::{EtlEngine, EtlError, LocalStorage, ZipSource};
use serde_json::Value;
use tempfile::TempDir;

const CORE_CSV: &str = "\
month_date_yyyymm,postal_code,zip_name,median_listing_price,median_listing_price_mm,median_listing_price_yy,active_listing_count,active_listing_count_yy,median_days_on_market,pending_listing_count,median_listing_price_per_square_foot
202401,29401,\"charleston, sc\",350000,0.012,-0.05,120,0.1,45,30,412.5
202401,29464,\"mount pleasant, sc\",abc,,,80,,38,22,
202401,10001,\"new york, ny\",900000,,,300,,20,50,1200
";

const HOTNESS_CSV: &str = "\
month_date_yyyymm,postal_code,hotness_score,hotness_rank
202401,29401,88.5,412
202312,29464,70.1,900
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("core.csv"), CORE_CSV)?;
        std::fs::write(dir.path().join("hotness.csv"), HOTNESS_CSV)?;
        Ok(Self { dir })
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_str().unwrap().to_string()
    }

    fn read_lines(&self, name: &str) -> Result<Vec<Value>> {
        let text = std::fs::read_to_string(self.dir.path().join(name))?;
        let mut docs = Vec::new();
        for line in text.lines() {
            docs.push(serde_json::from_str::<Value>(line)?);
        }
        Ok(docs)
    }
}

#[tokio::test]
async fn test_single_zip_join_writes_one_document() -> Result<()> {
    let fx = Fixture::new()?;
    let storage = LocalStorage::default();
    let zips = ZipSource::Inline(vec!["29401".to_string()])
        .resolve(&storage)
        .await?;

    let out = fx.path("stats.ndjson");
    let pipeline = MarketStatsPipeline::new(
        storage,
        fx.path("core.csv"),
        fx.path("hotness.csv"),
        zips,
        out.clone(),
    );
    let report = EtlEngine::new(pipeline).run().await?;

    assert_eq!(report.written, 1);
    assert_eq!(report.summary(), format!("Wrote 1 documents to {}", out));

    let lines = fx.read_lines("stats.ndjson")?;
    assert_eq!(lines.len(), 1);
    let doc = &lines[0];
    assert_eq!(doc["_type"], "marketStatMonthly");
    assert_eq!(doc["zip"], "29401");
    assert_eq!(doc["month"], "2024-01");
    assert_eq!(doc["medianListingPrice"], 350000.0);
    assert_eq!(doc["pricePerSqft"], 412.5);
    assert_eq!(doc["marketHotnessScore"], 88.5);
    assert_eq!(doc["marketHotnessRank"], 412.0);
    assert!(doc["inventoryMonths"].is_null());
    assert_eq!(doc["sourceUrl"], "https://www.realtor.com/research/data/");

    let raw = std::fs::read_to_string(&out)?;
    assert!(raw.contains("\"medianListingPrice\":350000.0"));
    assert!(raw.contains("\"medianListingPriceMoM\":0.012"));
    assert!(raw.contains("\"medianListingPriceYoY\":-0.05"));
    assert!(raw.contains("Realtor.com®"));
    Ok(())
}

#[tokio::test]
async fn test_zip_file_and_unmatched_hotness() -> Result<()> {
    let fx = Fixture::new()?;
    std::fs::write(fx.dir.path().join("zips.txt"), "29464\n29401\n\n")?;

    let storage = LocalStorage::default();
    let zips = ZipSource::File(fx.path("zips.txt")).resolve(&storage).await?;

    let pipeline = MarketStatsPipeline::new(
        storage,
        fx.path("core.csv"),
        fx.path("hotness.csv"),
        zips,
        fx.path("stats.ndjson"),
    );
    let report = EtlEngine::new(pipeline).run().await?;
    assert_eq!(report.written, 2);

    let lines = fx.read_lines("stats.ndjson")?;
    let mount_pleasant = lines
        .iter()
        .find(|d| d["zip"] == "29464")
        .expect("29464 document");
    assert!(mount_pleasant["medianListingPrice"].is_null());
    assert!(mount_pleasant["marketHotnessScore"].is_null());
    assert!(mount_pleasant["marketHotnessRank"].is_null());
    assert_eq!(mount_pleasant["activeListingCount"], 80.0);
    Ok(())
}

#[tokio::test]
async fn test_short_month_rows_are_dropped() -> Result<()> {
    let fx = Fixture::new()?;
    std::fs::write(
        fx.dir.path().join("core.csv"),
        "month_date_yyyymm,postal_code,median_listing_price\n20,29401,1\n202402,29401,2\n",
    )?;

    let zips = ["29401".to_string()].into_iter().collect();
    let pipeline = MarketStatsPipeline::new(
        LocalStorage::default(),
        fx.path("core.csv"),
        fx.path("hotness.csv"),
        zips,
        fx.path("stats.ndjson"),
    );
    let report = EtlEngine::new(pipeline).run().await?;

    assert_eq!(report.written, 1);
    let lines = fx.read_lines("stats.ndjson")?;
    assert_eq!(lines[0]["month"], "2024-02");
    assert_eq!(lines[0]["medianListingPrice"], 2.0);
    Ok(())
}

#[tokio::test]
async fn test_missing_input_is_not_found() -> Result<()> {
    let fx = Fixture::new()?;
    let pipeline = MarketStatsPipeline::new(
        LocalStorage::default(),
        fx.path("missing.csv"),
        fx.path("hotness.csv"),
        ["29401".to_string()].into_iter().collect(),
        fx.path("stats.ndjson"),
    );

    let err = EtlEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, EtlError::FileNotFoundError { .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(!fx.dir.path().join("stats.ndjson").exists());
    Ok(())
}
