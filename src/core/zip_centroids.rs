use crate::adapters::mapbox::{GeocodeQuery, MapboxClient};
use crate::config::{MapboxSettings, ZipSource};
use crate::core::{Pipeline, Storage};
use crate::domain::model::{Coordinates, RunReport};
use crate::utils::error::Result;
use std::collections::{BTreeMap, BTreeSet};

pub type CentroidMap = BTreeMap<String, Coordinates>;

pub struct CentroidPlan {
    pub centroids: CentroidMap,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

pub struct ZipCentroidsPipeline<S: Storage> {
    storage: S,
    geocoder: MapboxClient,
    country: String,
    source: ZipSource,
    output_path: String,
}

impl<S: Storage> ZipCentroidsPipeline<S> {
    pub fn new(
        storage: S,
        geocoder: MapboxClient,
        settings: &MapboxSettings,
        source: ZipSource,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            geocoder,
            country: settings.country.clone(),
            source,
            output_path: output_path.into(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for ZipCentroidsPipeline<S> {
    type Extracted = BTreeSet<String>;
    type Transformed = CentroidPlan;
    type Report = RunReport;

    async fn extract(&self) -> Result<BTreeSet<String>> {
        self.source.resolve(&self.storage).await
    }

    async fn transform(&self, zips: BTreeSet<String>) -> Result<CentroidPlan> {
        let mut plan = CentroidPlan {
            centroids: CentroidMap::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        };

        for zip in zips {
            let query = GeocodeQuery {
                text: &zip,
                types: &["postcode"],
                country: Some(&self.country),
                limit: 1,
                ..Default::default()
            };

            let result = self.geocoder.forward(&query).await;
            match result {
                Ok(Some(hit)) => {
                    println!("{}: {}, {}", zip, hit.coordinates.lat, hit.coordinates.lng);
                    plan.centroids.insert(zip, hit.coordinates);
                }
                Ok(None) => {
                    eprintln!("{}: no result", zip);
                    plan.skipped.push(zip);
                }
                Err(e) => {
                    tracing::warn!("Geocoding ZIP {} failed: {}", zip, e);
                    eprintln!("{}: error {}", zip, e);
                    plan.failed.push(zip);
                }
            }
        }

        Ok(plan)
    }

    async fn load(&self, plan: CentroidPlan) -> Result<RunReport> {
        let data = serde_json::to_vec_pretty(&plan.centroids)?;
        self.storage.write_file(&self.output_path, &data).await?;

        Ok(RunReport {
            written: plan.centroids.len(),
            noun: "ZIP centroids",
            output_path: Some(self.output_path.clone()),
            skipped: plan.skipped,
            failed: plan.failed,
        })
    }
}
