use crate::adapters::mapbox::{GeocodeQuery, MapboxClient};
use crate::config::MapboxSettings;
use crate::core::records::{decode_ndjson, encode_ndjson};
use crate::core::{Pipeline, Storage};
use crate::domain::model::{
    GeocodeHit, MapCenter, MapCenterSet, NeighborhoodRecord, Patch, PatchDocument, PatchTarget,
    RunReport,
};
use crate::utils::error::Result;
use std::collections::BTreeMap;

pub const NEIGHBORHOOD_TYPES: &[&str] = &["neighborhood", "place", "locality"];
pub const SLUG_QUERY: &str = "*[_type==\"neighborhood\" && slug.current==$slug]";

/// Municipalities that Mapbox only knows as parts of the City of Charleston.
const CHARLESTON_AREAS: &[&str] = &[
    "Charleston Peninsula",
    "West Ashley",
    "James Island",
    "Johns Island",
];

pub fn map_city(municipality: &str) -> String {
    if CHARLESTON_AREAS.contains(&municipality) {
        "Charleston, SC".to_string()
    } else {
        format!("{}, SC", municipality)
    }
}

pub fn geocode_text(name: &str, municipality: &str) -> String {
    format!("{}, {}", name, map_city(municipality))
}

pub fn center_patch(slug: &str, hit: &GeocodeHit) -> PatchDocument<MapCenterSet> {
    let mut params = BTreeMap::new();
    params.insert("slug".to_string(), slug.to_string());

    PatchDocument::new(Patch {
        target: PatchTarget::Query {
            query: SLUG_QUERY.to_string(),
            params,
        },
        set: MapCenterSet {
            map: MapCenter {
                center_lat: hit.coordinates.lat,
                center_lng: hit.coordinates.lng,
            },
        },
    })
}

pub struct CenterPlan {
    pub patches: Vec<PatchDocument<MapCenterSet>>,
    /// Hits printed but not turned into patches (dry run).
    pub previewed: usize,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

pub struct NeighborhoodCentersPipeline<S: Storage> {
    storage: S,
    geocoder: MapboxClient,
    settings: MapboxSettings,
    input_path: String,
    output_path: String,
    dry_run: bool,
}

impl<S: Storage> NeighborhoodCentersPipeline<S> {
    pub fn new(
        storage: S,
        geocoder: MapboxClient,
        settings: MapboxSettings,
        input_path: impl Into<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            geocoder,
            settings,
            input_path: input_path.into(),
            output_path: output_path.into(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn query<'a>(&'a self, text: &'a str) -> GeocodeQuery<'a> {
        GeocodeQuery {
            text,
            types: NEIGHBORHOOD_TYPES,
            bbox: Some(&self.settings.bbox),
            proximity: Some(&self.settings.proximity),
            country: Some(&self.settings.country),
            limit: 1,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for NeighborhoodCentersPipeline<S> {
    type Extracted = Vec<NeighborhoodRecord>;
    type Transformed = CenterPlan;
    type Report = RunReport;

    async fn extract(&self) -> Result<Vec<NeighborhoodRecord>> {
        let data = self.storage.read_file(&self.input_path).await?;
        let rows: Vec<NeighborhoodRecord> = decode_ndjson(&data, &self.input_path)?;
        tracing::info!("Read {} neighborhoods from {}", rows.len(), self.input_path);
        Ok(rows)
    }

    async fn transform(&self, rows: Vec<NeighborhoodRecord>) -> Result<CenterPlan> {
        let mut plan = CenterPlan {
            patches: Vec::new(),
            previewed: 0,
            skipped: Vec::new(),
            failed: Vec::new(),
        };

        for row in &rows {
            let (Some(name), Some(muni), Some(slug)) = (
                row.name.as_deref().filter(|n| !n.is_empty()),
                row.municipality.as_deref().filter(|m| !m.is_empty()),
                row.slug(),
            ) else {
                tracing::debug!("Skipping incomplete neighborhood row: {:?}", row);
                plan.skipped.push(row.name.clone().unwrap_or_default());
                continue;
            };

            let text = geocode_text(name, muni);
            let result = self.geocoder.forward(&self.query(&text)).await;
            let hit = match result {
                Ok(Some(hit)) => hit,
                Ok(None) => {
                    println!("No result: {} ({})", name, muni);
                    plan.skipped.push(name.to_string());
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Geocoding {} failed: {}", name, e);
                    eprintln!("{}: error {}", name, e);
                    plan.failed.push(name.to_string());
                    continue;
                }
            };

            let (lat, lng) = (hit.coordinates.lat, hit.coordinates.lng);
            if self.dry_run {
                println!(
                    "{} -> {}, {} | {}",
                    name,
                    lat,
                    lng,
                    hit.label.as_deref().unwrap_or("")
                );
                plan.previewed += 1;
                continue;
            }

            plan.patches.push(center_patch(slug, &hit));
            println!("Prepared patch for {} -> {}, {}", name, lat, lng);
        }

        Ok(plan)
    }

    async fn load(&self, plan: CenterPlan) -> Result<RunReport> {
        if self.dry_run {
            return Ok(RunReport {
                written: plan.previewed,
                noun: "patches",
                output_path: None,
                skipped: plan.skipped,
                failed: plan.failed,
            });
        }

        let data = encode_ndjson(&plan.patches)?;
        self.storage.write_file(&self.output_path, &data).await?;

        Ok(RunReport {
            written: plan.patches.len(),
            noun: "patches",
            output_path: Some(self.output_path.clone()),
            skipped: plan.skipped,
            failed: plan.failed,
        })
    }
}
