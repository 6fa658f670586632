use crate::adapters::http::{build_client, ensure_success};
use crate::config::MapboxSettings;
use crate::domain::model::{Coordinates, GeocodeHit};
use crate::utils::error::Result;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// A forward-geocoding request.
#[derive(Debug, Clone, Default)]
pub struct GeocodeQuery<'a> {
    pub text: &'a str,
    pub types: &'a [&'a str],
    pub bbox: Option<&'a str>,
    pub proximity: Option<&'a str>,
    pub country: Option<&'a str>,
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    center: Option<Vec<f64>>,
    place_name: Option<String>,
}

pub struct MapboxClient {
    client: Client,
    base_url: String,
    token: String,
}

impl MapboxClient {
    pub fn new(settings: &MapboxSettings, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(settings.timeout())?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// `{base}/geocoding/v5/mapbox.places/{text}.json?...`, text path-encoded.
    pub fn forward_url(&self, query: &GeocodeQuery<'_>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places"])
            .push(&format!("{}.json", query.text));

        {
            let mut pairs = url.query_pairs_mut();
            if !query.types.is_empty() {
                pairs.append_pair("types", &query.types.join(","));
            }
            pairs.append_pair("limit", &query.limit.max(1).to_string());
            if let Some(bbox) = query.bbox {
                pairs.append_pair("bbox", bbox);
            }
            if let Some(proximity) = query.proximity {
                pairs.append_pair("proximity", proximity);
            }
            if let Some(country) = query.country {
                pairs.append_pair("country", country);
            }
            pairs.append_pair("access_token", &self.token);
        }
        Ok(url)
    }

    /// First feature's center, or `None` when Mapbox has nothing usable.
    pub async fn forward(&self, query: &GeocodeQuery<'_>) -> Result<Option<GeocodeHit>> {
        let url = self.forward_url(query)?;
        let endpoint = format!("Mapbox geocode \"{}\"", query.text);
        tracing::debug!("Requesting {}", endpoint);

        // The URL carries the access token; keep it out of error messages.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let response = ensure_success(response, &endpoint).await?;
        let collection: FeatureCollection = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        Ok(first_hit(collection))
    }
}

fn first_hit(collection: FeatureCollection) -> Option<GeocodeHit> {
    let feature = collection.features.into_iter().next()?;
    match feature.center.as_deref() {
        Some(&[lng, lat]) => Some(GeocodeHit {
            coordinates: Coordinates { lng, lat },
            label: feature.place_name,
        }),
        _ => None,
    }
}
