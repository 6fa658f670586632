use crate::adapters::http::{build_client, ensure_success};
use crate::utils::error::Result;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const REVALIDATE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct RevalidateRequest<'a> {
    secret: &'a str,
    paths: &'a [String],
}

/// Client for the site's `/api/revalidate` endpoint.
pub struct RevalidateClient {
    client: Client,
    endpoint: String,
}

impl RevalidateClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(REVALIDATE_TIMEOUT)?,
            endpoint: format!("{}/api/revalidate", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one request and returns the raw response body. Not retried.
    pub async fn trigger(&self, secret: &str, paths: &[String]) -> Result<String> {
        tracing::info!("Revalidating {} path(s) via {}", paths.len(), self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RevalidateRequest { secret, paths })
            .send()
            .await?;

        let response = ensure_success(response, &self.endpoint).await?;
        Ok(response.text().await?)
    }
}
