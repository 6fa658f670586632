use crate::adapters::http::{build_client, ensure_success};
use crate::config::SanitySettings;
use crate::utils::error::Result;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Which document state a query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    Published,
    Drafts,
}

impl Perspective {
    pub fn as_str(self) -> &'static str {
        match self {
            Perspective::Published => "published",
            Perspective::Drafts => "drafts",
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: Option<Vec<T>>,
}

#[derive(Debug, Serialize)]
struct QueryBody<'a, P: Serialize> {
    query: &'a str,
    params: &'a P,
}

/// Read-only client for the Sanity HTTP query API.
pub struct SanityClient {
    client: Client,
    query_url: String,
    token: String,
}

impl SanityClient {
    pub fn new(settings: &SanitySettings, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(settings.timeout())?,
            query_url: settings.query_url(),
            token: token.into(),
        })
    }

    /// GET query with an explicit perspective.
    pub async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        perspective: Perspective,
    ) -> Result<Vec<T>> {
        tracing::debug!("Sanity query ({}): {}", perspective.as_str(), groq);
        let response = self
            .client
            .get(&self.query_url)
            .bearer_auth(&self.token)
            .query(&[("query", groq), ("perspective", perspective.as_str())])
            .send()
            .await?;

        let response = ensure_success(response, "Sanity query").await?;
        let body: QueryResponse<T> = response.json().await?;
        Ok(body.result.unwrap_or_default())
    }

    /// POST query with `$params`, for parameter lists too long for a URL.
    pub async fn query_with_params<T, P>(
        &self,
        groq: &str,
        params: &P,
        perspective: Perspective,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        P: Serialize + Sync,
    {
        tracing::debug!("Sanity query (POST, {}): {}", perspective.as_str(), groq);
        let response = self
            .client
            .post(&self.query_url)
            .bearer_auth(&self.token)
            .query(&[("perspective", perspective.as_str())])
            .json(&QueryBody {
                query: groq,
                params,
            })
            .send()
            .await?;

        let response = ensure_success(response, "Sanity query").await?;
        let body: QueryResponse<T> = response.json().await?;
        Ok(body.result.unwrap_or_default())
    }
}
