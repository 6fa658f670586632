use crate::utils::error::{EtlError, Result};
use reqwest::{Client, Response};
use std::time::Duration;

pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Passes 2xx responses through. Anything else becomes `HttpStatusError` with
/// the response body, which is also logged so the failure can be diagnosed.
///
/// `endpoint` is what gets reported; keep tokens out of it.
pub async fn ensure_success(response: Response, endpoint: &str) -> Result<Response> {
    let status = response.status();
    tracing::debug!("{} responded {}", endpoint, status);
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!("{} error body: {}", endpoint, body);
    Err(EtlError::HttpStatusError {
        status: status.as_u16(),
        endpoint: endpoint.to_string(),
        body,
    })
}
