use anyhow::Result;
use cms_etl::{EtlError, RevalidateClient};
use httpmock::prelude::*;
use serde_json::json;

#[tokio::test]
async fn test_revalidate_posts_secret_and_paths() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/revalidate")
                .json_body(json!({"secret": "s3cret", "paths": ["/", "/neighborhoods/old-village"]}));
            then.status(200)
                .json_body(json!({"revalidated": true, "paths": ["/", "/neighborhoods/old-village"]}));
        })
        .await;

    let client = RevalidateClient::new(&format!("{}/", server.base_url()))?;
    assert_eq!(client.endpoint(), server.url("/api/revalidate"));

    let paths = vec!["/".to_string(), "/neighborhoods/old-village".to_string()];
    let body = client.trigger("s3cret", &paths).await?;

    mock.assert_async().await;
    assert!(body.contains("\"revalidated\":true"));
    Ok(())
}

#[tokio::test]
async fn test_revalidate_rejected_secret() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/revalidate");
            then.status(401).json_body(json!({"message": "Invalid secret"}));
        })
        .await;

    let client = RevalidateClient::new(&server.base_url())?;
    let err = client
        .trigger("wrong", &["/".to_string()])
        .await
        .unwrap_err();

    match err {
        EtlError::HttpStatusError { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid secret"));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}
