mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn og_image_is_always_an_svg() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client().get(server.url("/api/og/zzzzzzzzzz")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("image/svg+xml")
    );

    let svg = res.text().await?;
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("width=\"1200\""));
    Ok(())
}

#[tokio::test]
async fn stripe_webhook_without_signature_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client()
        .post(server.url("/api/stripe/webhook"))
        .body(r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{}}}"#)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn stripe_webhook_with_forged_signature_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();

    let res = common::client()
        .post(server.url("/api/stripe/webhook"))
        .header("stripe-signature", format!("t={},v1={}", now, "ab".repeat(32)))
        .body(r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{}}}"#)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["error"], "Invalid signature");
    Ok(())
}
