use anyhow::Context;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

fn default_url() -> String {
    let port = std::env::var("QLINK_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    format!("http://localhost:{}", port)
}

pub async fn handle(url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = url.unwrap_or_else(default_url);
    let health_url = format!("{}/health", base.trim_end_matches('/'));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("building HTTP client")?;

    let started = Instant::now();
    let response = match client.get(&health_url).send().await {
        Ok(response) => response,
        Err(e) => {
            output_error(output_format, &format!("{} unreachable: {}", base, e), Some("UNREACHABLE"))?;
            anyhow::bail!("server unreachable");
        }
    };
    let elapsed_ms = started.elapsed().as_millis();
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let health = body["data"]["status"].as_str().unwrap_or("unknown").to_string();

    if status.is_success() {
        output_success(
            output_format,
            &format!("{} is {} ({} ms)", base, health, elapsed_ms),
            Some(json!({ "url": base, "status": health, "elapsed_ms": elapsed_ms })),
        )
    } else {
        output_error(
            output_format,
            &format!("{} responded {} ({})", base, status.as_u16(), health),
            Some("UNHEALTHY"),
        )?;
        anyhow::bail!("server unhealthy")
    }
}
