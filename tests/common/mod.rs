#![allow(dead_code)]

pub mod mock_auth;

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();
static PRODUCTION_SERVER: OnceLock<TestServer> = OnceLock::new();

/// Webhook secret the spawned server is started with
pub const STRIPE_WEBHOOK_SECRET: &str = "whsec_integration_test";

/// Site URL the spawned server builds redirects from
pub const SITE_URL: &str = "http://localhost:3000";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(app_env: &str) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let auth = mock_auth::mock_auth();

        // Assumes the debug profile binary has been built by `cargo test`
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_qlink-api"));
        cmd.env("QLINK_API_PORT", port.to_string())
            .env("APP_ENV", app_env)
            .env("SITE_URL", SITE_URL)
            .env("STRIPE_WEBHOOK_SECRET", STRIPE_WEBHOOK_SECRET)
            .env("SUPABASE_JWT_SECRET", mock_auth::JWT_SECRET)
            .env("SUPABASE_URL", &auth.base_url)
            .env("SUPABASE_ANON_KEY", "anon-test-key")
            .env("PERSPECTIVE_API_KEY", "")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Ready once the health route answers, with or without a database
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Server running with development settings
pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn("development").expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// Server running with production settings
pub async fn ensure_production_server() -> Result<&'static TestServer> {
    let server =
        PRODUCTION_SERVER.get_or_init(|| TestServer::spawn("production").expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// Client that leaves redirects for the test to inspect
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build test client")
}

/// All `Set-Cookie` values on a response
pub fn set_cookies(res: &reqwest::Response) -> Vec<String> {
    res.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Value of the named cookie among `Set-Cookie` headers
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    cookies.iter().find_map(|cookie| {
        cookie
            .split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
            .filter(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    })
}
