use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::AuthError;
use crate::config::SupabaseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Twitter,
}

impl OAuthProvider {
    pub fn parse(value: &str) -> Result<Self, AuthError> {
        match value {
            "google" => Ok(OAuthProvider::Google),
            "twitter" => Ok(OAuthProvider::Twitter),
            other => Err(AuthError::UnsupportedProvider(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Twitter => "twitter",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthUserInfo {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: Value,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUserInfo {
    pub fn provider(&self) -> Option<&str> {
        self.app_metadata["provider"].as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: String,
    pub user: AuthUserInfo,
}

/// Thin client for the GoTrue REST API
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(project_url: &str, anon_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: format!("{}/auth/v1", project_url.trim_end_matches('/')),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_config(config: &SupabaseConfig) -> Self {
        Self::new(&config.url, config.anon_key.clone())
    }

    fn ensure_configured(&self) -> Result<(), AuthError> {
        if self.base_url.starts_with("/auth") {
            return Err(AuthError::NotConfigured("SUPABASE_URL"));
        }
        if self.anon_key.is_empty() {
            return Err(AuthError::NotConfigured("SUPABASE_ANON_KEY"));
        }
        Ok(())
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.anon_key)
    }

    async fn expect_success(response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body: Value = response.json().await.unwrap_or(Value::Null);
        Err(AuthError::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<Session, AuthError> {
        self.ensure_configured()?;
        let response = self
            .request(self.client.post(format!("{}/token", self.base_url)))
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;
        Ok(Self::expect_success(response).await?.json::<Session>().await?)
    }

    /// Register a user. The confirmation link comes back to `redirect_to`
    /// with a PKCE code. Returns the new user's id when the platform reveals it.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<Option<Uuid>, AuthError> {
        self.ensure_configured()?;
        let response = self
            .request(self.client.post(format!("{}/signup", self.base_url)))
            .query(&[("redirect_to", redirect_to)])
            .json(&signup_body(email, password, code_challenge))
            .send()
            .await?;
        let body: Value = Self::expect_success(response).await?.json().await?;
        Ok(signed_up_user_id(&body))
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    pub async fn exchange_code_for_session(&self, code: &str, code_verifier: &str) -> Result<Session, AuthError> {
        self.token_grant("pkce", json!({ "auth_code": code, "code_verifier": code_verifier }))
            .await
    }

    /// Send a password recovery email whose link carries a PKCE code
    pub async fn recover(&self, email: &str, redirect_to: &str, code_challenge: &str) -> Result<(), AuthError> {
        self.ensure_configured()?;
        let response = self
            .request(self.client.post(format!("{}/recover", self.base_url)))
            .query(&[("redirect_to", redirect_to)])
            .json(&recover_body(email, code_challenge))
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// URL the browser is sent to for an OAuth sign-in with PKCE
    pub fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, AuthError> {
        self.ensure_configured()?;
        let mut url = Url::parse(&format!("{}/authorize", self.base_url))
            .map_err(|_| AuthError::NotConfigured("SUPABASE_URL"))?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", CODE_CHALLENGE_METHOD);
        Ok(url.into())
    }

    pub async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError> {
        self.ensure_configured()?;
        let response = self
            .request(self.client.put(format!("{}/user", self.base_url)))
            .bearer_auth(access_token)
            .json(&json!({ "password": password }))
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.ensure_configured()?;
        let response = self
            .request(self.client.post(format!("{}/logout", self.base_url)))
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }
}

/// PKCE method name as GoTrue spells it
const CODE_CHALLENGE_METHOD: &str = "s256";

fn signup_body(email: &str, password: &str, code_challenge: &str) -> Value {
    json!({
        "email": email,
        "password": password,
        "code_challenge": code_challenge,
        "code_challenge_method": CODE_CHALLENGE_METHOD,
    })
}

fn recover_body(email: &str, code_challenge: &str) -> Value {
    json!({
        "email": email,
        "code_challenge": code_challenge,
        "code_challenge_method": CODE_CHALLENGE_METHOD,
    })
}

/// GoTrue returns the user at the top level when confirmation is pending,
/// or nested under `user` when a session is issued immediately.
fn signed_up_user_id(body: &Value) -> Option<Uuid> {
    body["id"]
        .as_str()
        .or_else(|| body["user"]["id"].as_str())
        .and_then(|id| Uuid::parse_str(id).ok())
}

fn error_message(body: &Value) -> String {
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body[*key].as_str())
        .unwrap_or("Authentication request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(String, Value)>>>;

    /// Local stand-in for GoTrue that records each JSON body it receives
    async fn recording_auth_server() -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let store = captured.clone();
        let app = axum::Router::new().route(
            "/auth/v1/:endpoint",
            axum::routing::post(
                move |axum::extract::Path(endpoint): axum::extract::Path<String>,
                      axum::Json(body): axum::Json<Value>| {
                    let store = store.clone();
                    async move {
                        store.lock().unwrap().push((endpoint, body));
                        axum::Json(json!({ "id": "6c0f3a8e-3c4b-4a44-9f0e-2f6b7f1d8a01" }))
                    }
                },
            ),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), captured)
    }

    #[tokio::test]
    async fn sign_up_sends_pkce_challenge() {
        let (base, captured) = recording_auth_server().await;
        let client = AuthClient::new(&base, "anon");

        let user_id = client
            .sign_up("a@example.com", "pw123456", "http://localhost:3000/auth/callback", "chal-1")
            .await
            .unwrap();
        assert!(user_id.is_some());

        let bodies = captured.lock().unwrap();
        let (endpoint, body) = &bodies[0];
        assert_eq!(endpoint, "signup");
        assert_eq!(body["email"], "a@example.com");
        assert_eq!(body["code_challenge"], "chal-1");
        assert_eq!(body["code_challenge_method"], "s256");
    }

    #[tokio::test]
    async fn recover_sends_pkce_challenge() {
        let (base, captured) = recording_auth_server().await;
        let client = AuthClient::new(&base, "anon");

        client
            .recover("a@example.com", "http://localhost:3000/auth/callback", "chal-2")
            .await
            .unwrap();

        let bodies = captured.lock().unwrap();
        let (endpoint, body) = &bodies[0];
        assert_eq!(endpoint, "recover");
        assert_eq!(body["code_challenge"], "chal-2");
        assert_eq!(body["code_challenge_method"], "s256");
        assert!(body.get("password").is_none());
    }

    #[test]
    fn providers() {
        assert_eq!(OAuthProvider::parse("google").unwrap(), OAuthProvider::Google);
        assert_eq!(OAuthProvider::parse("twitter").unwrap().as_str(), "twitter");
        assert!(matches!(
            OAuthProvider::parse("github"),
            Err(AuthError::UnsupportedProvider(p)) if p == "github"
        ));
    }

    #[test]
    fn authorize_url_carries_pkce_challenge() {
        let client = AuthClient::new("https://abc.supabase.co/", "anon");
        let url = client
            .authorize_url(OAuthProvider::Google, "http://localhost:3000/auth/callback", "chal")
            .unwrap();
        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/auth/v1/authorize");
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("provider".into(), "google".into())));
        assert!(pairs.contains(&("code_challenge".into(), "chal".into())));
        assert!(pairs.contains(&("code_challenge_method".into(), "s256".into())));
        assert!(pairs.contains(&("redirect_to".into(), "http://localhost:3000/auth/callback".into())));
    }

    #[test]
    fn unconfigured_client_is_reported() {
        let client = AuthClient::new("", "");
        assert!(matches!(
            client.authorize_url(OAuthProvider::Twitter, "/", "c"),
            Err(AuthError::NotConfigured("SUPABASE_URL"))
        ));
    }

    #[test]
    fn sign_up_user_id_shapes() {
        let id = Uuid::new_v4();
        assert_eq!(signed_up_user_id(&json!({ "id": id.to_string() })), Some(id));
        assert_eq!(signed_up_user_id(&json!({ "user": { "id": id.to_string() } })), Some(id));
        assert_eq!(signed_up_user_id(&json!({})), None);
    }

    #[test]
    fn error_message_prefers_description() {
        let body = json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" });
        assert_eq!(error_message(&body), "Invalid login credentials");
        assert_eq!(error_message(&json!({ "msg": "User already registered" })), "User already registered");
        assert_eq!(error_message(&Value::Null), "Authentication request failed");
    }
}
