//! In-process stand-in for the GoTrue REST API the server talks to.
//!
//! Runs on its own thread and runtime so it outlives the per-test runtimes.
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{mpsc, Arc, Mutex, OnceLock};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

/// JWT secret shared by the mock and the spawned server
pub const JWT_SECRET: &str = "integration-test-jwt-secret-0123456789abcdef";

/// Refresh token the mock accepts
pub const VALID_REFRESH_TOKEN: &str = "valid-refresh-token";

/// Refresh token the mock hands out with every new session
pub const ROTATED_REFRESH_TOKEN: &str = "rotated-refresh-token";

/// Auth codes with this prefix are accepted by the PKCE exchange
pub const GOOD_CODE_PREFIX: &str = "good-code-";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub endpoint: String,
    pub grant_type: Option<String>,
    pub body: Value,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

pub struct MockAuth {
    pub base_url: String,
    log: Log,
}

static MOCK: OnceLock<MockAuth> = OnceLock::new();

pub fn mock_auth() -> &'static MockAuth {
    MOCK.get_or_init(MockAuth::start)
}

impl MockAuth {
    fn start() -> Self {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/auth/v1/:endpoint", post(record))
            .with_state(log.clone());

        let (tx, rx) = mpsc::channel::<SocketAddr>();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("mock auth runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("mock auth bind");
                tx.send(listener.local_addr().expect("mock auth addr"))
                    .expect("mock auth addr send");
                axum::serve(listener, app).await.expect("mock auth serve");
            });
        });

        let addr = rx.recv().expect("mock auth did not start");
        Self {
            base_url: format!("http://{}", addr),
            log,
        }
    }

    /// First recorded call on `endpoint` whose body matches `pred`
    pub fn find(&self, endpoint: &str, pred: impl Fn(&Value) -> bool) -> Option<Recorded> {
        self.log
            .lock()
            .expect("mock auth log")
            .iter()
            .find(|r| r.endpoint == endpoint && pred(&r.body))
            .cloned()
    }
}

/// HS256 access token shaped like the ones GoTrue issues
pub fn access_token(user_id: Uuid, expires_in_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": user_id,
        "email": "tester@example.com",
        "role": "authenticated",
        "aud": "authenticated",
        "iat": now,
        "exp": now + expires_in_secs,
        "app_metadata": { "provider": "email" },
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
        .expect("sign test token")
}

fn session() -> Value {
    let user_id = Uuid::new_v4();
    json!({
        "access_token": access_token(user_id, 3600),
        "refresh_token": ROTATED_REFRESH_TOKEN,
        "expires_in": 3600,
        "token_type": "bearer",
        "user": { "id": user_id, "email": "tester@example.com" },
    })
}

async fn record(
    State(log): State<Log>,
    Path(endpoint): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let grant_type = query.get("grant_type").cloned();
    log.lock().expect("mock auth log").push(Recorded {
        endpoint: endpoint.clone(),
        grant_type: grant_type.clone(),
        body: body.clone(),
    });

    match (endpoint.as_str(), grant_type.as_deref()) {
        ("signup", _) => (
            StatusCode::OK,
            Json(json!({ "id": Uuid::new_v4(), "email": body["email"] })),
        ),
        ("recover", _) => (StatusCode::OK, Json(json!({}))),
        ("token", Some("refresh_token")) if body["refresh_token"] == VALID_REFRESH_TOKEN => {
            (StatusCode::OK, Json(session()))
        }
        ("token", Some("pkce"))
            if body["auth_code"]
                .as_str()
                .is_some_and(|code| code.starts_with(GOOD_CODE_PREFIX)) =>
        {
            (StatusCode::OK, Json(session()))
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid grant" })),
        ),
    }
}
