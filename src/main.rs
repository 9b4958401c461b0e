use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use qlink_api::database::DatabaseManager;
use qlink_api::handlers::{protected, public};
use qlink_api::middleware::session_auth_middleware;
use qlink_api::config;
use qlink_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so local runs pick up SUPABASE_URL, STRIPE_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Qlink API in {:?} mode", config.environment);

    let validation = config::validate_env(config);
    if !validation.is_valid {
        tracing::warn!("Missing environment variables: {}", validation.missing_vars.join(", "));
    }

    let app = app(AppState::from_config(config));

    // Allow tests or deployments to override port via env
    let port = std::env::var("QLINK_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Qlink API listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {}", e);
    }

    DatabaseManager::close().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}

fn app(state: AppState) -> Router {
    let api = &config::config().api;

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(share_routes())
        .merge(billing_public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        .with_state(state)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
                .layer(cors_layer()),
        );

    if api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/sign-up", post(auth::sign_up_post))
        .route("/auth/sign-in", post(auth::sign_in_post))
        .route("/auth/forgot-password", post(auth::forgot_password_post))
        .route("/auth/oauth/:provider", get(auth::oauth_get))
        .route("/auth/callback", get(auth::callback_get))
        .route("/auth/sign-out", post(auth::sign_out_post))
        // Auth platform hook
        .route("/api/auth/webhook", post(auth::auth_webhook_post))
}

fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/q/:short_id", get(public::questions::question_get))
        .route("/q/:short_id/answers", post(public::questions::answer_post))
        .route("/api/og/:short_id", get(public::og::og_get))
}

fn billing_public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/premium/plans", get(public::billing::plans_get))
        .route("/api/stripe/webhook", post(public::billing::stripe_webhook_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Account
        .route("/api/me", get(protected::account::me_get))
        .route("/api/profile", put(protected::account::profile_put))
        .route("/api/auth/reset-password", post(protected::account::reset_password_post))
        // Questions and answers
        .route(
            "/api/questions",
            get(protected::questions::questions_get).post(protected::questions::questions_post),
        )
        .route("/api/questions/:id", get(protected::questions::question_get))
        .route("/api/questions/:id/status", put(protected::questions::status_put))
        .route("/api/questions/:id/best-answer", put(protected::questions::best_answer_put))
        .route("/api/answers/:id/visibility", put(protected::answers::visibility_put))
        // Analytics and referrals
        .route("/api/analytics", get(protected::analytics::analytics_get))
        .route("/api/analytics/questions/:id", get(protected::analytics::question_analytics_get))
        .route("/api/referrals", get(protected::referrals::referrals_get))
        // Billing
        .route("/api/stripe/create-checkout-session", post(protected::billing::checkout_post))
        // Development tools
        .route("/api/moderation/check", post(protected::moderation::check_post))
        .route_layer(from_fn_with_state(state, session_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Qlink API",
            "version": version,
            "description": "Anonymous Q&A with moderation and premium plans",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/sign-up, /auth/sign-in, /auth/oauth/:provider, /auth/callback (public)",
                "share": "/q/:short_id, /q/:short_id/answers (public)",
                "og": "/api/og/:short_id (public)",
                "plans": "/api/premium/plans (public)",
                "account": "/api/me, /api/profile (protected)",
                "questions": "/api/questions[/:id] (protected)",
                "analytics": "/api/analytics (protected)",
                "referrals": "/api/referrals (protected)",
                "billing": "/api/stripe/create-checkout-session (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
