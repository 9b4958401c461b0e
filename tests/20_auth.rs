mod common;

use anyhow::Result;
use reqwest::StatusCode;
use qlink_api::auth::session::code_challenge;
use serde_json::{json, Value};

#[tokio::test]
async fn protected_routes_require_a_session() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();

    for path in ["/api/me", "/api/questions", "/api/analytics", "/api/referrals"] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{} should need auth", path);

        let body: Value = res.json().await?;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client()
        .post(server.url("/api/questions"))
        .bearer_auth("not-a-jwt")
        .json(&json!({ "content": "What is your favourite book?" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unknown_oauth_provider_is_a_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client().get(server.url("/auth/oauth/myspace")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn sign_up_validates_fields_before_calling_out() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client()
        .post(server.url("/auth/sign-up"))
        .json(&json!({ "email": "", "password": "" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn sign_up_runs_pkce_through_the_confirmation_email() -> Result<()> {
    let server = common::ensure_server().await?;
    let email = format!("signup-{}@example.com", uuid::Uuid::new_v4());

    let res = common::client()
        .post(server.url("/auth/sign-up"))
        .json(&json!({ "email": email, "password": "pw123456" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let cookies = common::set_cookies(&res);
    let verifier_cookie = cookies
        .iter()
        .find(|c| c.starts_with("qlink-code-verifier="))
        .expect("verifier cookie set");
    assert!(verifier_cookie.contains("HttpOnly"));
    assert!(verifier_cookie.contains("Max-Age=86400"));
    let verifier = common::cookie_value(&cookies, "qlink-code-verifier").expect("verifier value");

    let sent = common::mock_auth::mock_auth()
        .find("signup", |body| body["email"] == email.as_str())
        .expect("sign-up reached the auth platform");
    assert_eq!(sent.body["code_challenge"], code_challenge(&verifier));
    assert_eq!(sent.body["code_challenge_method"], "s256");
    Ok(())
}

#[tokio::test]
async fn password_recovery_runs_pkce_through_the_reset_email() -> Result<()> {
    let server = common::ensure_server().await?;
    let email = format!("recover-{}@example.com", uuid::Uuid::new_v4());

    let res = common::client()
        .post(server.url("/auth/forgot-password"))
        .json(&json!({ "email": email }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let cookies = common::set_cookies(&res);
    let verifier = common::cookie_value(&cookies, "qlink-code-verifier").expect("verifier cookie set");

    let sent = common::mock_auth::mock_auth()
        .find("recover", |body| body["email"] == email.as_str())
        .expect("recovery reached the auth platform");
    assert_eq!(sent.body["code_challenge"], code_challenge(&verifier));
    assert_eq!(sent.body["code_challenge_method"], "s256");
    Ok(())
}

#[tokio::test]
async fn expired_session_is_refreshed_from_the_refresh_cookie() -> Result<()> {
    let server = common::ensure_server().await?;
    let expired = common::mock_auth::access_token(uuid::Uuid::new_v4(), -3600);

    let res = common::client()
        .post(server.url("/api/moderation/check"))
        .header(
            "cookie",
            format!(
                "qlink-access-token={}; qlink-refresh-token={}",
                expired,
                common::mock_auth::VALID_REFRESH_TOKEN
            ),
        )
        .json(&json!({ "content": "What a lovely day it is today" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let cookies = common::set_cookies(&res);
    let renewed = common::cookie_value(&cookies, "qlink-access-token").expect("access cookie renewed");
    assert!(!renewed.is_empty());
    assert_ne!(renewed, expired);
    assert_eq!(
        common::cookie_value(&cookies, "qlink-refresh-token").as_deref(),
        Some(common::mock_auth::ROTATED_REFRESH_TOKEN)
    );
    Ok(())
}

#[tokio::test]
async fn expired_session_with_rejected_refresh_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let expired = common::mock_auth::access_token(uuid::Uuid::new_v4(), -3600);

    let res = common::client()
        .post(server.url("/api/moderation/check"))
        .header(
            "cookie",
            format!("qlink-access-token={}; qlink-refresh-token=revoked", expired),
        )
        .json(&json!({ "content": "What a lovely day it is today" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(common::cookie_value(&common::set_cookies(&res), "qlink-access-token").is_none());
    Ok(())
}

#[tokio::test]
async fn callback_without_verifier_cookie_goes_back_to_sign_in() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client()
        .get(server.url("/auth/callback?code=good-code-orphan"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res.headers()["location"].to_str()?;
    assert!(
        location.starts_with(&format!("{}/sign-in?authError=", common::SITE_URL)),
        "unexpected redirect: {}",
        location
    );
    Ok(())
}

#[tokio::test]
async fn callback_exchanges_code_with_the_stored_verifier() -> Result<()> {
    let server = common::ensure_server().await?;
    let code = format!("{}{}", common::mock_auth::GOOD_CODE_PREFIX, uuid::Uuid::new_v4());
    let verifier = format!("verifier-{}", uuid::Uuid::new_v4());

    let res = common::client()
        .get(server.url(&format!("/auth/callback?code={}", code)))
        .header("cookie", format!("qlink-code-verifier={}", verifier))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let exchange = common::mock_auth::mock_auth()
        .find("token", |body| body["auth_code"] == code.as_str())
        .expect("code exchanged with the auth platform");
    assert_eq!(exchange.grant_type.as_deref(), Some("pkce"));
    assert_eq!(exchange.body["code_verifier"], verifier.as_str());

    // A brand-new user is sent to profile setup; without a database the
    // profile lookup fails and the user is sent back to sign in
    let location = res.headers()["location"].to_str()?.to_string();
    if location.contains("/protected/profile") {
        let cookies = common::set_cookies(&res);
        assert!(common::cookie_value(&cookies, "qlink-access-token").is_some());
        assert_eq!(common::cookie_value(&cookies, "qlink-code-verifier").as_deref(), Some(""));
    } else {
        assert!(location.contains("/sign-in?authError="), "unexpected redirect: {}", location);
    }
    Ok(())
}

#[tokio::test]
async fn callback_with_rejected_code_sets_no_session() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client()
        .get(server.url("/auth/callback?code=expired-code"))
        .header("cookie", "qlink-code-verifier=some-verifier")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(res.headers()["location"].to_str()?.contains("/sign-in?authError="));
    assert!(common::cookie_value(&common::set_cookies(&res), "qlink-access-token").is_none());
    Ok(())
}
