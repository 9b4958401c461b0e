// Session cookies and PKCE helpers
use axum::http::{header, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;
use sha2::{Digest, Sha256};

use super::Session;

pub const ACCESS_COOKIE: &str = "qlink-access-token";
pub const REFRESH_COOKIE: &str = "qlink-refresh-token";
pub const VERIFIER_COOKIE: &str = "qlink-code-verifier";

const REFRESH_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 30;
const VERIFIER_MAX_AGE_SECS: i64 = 60 * 10;
const EMAIL_VERIFIER_MAX_AGE_SECS: i64 = 60 * 60 * 24;
const VERIFIER_LENGTH: usize = 64;
const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Value from the `Cookie` header(s) of a request
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn set_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie(name: &str, secure: bool) -> String {
    set_cookie(name, "", 0, secure)
}

/// `Set-Cookie` values that store a session
pub fn session_cookies(session: &Session, secure: bool) -> Vec<String> {
    vec![
        set_cookie(ACCESS_COOKIE, &session.access_token, session.expires_in, secure),
        set_cookie(REFRESH_COOKIE, &session.refresh_token, REFRESH_MAX_AGE_SECS, secure),
    ]
}

pub fn clear_session_cookies(secure: bool) -> Vec<String> {
    vec![clear_cookie(ACCESS_COOKIE, secure), clear_cookie(REFRESH_COOKIE, secure)]
}

/// Verifier for an OAuth round trip, which completes within minutes
pub fn verifier_cookie(verifier: &str, secure: bool) -> String {
    set_cookie(VERIFIER_COOKIE, verifier, VERIFIER_MAX_AGE_SECS, secure)
}

/// Verifier for confirmation and recovery emails, which may be opened much later
pub fn email_verifier_cookie(verifier: &str, secure: bool) -> String {
    set_cookie(VERIFIER_COOKIE, verifier, EMAIL_VERIFIER_MAX_AGE_SECS, secure)
}

/// Append `Set-Cookie` headers, skipping values that are not valid header text
pub fn append_cookies(headers: &mut HeaderMap, cookies: impl IntoIterator<Item = String>) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(_) => tracing::warn!("Dropping malformed Set-Cookie value"),
        }
    }
}

/// Random PKCE code verifier
pub fn generate_code_verifier() -> String {
    let mut rng = rand::thread_rng();
    (0..VERIFIER_LENGTH)
        .map(|_| UNRESERVED[rng.gen_range(0..UNRESERVED.len())] as char)
        .collect()
}

/// S256 code challenge: base64url(sha256(verifier)) without padding
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; qlink-access-token=abc.def; other=1"),
        );
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE).as_deref(), Some("abc.def"));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE), None);
    }

    #[test]
    fn empty_cookie_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("qlink-refresh-token="));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE), None);
    }

    #[test]
    fn email_verifier_outlives_oauth_verifier() {
        assert!(verifier_cookie("v", false).ends_with("Max-Age=600"));
        assert_eq!(
            email_verifier_cookie("v", true),
            "qlink-code-verifier=v; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400; Secure"
        );
    }

    #[test]
    fn cookie_attributes() {
        let cookie = set_cookie(ACCESS_COOKIE, "tok", 3600, true);
        assert_eq!(
            cookie,
            "qlink-access-token=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600; Secure"
        );
        assert!(clear_cookie(REFRESH_COOKIE, false).contains("Max-Age=0"));
        assert!(!clear_cookie(REFRESH_COOKIE, false).contains("Secure"));
    }

    #[test]
    fn pkce_challenge_matches_rfc_example() {
        // RFC 7636 appendix B
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(code_challenge(verifier), "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGjSstw-cM");
    }

    #[test]
    fn verifiers_are_unreserved_and_long_enough() {
        let verifier = generate_code_verifier();
        assert_eq!(verifier.len(), VERIFIER_LENGTH);
        assert!(verifier.bytes().all(|b| UNRESERVED.contains(&b)));
    }
}
