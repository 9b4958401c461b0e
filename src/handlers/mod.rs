// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) → Protected (session cookie or Bearer token)
//
// Public handlers serve anonymous visitors: sign-in flows, share links,
// answer submission, OG cards and the Stripe webhook. Protected handlers
// receive the signed-in user from the session guard as an extension.
pub mod protected;
pub mod public;

use axum::http::HeaderMap;

use crate::services::qa;

/// Client address as reported by the edge proxy
pub fn client_ip(headers: &HeaderMap) -> String {
    qa::client_ip(headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()))
}

/// Keep only same-site absolute paths for post-login redirects
pub fn safe_redirect_path(candidate: Option<&str>) -> Option<&str> {
    candidate.filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_paths_stay_on_site() {
        assert_eq!(safe_redirect_path(Some("/protected/reset-password")), Some("/protected/reset-password"));
        assert_eq!(safe_redirect_path(Some("//evil.example")), None);
        assert_eq!(safe_redirect_path(Some("https://evil.example")), None);
        assert_eq!(safe_redirect_path(None), None);
    }
}
