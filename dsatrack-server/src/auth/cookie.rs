//! Session cookie handling
//!
//! The token travels in an HTTP-only cookie. Production deployments serve
//! the frontend from another site, so they need `Secure; SameSite=None`;
//! plain-HTTP local development can only use `SameSite=Lax`.

use axum::http::{header, HeaderMap};

use crate::config::AuthSettings;

/// Cookie attributes derived from settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub name: String,
    pub max_age_secs: u64,
    pub secure: bool,
}

impl CookiePolicy {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            name: settings.cookie_name.clone(),
            max_age_secs: settings.token_ttl_secs,
            secure: is_production(&settings.profiles),
        }
    }

    /// `Set-Cookie` value carrying `token`
    pub fn session(&self, token: &str) -> String {
        self.render(token, self.max_age_secs)
    }

    /// `Set-Cookie` value that expires the session cookie immediately
    pub fn clearing(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: u64) -> String {
        let same_site = if self.secure {
            "; Secure; SameSite=None"
        } else {
            "; SameSite=Lax"
        };
        format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly{}",
            self.name, value, max_age, same_site
        )
    }
}

/// A profile list counts as production when any entry is `prod` or
/// `production` (any case), or mentions `neon` (hosted database profile).
pub fn is_production(profiles: &[String]) -> bool {
    profiles.iter().any(|p| {
        let p = p.trim().to_ascii_lowercase();
        p == "prod" || p == "production" || p.contains("neon")
    })
}

/// Find the session token: the named cookie first, then an
/// `Authorization: Bearer` header. Empty values are ignored.
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.trim().is_empty())
        .map(|(_, value)| value.trim().to_owned());

    if from_cookie.is_some() {
        tracing::debug!(cookie = cookie_name, "token found in cookie");
        return from_cookie;
    }

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned);

    if bearer.is_some() {
        tracing::debug!("token found in Authorization header");
    }
    bearer
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn policy(secure: bool) -> CookiePolicy {
        CookiePolicy {
            name: "jwt-token".into(),
            max_age_secs: 86_400,
            secure,
        }
    }

    fn profiles(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn production_heuristic() {
        assert!(is_production(&profiles(&["prod"])));
        assert!(is_production(&profiles(&["dev", "Production"])));
        assert!(is_production(&profiles(&["neon-db"])));
        assert!(!is_production(&profiles(&["dev", "local"])));
        assert!(!is_production(&[]));
    }

    #[test]
    fn dev_cookie_is_lax() {
        let cookie = policy(false).session("abc");
        assert_eq!(
            cookie,
            "jwt-token=abc; Path=/; Max-Age=86400; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn prod_cookie_is_secure_none() {
        let cookie = policy(true).session("abc");
        assert!(cookie.contains("; Secure; SameSite=None"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn clearing_cookie_expires() {
        let cookie = policy(false).clearing();
        assert!(cookie.starts_with("jwt-token=; "));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn cookie_preferred_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; jwt-token=from-cookie"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(
            token_from_headers(&headers, "jwt-token").as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn empty_cookie_falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("jwt-token="));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(
            token_from_headers(&headers, "jwt-token").as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(token_from_headers(&headers, "jwt-token").is_none());
    }
}
