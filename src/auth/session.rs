//! Stateless cookie session handling.
//!
//! There is no server-side session store: whoever presents the sentinel
//! cookie is authenticated. Logout only expires the client's copy, so a
//! previously captured cookie value replays successfully until its natural
//! expiry. That trade-off is deliberate and covered by an integration test.

use axum::http::{header, HeaderMap};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "idea-vault-auth";

/// The only cookie value treated as an authenticated session.
pub const SESSION_SENTINEL: &str = "true";

/// Extract the value of a named cookie from the request headers.
///
/// Handles multiple `Cookie` headers and `; `-separated pairs; the first
/// matching name wins.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim())
}

/// True iff the session cookie carries exactly the sentinel value.
///
/// Empty, missing, malformed, and tampered values are all unauthenticated.
pub fn is_authenticated(headers: &HeaderMap) -> bool {
    cookie_value(headers, SESSION_COOKIE) == Some(SESSION_SENTINEL)
}

/// Build the `Set-Cookie` value that establishes a session.
pub fn login_cookie(secure: bool, max_age_secs: u64) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Max-Age={}; Path=/",
        SESSION_COOKIE, SESSION_SENTINEL, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that clears the session cookie.
///
/// Empty value and `Max-Age=0` expire the client copy immediately.
pub fn logout_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; HttpOnly; SameSite=Strict; Max-Age=0; Path=/",
        SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn sentinel_cookie_authenticates() {
        let headers = headers_with_cookie("idea-vault-auth=true");
        assert!(is_authenticated(&headers));
    }

    #[test]
    fn missing_header_is_unauthenticated() {
        assert!(!is_authenticated(&HeaderMap::new()));
    }

    #[test]
    fn other_cookies_do_not_authenticate() {
        let headers = headers_with_cookie("theme=dark; lang=en");
        assert!(!is_authenticated(&headers));
    }

    #[test]
    fn tampered_values_are_rejected() {
        for value in ["idea-vault-auth=TRUE", "idea-vault-auth=1", "idea-vault-auth="] {
            let headers = headers_with_cookie(value);
            assert!(!is_authenticated(&headers), "accepted {:?}", value);
        }
    }

    #[test]
    fn finds_cookie_among_others_with_whitespace() {
        let headers = headers_with_cookie("theme=dark;  idea-vault-auth=true ; lang=en");
        assert!(is_authenticated(&headers));
        assert_eq!(cookie_value(&headers, "lang"), Some("en"));
    }

    #[test]
    fn login_cookie_flags() {
        let cookie = login_cookie(false, 86_400);
        assert!(cookie.starts_with("idea-vault-auth=true;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));

        assert!(login_cookie(true, 86_400).ends_with("; Secure"));
    }

    #[test]
    fn logout_cookie_expires_immediately() {
        let cookie = logout_cookie(false);
        assert!(cookie.starts_with("idea-vault-auth=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
