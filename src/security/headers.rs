//! Baseline security response headers.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

const PERMISSIONS_POLICY: &str = "camera=(), microphone=(), geolocation=(), payment=(), \
     usb=(), accelerometer=(), ambient-light-sensor=(), autoplay=(), encrypted-media=(), \
     fullscreen=(self), gyroscope=(), magnetometer=(), midi=(), xr-spatial-tracking=()";

const HSTS: &str = "max-age=63072000; includeSubDomains; preload";

/// Build the Content-Security-Policy for the given environment.
///
/// Development allows inline styles and eval so local tooling keeps working;
/// production drops both.
pub fn build_csp(production: bool) -> String {
    let dev_unsafe_inline = if production { "" } else { " 'unsafe-inline'" };
    let dev_unsafe_eval = if production { "" } else { " 'unsafe-eval'" };

    [
        "default-src 'self'".to_string(),
        format!("script-src 'self'{dev_unsafe_eval}"),
        format!("style-src 'self'{dev_unsafe_inline}"),
        "img-src 'self' blob: data:".to_string(),
        "font-src 'self'".to_string(),
        "connect-src 'self'".to_string(),
        "media-src 'self'".to_string(),
        "frame-ancestors 'none'".to_string(),
        "object-src 'none'".to_string(),
        "base-uri 'self'".to_string(),
        "form-action 'self'".to_string(),
    ]
    .join("; ")
}

/// Attach the fixed hardening header set to a response.
///
/// Applied to every non-asset route regardless of authentication state.
/// HSTS is production-only.
pub fn apply(headers: &mut HeaderMap, production: bool) {
    let csp = HeaderValue::from_str(&build_csp(production)).expect("CSP is valid ASCII");
    headers.insert(header::CONTENT_SECURITY_POLICY, csp);
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(PERMISSIONS_POLICY),
    );
    if production {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS),
        );
    }
}

/// True when the path falls under one of the configured asset prefixes.
///
/// Prefixes ending in `/` match as directory prefixes; anything else must
/// match the path exactly (e.g. `/favicon.ico`).
pub fn is_asset_path(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| {
        if prefix.ends_with('/') {
            path.starts_with(prefix.as_str())
        } else {
            path == prefix
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csp_is_strict_in_production() {
        let csp = build_csp(true);
        assert!(!csp.contains("unsafe-inline"));
        assert!(!csp.contains("unsafe-eval"));
        assert!(csp.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn csp_relaxes_in_development() {
        let csp = build_csp(false);
        assert!(csp.contains("script-src 'self' 'unsafe-eval'"));
        assert!(csp.contains("style-src 'self' 'unsafe-inline'"));
    }

    #[test]
    fn hsts_only_in_production() {
        let mut dev = HeaderMap::new();
        apply(&mut dev, false);
        assert!(dev.get(header::STRICT_TRANSPORT_SECURITY).is_none());
        assert_eq!(dev.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");

        let mut prod = HeaderMap::new();
        apply(&mut prod, true);
        assert!(prod.get(header::STRICT_TRANSPORT_SECURITY).is_some());
    }

    #[test]
    fn asset_prefix_matching() {
        let prefixes = vec![
            "/static/".to_string(),
            "/assets/".to_string(),
            "/favicon.ico".to_string(),
        ];
        assert!(is_asset_path("/static/app.css", &prefixes));
        assert!(is_asset_path("/favicon.ico", &prefixes));
        assert!(!is_asset_path("/favicon.ico.bak", &prefixes));
        assert!(!is_asset_path("/api/ideas", &prefixes));
        assert!(!is_asset_path("/staticish", &prefixes));
    }
}
