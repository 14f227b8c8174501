//! Session cookie construction.

use axum::http::{header::HOST, HeaderMap, Uri};
use axum_extra::extract::cookie::Cookie;
use std::time::Duration;

use crate::id::Identifier;

/// Name of the cookie carrying the session identifier.
pub const SESSION_COOKIE_NAME: &str = "session";

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Attributes applied to every session cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Max-Age of a freshly issued cookie.
    pub max_age: Duration,
    /// Honor `X-Forwarded-Proto` when deciding on the Secure attribute.
    pub trust_forwarded_proto: bool,
}

impl CookieSettings {
    pub fn new(max_age: Duration, trust_forwarded_proto: bool) -> Self {
        Self {
            max_age,
            trust_forwarded_proto,
        }
    }

    /// Whether the request arrived over a confidential connection.
    pub fn is_confidential(&self, headers: &HeaderMap, uri: &Uri) -> bool {
        if uri.scheme_str() == Some("https") {
            return true;
        }

        self.trust_forwarded_proto
            && headers
                .get(FORWARDED_PROTO)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
    }

    /// Cookie carrying a newly issued session id.
    pub fn session_cookie(
        &self,
        session_id: &Identifier,
        headers: &HeaderMap,
        uri: &Uri,
    ) -> Cookie<'static> {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);

        let mut builder = Cookie::build((SESSION_COOKIE_NAME, session_id.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.is_confidential(headers, uri))
            .max_age(time::Duration::seconds(max_age));

        if let Some(domain) = cookie_domain(headers) {
            builder = builder.domain(domain);
        }

        builder.build()
    }

    /// Cookie matching the session cookie's path and domain, for removal.
    pub fn removal_cookie(&self, headers: &HeaderMap) -> Cookie<'static> {
        let mut builder = Cookie::build((SESSION_COOKIE_NAME, "")).path("/");

        if let Some(domain) = cookie_domain(headers) {
            builder = builder.domain(domain);
        }

        builder.build()
    }
}

/// Cookie domain for a request: the Host header without its port.
///
/// Returns `None` when Host is absent, empty, or an IPv6 literal.
pub fn cookie_domain(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(HOST)?.to_str().ok()?.trim();
    if host.is_empty() || host.starts_with('[') {
        return None;
    }

    let name = host.rsplit_once(':').map_or(host, |(name, _)| name);
    if name.is_empty() {
        return None;
    }

    Some(name.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn settings(trust_forwarded_proto: bool) -> CookieSettings {
        CookieSettings::new(Duration::from_secs(3600), trust_forwarded_proto)
    }

    #[test]
    fn test_cookie_domain_strips_port() {
        assert_eq!(
            cookie_domain(&headers(&[("host", "floodwatch.example:8080")])).as_deref(),
            Some("floodwatch.example")
        );
        assert_eq!(
            cookie_domain(&headers(&[("host", "Floodwatch.Example")])).as_deref(),
            Some("floodwatch.example")
        );
    }

    #[test]
    fn test_cookie_domain_absent() {
        assert_eq!(cookie_domain(&HeaderMap::new()), None);
        assert_eq!(cookie_domain(&headers(&[("host", "")])), None);
        assert_eq!(cookie_domain(&headers(&[("host", "[::1]:8080")])), None);
    }

    #[test]
    fn test_confidential_by_scheme() {
        let uri: Uri = "https://floodwatch.example/api/login".parse().unwrap();
        assert!(settings(false).is_confidential(&HeaderMap::new(), &uri));

        let uri: Uri = "/api/login".parse().unwrap();
        assert!(!settings(false).is_confidential(&HeaderMap::new(), &uri));
    }

    #[test]
    fn test_confidential_by_forwarded_proto() {
        let uri: Uri = "/api/login".parse().unwrap();
        let forwarded = headers(&[("x-forwarded-proto", "HTTPS")]);

        assert!(settings(true).is_confidential(&forwarded, &uri));
        assert!(!settings(false).is_confidential(&forwarded, &uri));

        let plain = headers(&[("x-forwarded-proto", "http")]);
        assert!(!settings(true).is_confidential(&plain, &uri));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let id = Identifier::new().unwrap();
        let uri: Uri = "https://floodwatch.example/api/login".parse().unwrap();
        let cookie = settings(false).session_cookie(
            &id,
            &headers(&[("host", "floodwatch.example:443")]),
            &uri,
        );

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), id.to_string());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.domain(), Some("floodwatch.example"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
    }

    #[test]
    fn test_session_cookie_without_host() {
        let id = Identifier::new().unwrap();
        let uri: Uri = "/api/login".parse().unwrap();
        let cookie = settings(false).session_cookie(&id, &HeaderMap::new(), &uri);

        assert_eq!(cookie.domain(), None);
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_removal_cookie_matches_scope() {
        let cookie = settings(false).removal_cookie(&headers(&[("host", "localhost:8080")]));

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.domain(), Some("localhost"));
    }
}
