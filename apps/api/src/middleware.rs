use std::str::FromStr;

use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use skillgraph_domain::{CallerIdentity, Role};

/// Resolves the caller identity for the request and stores it as an
/// extension.
///
/// Credential verification happens upstream; this layer only trusts the
/// resolved role header. An unrecognized or absent role leaves the caller
/// without grants, which every guard check treats as deny-by-default.
pub async fn resolve_caller(mut request: Request, next: Next) -> Response {
    let identity = caller_from_headers(request.headers());
    request.extensions_mut().insert(identity);
    next.run(request).await
}

fn caller_from_headers(headers: &HeaderMap) -> CallerIdentity {
    let role = headers
        .get("x-admin-role")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Role::from_str(value.trim()).ok());

    let subject = headers
        .get("x-admin-subject")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .or_else(|| role.map(|role| role.as_str().to_owned()));

    match subject {
        Some(subject) => CallerIdentity::new(subject, role),
        None => CallerIdentity::anonymous(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};
    use skillgraph_domain::Role;

    use super::caller_from_headers;

    #[test]
    fn recognized_role_resolves_with_subject_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-admin-role", HeaderValue::from_static("moderator"));

        let caller = caller_from_headers(&headers);
        assert_eq!(caller.role(), Some(Role::Moderator));
        assert_eq!(caller.subject(), "moderator");
    }

    #[test]
    fn unknown_role_leaves_the_caller_without_grants() {
        let mut headers = HeaderMap::new();
        headers.insert("x-admin-role", HeaderValue::from_static("superuser"));
        headers.insert("x-admin-subject", HeaderValue::from_static("mallory"));

        let caller = caller_from_headers(&headers);
        assert_eq!(caller.role(), None);
        assert_eq!(caller.subject(), "mallory");
    }

    #[test]
    fn absent_headers_resolve_to_anonymous() {
        let caller = caller_from_headers(&HeaderMap::new());
        assert_eq!(caller.role(), None);
        assert_eq!(caller.subject(), "anonymous");
    }
}
