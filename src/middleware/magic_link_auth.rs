use crate::{error::AppError, models::MagicLinkSession, AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

const BEARER: &str = "bearer";

/// Extract Bearer token from Authorization header
///
/// The scheme is matched case-insensitively and the token is whatever
/// follows the first space, trimmed. A blank header counts as missing.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::InvalidAuthHeader)?;
    if auth_header.as_bytes().iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::InvalidAuthHeader);
    }
    let auth_header = auth_header
        .to_str()
        .map_err(|_| AppError::InvalidAuthHeaderFormat)?;

    let (scheme, token) = auth_header
        .split_once(' ')
        .ok_or(AppError::InvalidAuthHeaderFormat)?;
    if !scheme.eq_ignore_ascii_case(BEARER) {
        return Err(AppError::InvalidAuthHeaderFormat);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::InvalidAuthHeaderFormat);
    }

    Ok(token.to_string())
}

/// Verifies the magic-link session token and attaches the resulting
/// [`MagicLinkSession`] to the request.
pub async fn magic_link_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers)?;

    let session = state
        .magic_link_service
        .authorize_session(&token)
        .map_err(|e| {
            tracing::debug!("Rejected magic link session token: {}", e);
            AppError::from(e)
        })?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for MagicLinkSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<MagicLinkSession>()
            .cloned()
            .ok_or(AppError::InvalidSession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header() {
        assert!(matches!(
            extract_bearer_token(&HeaderMap::new()),
            Err(AppError::InvalidAuthHeader)
        ));
    }

    #[test]
    fn blank_header_counts_as_missing() {
        for value in ["", "   "] {
            assert!(
                matches!(
                    extract_bearer_token(&headers(value)),
                    Err(AppError::InvalidAuthHeader)
                ),
                "{value:?}"
            );
        }
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer_token(&headers("bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer_token(&headers("BEARER  abc ")).unwrap(), "abc");
    }

    #[test]
    fn malformed_values() {
        for value in ["Bearer", "Bearer    ", "Basic abc", "abc"] {
            assert!(
                matches!(
                    extract_bearer_token(&headers(value)),
                    Err(AppError::InvalidAuthHeaderFormat)
                ),
                "{value}"
            );
        }
    }

    #[test]
    fn non_ascii_header_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AppError::InvalidAuthHeaderFormat)
        ));
    }
}
