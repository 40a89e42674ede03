use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::db::Identity;
use crate::error::ApiError;
use crate::router::PortalState;

const SECURE_COOKIE_PREFIX: &str = "__Secure-";

/// Pull the caller's session token out of the request.
/// Accepts either:
/// - Header: `Authorization: Bearer <token>`
/// - Cookie: `<cookie_name>` or its `__Secure-` prefixed form
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    // 1) header: Authorization: Bearer <token>
    if let Some(auth) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim)
            && !token.is_empty()
        {
            return Some(token.to_string());
        }
    }

    // 2) cookie
    let jar = CookieJar::from_headers(headers);
    let secure_name = format!("{SECURE_COOKIE_PREFIX}{cookie_name}");
    [cookie_name, secure_name.as_str()]
        .into_iter()
        .filter_map(|name| jar.get(name))
        .map(|c| c.value().to_string())
        .find(|v| !v.is_empty())
}

/// The verified caller. Rejects with 401 when no token is presented or the
/// token does not resolve; the store is never consulted in either case.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequestParts<PortalState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PortalState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.session_cookie)
            .ok_or(ApiError::Unauthorized)?;

        state
            .verifier
            .verify(&token)
            .await
            .map_err(ApiError::internal("Internal server error"))?
            .map(AuthenticatedUser)
            .ok_or(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const COOKIE: &str = "next-auth.session-token";

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn bearer_header_is_accepted() {
        let h = headers(&[(header::AUTHORIZATION, "Bearer abc123")]);
        assert_eq!(session_token(&h, COOKIE).as_deref(), Some("abc123"));
    }

    #[test]
    fn bearer_takes_precedence_over_cookie() {
        let h = headers(&[
            (header::AUTHORIZATION, "bearer from-header"),
            (header::COOKIE, "next-auth.session-token=from-cookie"),
        ]);
        assert_eq!(session_token(&h, COOKIE).as_deref(), Some("from-header"));
    }

    #[test]
    fn session_cookie_and_secure_variant_are_accepted() {
        let h = headers(&[(header::COOKIE, "theme=dark; next-auth.session-token=tok")]);
        assert_eq!(session_token(&h, COOKIE).as_deref(), Some("tok"));

        let h = headers(&[(header::COOKIE, "__Secure-next-auth.session-token=stok")]);
        assert_eq!(session_token(&h, COOKIE).as_deref(), Some("stok"));
    }

    #[test]
    fn missing_or_empty_tokens_yield_none() {
        assert!(session_token(&HeaderMap::new(), COOKIE).is_none());

        let h = headers(&[(header::AUTHORIZATION, "Bearer   ")]);
        assert!(session_token(&h, COOKIE).is_none());

        let h = headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwdw==")]);
        assert!(session_token(&h, COOKIE).is_none());
    }
}
