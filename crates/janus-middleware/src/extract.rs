//! Credential extraction.
//!
//! Pulls a bearer credential out of a request. Two sources are consulted,
//! in order, and nothing else:
//!
//! 1. An `Authorization` header whose scheme is `bearer`, case-insensitive.
//! 2. An `access_token` cookie.
//!
//! Extraction has no side effects and never blocks. A malformed header is
//! "no credential found", not an error.

use http::header::{HeaderMap, AUTHORIZATION, COOKIE};

/// Name of the cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Extracts a bearer credential from request headers, if one is present.
#[must_use]
pub fn credential_from(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_token(headers))
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// A bare scheme with no token yields `None`.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

/// Extracts the access-token cookie from `Cookie` headers.
fn cookie_token(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(COOKIE) {
        let Ok(value) = value.to_str() else { continue };

        for pair in value.split(';') {
            let Some((name, token)) = pair.split_once('=') else {
                continue;
            };
            if name.trim() == ACCESS_TOKEN_COOKIE && !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    None
}
