// Credential access: read once per request, then passed explicitly

use crate::core::error::DashboardError;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use sha2::{Digest, Sha256};
use std::fmt;

pub const TOKEN_COOKIE: &str = "token";
pub const USER_ID_COOKIE: &str = "user_id";

/// Bearer credential forwarded verbatim to the remote services.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self, DashboardError> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Err(DashboardError::CredentialMissing);
        }
        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short stable digest of the token, safe to log and persist.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..8])
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Look up one cookie in the `Cookie` header(s).
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// `Authorization` header first (with or without a `Bearer ` prefix), then
/// the `token` cookie. Fails before any network call when neither is set.
pub fn credential_from_headers(headers: &HeaderMap) -> Result<Credential, DashboardError> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim())
        .filter(|v| !v.is_empty());

    match from_header.or_else(|| cookie_value(headers, TOKEN_COOKIE)) {
        Some(token) => Credential::new(token),
        None => Err(DashboardError::CredentialMissing),
    }
}

/// Cache scope for the request: the `user_id` cookie bound to the token's
/// fingerprint, so the cookie alone never selects another session's slots.
pub fn session_scope(headers: &HeaderMap, credential: &Credential) -> Result<String, DashboardError> {
    let user_id = cookie_value(headers, USER_ID_COOKIE).ok_or(DashboardError::CredentialMissing)?;
    Ok(format!("{}:{}", user_id, credential.fingerprint()))
}

/// `Set-Cookie` values that end the browser session.
pub fn expired_session_cookies() -> [String; 2] {
    [
        format!("{}=; Path=/; Max-Age=0", TOKEN_COOKIE),
        format!("{}=; Path=/; Max-Age=0", USER_ID_COOKIE),
    ]
}

/// Per-request session: the credential plus the cache scope.
#[derive(Debug, Clone)]
pub struct Session {
    pub credential: Credential,
    pub scope: String,
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = DashboardError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let credential = credential_from_headers(&parts.headers)?;
        let scope = session_scope(&parts.headers, &credential)?;
        Ok(Session { credential, scope })
    }
}
