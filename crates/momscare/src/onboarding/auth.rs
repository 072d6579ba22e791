use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Gate in front of the review and status-update routes.
pub trait AdminAuthorizer: Send + Sync {
    fn authorize(&self, bearer: Option<&str>) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("admin credentials required")]
    MissingCredentials,
    #[error("admin credentials rejected")]
    InvalidCredentials,
}

/// Accepts a single configured token. Only its digest is kept in memory and comparison is
/// constant time.
pub struct StaticTokenAuthorizer {
    digest: [u8; 32],
}

impl StaticTokenAuthorizer {
    pub fn new(token: &str) -> Self {
        Self {
            digest: Sha256::digest(token.as_bytes()).into(),
        }
    }
}

impl AdminAuthorizer for StaticTokenAuthorizer {
    fn authorize(&self, bearer: Option<&str>) -> Result<(), AuthError> {
        let presented = bearer.ok_or(AuthError::MissingCredentials)?;
        let digest: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        if bool::from(digest[..].ct_eq(&self.digest[..])) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header, if present and non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
