use super::errors::{DomainError, DomainResult};

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Static shared-secret gate for the predict endpoint.
///
/// The comparison is plain string equality: no hashing, no rate limiting and
/// no constant-time guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ApiKeyPolicy {
    #[default]
    Open,
    Required(String),
}

impl ApiKeyPolicy {
    /// An unset or empty secret leaves the endpoint open.
    pub fn from_secret(secret: Option<String>) -> Self {
        match secret {
            Some(s) if !s.is_empty() => ApiKeyPolicy::Required(s),
            _ => ApiKeyPolicy::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ApiKeyPolicy::Open)
    }

    pub fn check(&self, provided: Option<&str>) -> DomainResult<()> {
        match self {
            ApiKeyPolicy::Open => Ok(()),
            ApiKeyPolicy::Required(secret) if provided == Some(secret.as_str()) => Ok(()),
            ApiKeyPolicy::Required(_) => Err(DomainError::Unauthorized),
        }
    }
}
