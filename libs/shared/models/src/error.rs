use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure surface shared by every persistence collaborator.
///
/// `NotFound`, `Conflict` and `Validation` are answers from the store.
/// `Unauthorized`, `Unavailable` and `InvalidResponse` mean the store could
/// not be asked or could not be understood; callers treat those as
/// infrastructure errors.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid response from store: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            GatewayError::Unauthorized(_) | GatewayError::Unavailable(_) | GatewayError::InvalidResponse(_)
        )
    }

    /// Map a non-success HTTP status from the store onto the error surface.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            400 | 422 => GatewayError::Validation(body),
            401 | 403 => GatewayError::Unauthorized(body),
            404 => GatewayError::NotFound(body),
            409 => GatewayError::Conflict(body),
            _ => GatewayError::Unavailable(format!("API error ({}): {}", status, body)),
        }
    }
}
