use thiserror::Error;
use vistoria_model::ModelError;

/// Failure kinds surfaced by catalog operations.
#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CatalogError {
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::NotFound(_) => "not_found",
            CatalogError::Unauthorized(_) => "unauthorized",
            CatalogError::StoreUnavailable(_) => "store_unavailable",
            CatalogError::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl From<ModelError> for CatalogError {
    fn from(err: ModelError) -> Self {
        CatalogError::InvalidRequest(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
