use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Unknown transformation type: {0}")]
    InvalidTransformation(String),

    #[error("Upload result is missing `{0}`")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, ModelError>;
