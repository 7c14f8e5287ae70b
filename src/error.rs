use thiserror::Error;

use crate::core_modules::segmentation::FailureReason;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Segmentation failed: {0}")]
    Segmentation(FailureReason),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ExtractError::InvalidInput(msg.into())
    }
}
