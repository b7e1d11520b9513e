use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("domain validation failed: {message}")]
    Validation { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<powerworks_api_types::ParseVariantError> for DomainError {
    fn from(err: powerworks_api_types::ParseVariantError) -> Self {
        Self::validation(err.to_string())
    }
}
