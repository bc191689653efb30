//! Error types for the FitTrack application

use thiserror::Error;

/// Errors raised while turning raw biometric input into an energy estimate.
///
/// The engine never guesses a missing value; every variant carries the
/// offending field name so the HTTP layer can point at it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnergyError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field}: {message}")]
    InvalidField { field: &'static str, message: String },
}

impl EnergyError {
    pub fn missing(field: &'static str) -> Self {
        EnergyError::MissingField { field }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        EnergyError::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// Name of the input field that caused the error
    pub fn field(&self) -> &'static str {
        match self {
            EnergyError::MissingField { field } | EnergyError::InvalidField { field, .. } => field,
        }
    }
}
