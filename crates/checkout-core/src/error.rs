//! Checkout Error Types

use serde::Serialize;
use thiserror::Error;

use crate::card::CardField;
use crate::config::Messages;

/// Result type alias
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Checkout-related errors
///
/// Every variant is handled at the adapter boundary: rendered inline or as a
/// banner and recorded as a failed attempt. None of them carry card data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Native form constraints unmet
    #[error("Form validation failed")]
    Validation,

    /// Field content fails a processor-specific pattern
    #[error("Invalid {field}: {message}")]
    Format { field: CardField, message: String },

    /// Vendor SDK reported a failure
    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    /// Execution endpoint unreachable or returned an unusable body
    #[error("Network error: {0}")]
    Network(String),

    /// Vendor SDK script could not be loaded
    #[error("Payment SDK unavailable: {0}")]
    SdkLoad(String),

    /// A configuration field needed by the active branch is absent
    #[error("Missing configuration field: {0}")]
    MissingConfig(&'static str),

    /// Vendor call did not settle in time
    #[error("Vendor call timed out after {0} ms")]
    Timeout(u64),

    /// Configuration payload could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse error category used for state tracking and structured reporting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Format,
    Tokenization,
    Network,
    SdkLoad,
    MissingConfig,
    Timeout,
    Config,
}

impl CheckoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::Validation => ErrorKind::Validation,
            CheckoutError::Format { .. } => ErrorKind::Format,
            CheckoutError::Tokenization(_) => ErrorKind::Tokenization,
            CheckoutError::Network(_) => ErrorKind::Network,
            CheckoutError::SdkLoad(_) => ErrorKind::SdkLoad,
            CheckoutError::MissingConfig(_) => ErrorKind::MissingConfig,
            CheckoutError::Timeout(_) => ErrorKind::Timeout,
            CheckoutError::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the user can fix this by clicking again
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            CheckoutError::SdkLoad(_) | CheckoutError::MissingConfig(_) | CheckoutError::Config(_)
        )
    }

    /// Whether this error belongs next to the fields rather than in a banner
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            CheckoutError::Format { .. } | CheckoutError::Tokenization(_)
        )
    }

    /// Get user-facing message in the page's language
    pub fn user_message(&self, messages: &Messages) -> String {
        match self {
            CheckoutError::Validation => messages.form_invalid.clone(),
            CheckoutError::Format { message, .. } => message.clone(),
            // Vendor text is shown as-is, it never echoes card data
            CheckoutError::Tokenization(msg) => msg.clone(),
            CheckoutError::Network(msg) if !msg.is_empty() => {
                format!("{} {}", messages.network_failure, msg)
            }
            CheckoutError::Network(_) => messages.network_failure.clone(),
            CheckoutError::SdkLoad(_) => messages.sdk_unavailable.clone(),
            CheckoutError::Timeout(_) => messages.timeout.clone(),
            CheckoutError::MissingConfig(_) | CheckoutError::Config(_) => {
                messages.generic_failure.clone()
            }
        }
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(err: serde_json::Error) -> Self {
        CheckoutError::Config(err.to_string())
    }
}
