//! Checkout Configuration
//!
//! Per-processor settings rendered into the page by the server. The
//! `processor` key selects the strategy; every credential or URL is optional
//! and only checked when the branch that needs it is about to run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};
use crate::form::FieldSelectors;

/// Default upper bound on a single vendor call
pub const DEFAULT_VENDOR_TIMEOUT_MS: u64 = 60_000;

/// Flex microform bundle loaded when the page does not name one
pub const DEFAULT_MICROFORM_SDK_URL: &str =
    "https://flex.cybersource.com/cybersource/assets/microform/0.11/flex-microform.min.js";

/// Full page configuration
#[derive(Clone, Debug, Deserialize)]
pub struct CheckoutConfiguration {
    /// Processor-specific settings, discriminated by `processor`
    #[serde(flatten)]
    pub processor: ProcessorConfig,

    /// Upper bound on one vendor tokenization call
    #[serde(default = "default_vendor_timeout_ms", alias = "vendorTimeoutMs")]
    pub vendor_timeout_ms: u64,

    /// Localized user-facing strings
    #[serde(default)]
    pub messages: Messages,

    /// DOM identifiers, defaults match the storefront templates
    #[serde(default)]
    pub selectors: FieldSelectors,

    /// `tracing` filter directive for the browser console
    #[serde(default, alias = "logFilter")]
    pub log_filter: Option<String>,
}

fn default_vendor_timeout_ms() -> u64 {
    DEFAULT_VENDOR_TIMEOUT_MS
}

impl CheckoutConfiguration {
    /// Parse the JSON object the server rendered into the page
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        tracing::debug!(processor = config.processor.name(), "Loaded checkout configuration");
        Ok(config)
    }

    pub fn vendor_timeout(&self) -> Duration {
        Duration::from_millis(self.vendor_timeout_ms)
    }

    /// Submit button id, falling back to the processor's convention
    pub fn submit_button_id(&self) -> String {
        self.selectors
            .submit_button
            .clone()
            .unwrap_or_else(|| format!("payment-button-{}", self.processor.slug()))
    }

    /// Inline error container class, falling back to the processor's convention
    pub fn error_class(&self) -> String {
        self.selectors
            .error_class
            .clone()
            .unwrap_or_else(|| format!("{}-error", self.processor.slug()))
    }
}

/// Supported payment processors
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "processor", rename_all = "snake_case")]
pub enum ProcessorConfig {
    /// Authorize.Net Accept.js, tokenizes card fields in-page
    Authorizenet(DirectTokenizeConfig),

    /// CyberSource Flex microform, vendor-hosted number and CVV fields
    #[serde(alias = "cybersource")]
    CybersourceMicroform(MicroformConfig),

    /// Cowpay iframe dialog
    Cowpay(HostedRedirectConfig),

    /// Elavon hosted payment page
    Elavon(HostedRedirectConfig),
}

impl ProcessorConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ProcessorConfig::Authorizenet(_) => "authorizenet",
            ProcessorConfig::CybersourceMicroform(_) => "cybersource_microform",
            ProcessorConfig::Cowpay(_) => "cowpay",
            ProcessorConfig::Elavon(_) => "elavon",
        }
    }

    /// Name as used in DOM ids and classes
    pub fn slug(&self) -> String {
        self.name().replace('_', "-")
    }

    /// Where the native form posts, if the page provided it
    pub fn post_url(&self) -> Option<&str> {
        let url = match self {
            ProcessorConfig::Authorizenet(c) => &c.post_url,
            ProcessorConfig::CybersourceMicroform(c) => &c.post_url,
            ProcessorConfig::Cowpay(c) | ProcessorConfig::Elavon(c) => &c.post_url,
        };
        present(url)
    }
}

/// Direct in-page tokenization settings
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DirectTokenizeConfig {
    #[serde(default, alias = "postURL", alias = "postUrl")]
    pub post_url: Option<String>,

    /// Public client key
    #[serde(default, alias = "clientKey")]
    pub client_key: Option<String>,

    /// Merchant login id
    #[serde(default, alias = "apiLoginID", alias = "apiLoginId")]
    pub api_login_id: Option<String>,
}

/// Embedded microform settings
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MicroformConfig {
    #[serde(default, alias = "postURL", alias = "postUrl")]
    pub post_url: Option<String>,

    /// Vendor-issued capture context (JWT) scoping this tokenization session
    #[serde(default, alias = "context", alias = "captureContext")]
    pub capture_context: Option<String>,

    /// Override for the SDK bundle URL
    #[serde(default, alias = "sdkUrl")]
    pub sdk_url: Option<String>,
}

impl MicroformConfig {
    pub fn sdk_url(&self) -> &str {
        present(&self.sdk_url).unwrap_or(DEFAULT_MICROFORM_SDK_URL)
    }
}

/// Hosted dialog / hosted page settings
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HostedRedirectConfig {
    #[serde(default, alias = "postURL", alias = "postUrl")]
    pub post_url: Option<String>,

    /// Token the vendor dialog is loaded with
    #[serde(default, alias = "iframeToken", alias = "cowpayIframeToken")]
    pub iframe_token: Option<String>,

    /// Endpoint that executes the payment and answers with a redirect URL
    #[serde(default, alias = "executionUrl", alias = "cowpayExecutionUrl")]
    pub execution_url: Option<String>,

    #[serde(default, alias = "receiptUrl")]
    pub receipt_url: Option<String>,

    /// Hosted payment page; falls back to the receipt URL
    #[serde(default, alias = "paymentPageUrl")]
    pub payment_page_url: Option<String>,

    /// `message_source` tag accepted on cross-window messages
    #[serde(default, alias = "messageSource")]
    pub message_source: Option<String>,

    /// Query parameters that mark a completed round-trip
    #[serde(default)]
    pub resume: Option<ResumeRule>,
}

/// Query-string test applied on page load
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRule {
    /// Optional source tag parameter and its expected value
    #[serde(default)]
    pub source: Option<(String, String)>,

    pub status_param: String,

    pub success_value: String,
}

impl ResumeRule {
    /// Elavon sends the buyer back with `ssl_result_message=APPROVAL`
    pub fn elavon() -> Self {
        Self {
            source: None,
            status_param: "ssl_result_message".into(),
            success_value: "APPROVAL".into(),
        }
    }

    pub fn tagged(source: &str) -> Self {
        Self {
            source: Some(("message_source".into(), source.into())),
            status_param: "payment_status".into(),
            success_value: "PAID".into(),
        }
    }

    /// Check the rule against a query-parameter lookup
    pub fn matches(&self, query: impl Fn(&str) -> Option<String>) -> bool {
        if let Some((param, expected)) = &self.source {
            if query(param).as_deref() != Some(expected.as_str()) {
                return false;
            }
        }
        query(&self.status_param).as_deref() == Some(self.success_value.as_str())
    }
}

/// Localized user-facing strings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub invalid_card_number: String,
    pub invalid_year: String,
    pub invalid_month: String,
    pub form_invalid: String,
    pub sdk_unavailable: String,
    pub network_failure: String,
    pub timeout: String,
    pub generic_failure: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            invalid_card_number: "Invalid card number.".into(),
            invalid_year: "Please enter a valid four-digit year (e.g., 2024).".into(),
            invalid_month: "Please enter a valid two-digit month (e.g., 09).".into(),
            form_invalid: "Please correct the highlighted fields.".into(),
            sdk_unavailable: "The payment service could not be loaded. Please refresh the page."
                .into(),
            network_failure: "We could not complete your payment.".into(),
            timeout: "The payment service took too long to respond. Please try again.".into(),
            generic_failure: "Payment is unavailable right now. Please contact support.".into(),
        }
    }
}

/// Treat absent and blank values alike
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Require a configuration value for the branch about to run
pub(crate) fn require<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str> {
    present(value).ok_or(CheckoutError::MissingConfig(name))
}
