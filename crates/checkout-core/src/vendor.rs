//! Vendor SDK seams
//!
//! One trait per widget family. Browser implementations wrap the vendor's
//! JavaScript globals; tests substitute recording fakes.

use std::rc::Rc;

use async_trait::async_trait;

use crate::card::{CardInput, ExpiryDate};
use crate::config::MicroformConfig;
use crate::error::Result;

/// Public credentials handed to an in-page tokenizer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthData {
    pub client_key: String,
    pub api_login_id: String,
}

/// Descriptor/value pair returned by an in-page tokenizer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpaqueData {
    pub descriptor: String,
    pub value: String,
}

/// Non-sensitive stand-in for card data, ready for the hidden fields
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenizationResult {
    Opaque(OpaqueData),
    Transient(String),
}

impl TokenizationResult {
    /// A result with any empty part is unusable
    pub fn is_complete(&self) -> bool {
        match self {
            TokenizationResult::Opaque(data) => {
                !data.descriptor.is_empty() && !data.value.is_empty()
            }
            TokenizationResult::Transient(token) => !token.is_empty(),
        }
    }
}

/// In-page card tokenizer (Accept.js style)
#[async_trait(?Send)]
pub trait CardTokenizer {
    /// Exchange card data for an opaque descriptor/value pair
    async fn dispatch(&self, auth: &AuthData, card: &CardInput) -> Result<OpaqueData>;
}

/// Vendor-hosted card fields (Flex microform style)
#[async_trait(?Send)]
pub trait MicroformSdk {
    /// Tokenize whatever the vendor fields hold
    async fn create_token(&self, expiry: &ExpiryDate) -> Result<String>;
}

/// Vendor payment and verification dialogs
pub trait HostedDialog {
    /// Open the payment iframe loaded with `iframe_token`
    fn open_payment(&self, iframe_token: &str) -> Result<()>;

    /// Open the 3-D Secure challenge for a gateway reference
    fn open_challenge(&self, reference_id: &str) -> Result<()>;
}

/// Provides vendor handles for the selected strategy
#[async_trait(?Send)]
pub trait VendorFactory {
    fn card_tokenizer(&self) -> Result<Rc<dyn CardTokenizer>>;

    /// Load the microform SDK and mount its fields, resolving once ready
    async fn load_microform(&self, config: &MicroformConfig) -> Result<Rc<dyn MicroformSdk>>;

    fn hosted_dialog(&self) -> Result<Rc<dyn HostedDialog>>;
}
