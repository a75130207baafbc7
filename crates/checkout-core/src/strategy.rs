//! Tokenization Strategies
//!
//! A closed set of processor strategies behind one interface. The page's
//! `processor` discriminator picks the variant at startup; the orchestrator
//! drives each one through the same validate → tokenize → submit steps.
//!
//! ```text
//! ┌──────────────────┐   ┌───────────────────┐   ┌──────────────────┐
//! │  DirectTokenize  │   │     Microform     │   │  HostedRedirect  │
//! │ card → SDK →     │   │ vendor fields →   │   │ dialog / page →  │
//! │ descriptor/value │   │ transient token   │   │ gateway message  │
//! └──────────────────┘   └───────────────────┘   └──────────────────┘
//! ```

use std::rc::Rc;

use crate::card::{CardField, ExpiryDate};
use crate::config::{
    require, CheckoutConfiguration, DirectTokenizeConfig, HostedRedirectConfig, MicroformConfig,
    Messages, ProcessorConfig, ResumeRule,
};
use crate::error::{CheckoutError, Result};
use crate::form::{BoundFields, FieldSelectors, FormHost, ValidationProfile};
use crate::host::Navigator;
use crate::vendor::{
    AuthData, CardTokenizer, HostedDialog, MicroformSdk, TokenizationResult, VendorFactory,
};

/// How a hosted checkout is opened
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostedLaunch {
    /// Vendor iframe dialog on top of the page
    Dialog,
    /// Full navigation to the gateway's payment page
    Page,
}

/// Selected processor strategy with its vendor handle
pub enum Strategy {
    DirectTokenize {
        config: DirectTokenizeConfig,
        sdk: Rc<dyn CardTokenizer>,
    },
    Microform {
        config: MicroformConfig,
        /// `None` when the SDK failed to load; submission stays blocked
        sdk: Option<Rc<dyn MicroformSdk>>,
    },
    HostedRedirect {
        processor: &'static str,
        config: HostedRedirectConfig,
        launch: HostedLaunch,
        dialog: Option<Rc<dyn HostedDialog>>,
        message_source: String,
        resume: ResumeRule,
    },
}

/// Result of attaching a strategy
pub struct Attachment {
    pub strategy: Strategy,

    /// Non-fatal attach failure to show once the page is bound
    pub warning: Option<CheckoutError>,
}

/// Input gathered during validation, consumed by the vendor call
pub enum Prepared {
    Direct {
        auth: AuthData,
        card: crate::card::CardInput,
    },
    Microform {
        expiry: ExpiryDate,
    },
}

impl Strategy {
    /// Select and attach the strategy for `config`.
    pub async fn attach(config: &CheckoutConfiguration, vendors: &dyn VendorFactory) -> Result<Attachment> {
        let attachment = match &config.processor {
            ProcessorConfig::Authorizenet(c) => Attachment {
                strategy: Strategy::DirectTokenize {
                    config: c.clone(),
                    sdk: vendors.card_tokenizer()?,
                },
                warning: None,
            },

            ProcessorConfig::CybersourceMicroform(c) => {
                let loaded = match require(&c.capture_context, "capture_context") {
                    Ok(_) => vendors.load_microform(c).await,
                    Err(e) => Err(e),
                };
                match loaded {
                    Ok(sdk) => Attachment {
                        strategy: Strategy::Microform { config: c.clone(), sdk: Some(sdk) },
                        warning: None,
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "Microform SDK unavailable");
                        Attachment {
                            strategy: Strategy::Microform { config: c.clone(), sdk: None },
                            warning: Some(e),
                        }
                    }
                }
            }

            ProcessorConfig::Cowpay(c) => Self::hosted("cowpay", c, HostedLaunch::Dialog, vendors),
            ProcessorConfig::Elavon(c) => Self::hosted("elavon", c, HostedLaunch::Page, vendors),
        };

        tracing::info!(processor = attachment.strategy.processor(), "Attached checkout strategy");
        Ok(attachment)
    }

    fn hosted(
        processor: &'static str,
        config: &HostedRedirectConfig,
        launch: HostedLaunch,
        vendors: &dyn VendorFactory,
    ) -> Attachment {
        let (dialog, warning) = match launch {
            HostedLaunch::Dialog => match vendors.hosted_dialog() {
                Ok(dialog) => (Some(dialog), None),
                Err(e) => (None, Some(e)),
            },
            HostedLaunch::Page => (None, None),
        };

        let resume = config.resume.clone().unwrap_or_else(|| match launch {
            HostedLaunch::Page => ResumeRule::elavon(),
            HostedLaunch::Dialog => ResumeRule::tagged(processor),
        });

        Attachment {
            strategy: Strategy::HostedRedirect {
                processor,
                config: config.clone(),
                launch,
                dialog,
                message_source: crate::config::present(&config.message_source)
                    .unwrap_or(processor)
                    .to_string(),
                resume,
            },
            warning,
        }
    }

    pub fn processor(&self) -> &'static str {
        match self {
            Strategy::DirectTokenize { .. } => "authorizenet",
            Strategy::Microform { .. } => "cybersource_microform",
            Strategy::HostedRedirect { processor, .. } => *processor,
        }
    }

    pub fn profile(&self) -> ValidationProfile {
        match self {
            Strategy::DirectTokenize { .. } => ValidationProfile::direct_tokenize(),
            Strategy::Microform { .. } => ValidationProfile::microform(),
            Strategy::HostedRedirect { .. } => ValidationProfile::hosted(),
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self, Strategy::HostedRedirect { .. })
    }

    /// Check everything the vendor call needs, without calling it.
    pub fn prepare(&self, host: &dyn FormHost, fields: &BoundFields, messages: &Messages) -> Result<Prepared> {
        match self {
            Strategy::DirectTokenize { config, .. } => {
                let auth = AuthData {
                    client_key: require(&config.client_key, "client_key")?.to_string(),
                    api_login_id: require(&config.api_login_id, "api_login_id")?.to_string(),
                };
                require(&config.post_url, "post_url")?;
                Ok(Prepared::Direct { auth, card: fields.read_card(host) })
            }

            Strategy::Microform { config, sdk } => {
                if sdk.is_none() {
                    return Err(CheckoutError::SdkLoad("microform not loaded".into()));
                }
                require(&config.post_url, "post_url")?;
                let month = host.field_value(CardField::ExpiryMonth).unwrap_or_default();
                let year = host.field_value(CardField::ExpiryYear).unwrap_or_default();
                let expiry = ExpiryDate::parse_strict(&month, &year, messages)?;
                Ok(Prepared::Microform { expiry })
            }

            Strategy::HostedRedirect { .. } => Err(CheckoutError::Config(
                "hosted checkouts do not tokenize in-page".into(),
            )),
        }
    }

    /// Call the vendor. The only suspension point of an in-page attempt.
    pub async fn tokenize(&self, prepared: &Prepared) -> Result<TokenizationResult> {
        let result = match (self, prepared) {
            (Strategy::DirectTokenize { sdk, .. }, Prepared::Direct { auth, card }) => {
                TokenizationResult::Opaque(sdk.dispatch(auth, card).await?)
            }
            (Strategy::Microform { sdk: Some(sdk), .. }, Prepared::Microform { expiry }) => {
                TokenizationResult::Transient(sdk.create_token(expiry).await?)
            }
            _ => {
                return Err(CheckoutError::Config("strategy and input do not match".into()));
            }
        };

        if result.is_complete() {
            Ok(result)
        } else {
            Err(CheckoutError::Tokenization("payment service returned an empty token".into()))
        }
    }

    /// Write the token into the form and blank the raw card fields.
    pub fn apply_token(
        &self,
        token: &TokenizationResult,
        host: &dyn FormHost,
        fields: &BoundFields,
        selectors: &FieldSelectors,
    ) {
        match token {
            TokenizationResult::Opaque(data) => {
                host.set_hidden(&selectors.data_descriptor, &data.descriptor);
                host.set_hidden(&selectors.data_value, &data.value);
            }
            TokenizationResult::Transient(token) => {
                host.set_hidden(&selectors.token_name, token);
            }
        }
        fields.clear_sensitive(host);
    }

    /// Open the hosted checkout instead of submitting the local form.
    pub fn launch_hosted(&self, navigator: &dyn Navigator) -> Result<()> {
        let Strategy::HostedRedirect { config, launch, dialog, .. } = self else {
            return Err(CheckoutError::Config("not a hosted checkout".into()));
        };

        match launch {
            HostedLaunch::Dialog => {
                let token = require(&config.iframe_token, "iframe_token")?;
                let dialog = dialog
                    .as_ref()
                    .ok_or_else(|| CheckoutError::SdkLoad("payment dialog not available".into()))?;
                dialog.open_payment(token)
            }
            HostedLaunch::Page => {
                let url = crate::config::present(&config.payment_page_url)
                    .or_else(|| crate::config::present(&config.receipt_url))
                    .ok_or(CheckoutError::MissingConfig("payment_page_url"))?;
                navigator.redirect(url);
                Ok(())
            }
        }
    }

    /// Open the verification dialog for a challenged payment.
    pub fn open_challenge(&self, reference_id: &str) -> Result<()> {
        match self {
            Strategy::HostedRedirect { dialog: Some(dialog), .. } => dialog.open_challenge(reference_id),
            _ => Err(CheckoutError::SdkLoad("verification dialog not available".into())),
        }
    }
}
