//! # checkout-core
//!
//! Gateway-agnostic checkout adapter for the storefront's payment page.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      CheckoutAdapter                          │
//! │  ┌──────────────┐  ┌────────────────┐  ┌──────────────────┐  │
//! │  │ FieldBinder  │  │   Strategy     │  │  Orchestrator    │  │
//! │  │ & Validator  │──│ (per gateway)  │──│  state machine   │  │
//! │  └──────────────┘  └────────────────┘  └──────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//!          │                   │                    │
//!      FormHost          VendorFactory     Navigator / ExecutionClient
//! ```
//!
//! The page (DOM, vendor SDKs, fetch, timers) is reached only through the
//! traits in [`form`], [`vendor`] and [`host`], so the whole flow runs
//! natively in tests. `checkout-web` provides the browser implementations.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_core::{CheckoutAdapter, CheckoutConfiguration};
//!
//! let config = CheckoutConfiguration::from_json(&page_json)?;
//! let adapter = CheckoutAdapter::init(config, hosts, &vendors).await?;
//!
//! // submit button
//! spawn_local(adapter.on_submit_click());
//! ```

pub mod admin;
pub mod card;
pub mod config;
pub mod error;
pub mod form;
pub mod host;
pub mod message;
pub mod orchestrator;
pub mod strategy;
pub mod vendor;

pub use card::{is_valid_card_number, CardField, CardInput, ExpiryDate};
pub use config::{CheckoutConfiguration, Messages, ProcessorConfig};
pub use error::{CheckoutError, ErrorKind, Result};
pub use form::{BoundFields, FieldBinder, FieldSelectors, FormHost};
pub use host::{ExecutionClient, Hosts, Navigator, Timer};
pub use message::{GatewayMessage, GatewayStatus};
pub use orchestrator::{CheckoutAdapter, ClickOutcome, MessageOutcome, SubmissionState};
pub use strategy::Strategy;
pub use vendor::{CardTokenizer, HostedDialog, MicroformSdk, TokenizationResult, VendorFactory};
