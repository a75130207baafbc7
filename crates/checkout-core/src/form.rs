//! Field Binder & Validator
//!
//! Binds the checkout form through the [`FormHost`] seam, so the same rules
//! run against the browser DOM and against in-memory fakes in tests.

use std::collections::HashSet;

use serde::Deserialize;

use crate::card::{self, CardField, CardInput};
use crate::config::Messages;
use crate::error::{CheckoutError, Result};

/// DOM identifiers used by the storefront templates
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FieldSelectors {
    pub form_id: String,
    pub card_number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub security_code: String,
    pub full_name: String,

    /// Hidden fields receiving an opaque descriptor/value pair
    pub data_descriptor: String,
    pub data_value: String,

    /// Name of the hidden input appended for a transient token
    pub token_name: String,

    /// Container for live card-number feedback
    pub card_hint_class: String,

    /// Page-level error banner, created on demand
    pub banner_id: String,

    /// Overrides the processor's `payment-button-<slug>` convention
    pub submit_button: Option<String>,

    /// Overrides the processor's `<slug>-error` convention
    pub error_class: Option<String>,
}

impl Default for FieldSelectors {
    fn default() -> Self {
        Self {
            form_id: "paymentForm".into(),
            card_number: "id_card_number".into(),
            expiry_month: "id_expiry_month".into(),
            expiry_year: "id_expiry_year".into(),
            security_code: "id_card_code".into(),
            full_name: "id_full_name".into(),
            data_descriptor: "id_data_descriptor".into(),
            data_value: "id_data_value".into(),
            token_name: "token".into(),
            card_hint_class: "help-block-card".into(),
            banner_id: "payment-error-banner".into(),
            submit_button: None,
            error_class: None,
        }
    }
}

impl FieldSelectors {
    pub fn field_id(&self, field: CardField) -> &str {
        match field {
            CardField::Number => &self.card_number,
            CardField::ExpiryMonth => &self.expiry_month,
            CardField::ExpiryYear => &self.expiry_year,
            CardField::SecurityCode => &self.security_code,
            CardField::FullName => &self.full_name,
        }
    }
}

/// Checkout form as seen by the adapter
///
/// Implementations must tolerate absent elements: every setter on a missing
/// field is a no-op and every getter returns `None`. The same holds for the
/// form element itself; see [`FormHost::has_form`].
pub trait FormHost {
    /// Whether the page renders the payment form element
    fn has_form(&self) -> bool;

    /// Whether the page renders this field
    fn has_field(&self, field: CardField) -> bool;

    fn field_value(&self, field: CardField) -> Option<String>;

    fn set_field_value(&self, field: CardField, value: &str);

    fn mark_required(&self, field: CardField);

    fn set_max_length(&self, field: CardField, max: u32);

    /// Point the native form at its submission URL
    fn set_action(&self, url: &str);

    /// Native constraint validation, without user feedback
    fn check_validity(&self) -> bool;

    /// Native constraint validation, highlighting failing fields
    fn report_validity(&self);

    /// Write a hidden field by id or name, appending it when absent
    fn set_hidden(&self, name: &str, value: &str);

    /// Submit the native form; the page navigates away
    fn submit(&self);

    fn set_submit_enabled(&self, enabled: bool);

    /// Live card-number feedback; `None` clears it
    fn show_card_hint(&self, message: Option<&str>);

    fn show_inline_error(&self, message: &str);

    fn clear_inline_errors(&self);

    fn show_banner(&self, message: &str);
}

/// Which fields a strategy needs from the page, and their length caps
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationProfile {
    pub required: Vec<CardField>,
    pub month_max_length: u32,
    pub year_max_length: u32,
}

impl ValidationProfile {
    /// Every card field lives in the page
    pub fn direct_tokenize() -> Self {
        Self {
            required: CardField::ALL.to_vec(),
            month_max_length: 2,
            year_max_length: 2,
        }
    }

    /// Number and security code live in vendor fields
    pub fn microform() -> Self {
        Self {
            required: vec![CardField::FullName, CardField::ExpiryMonth, CardField::ExpiryYear],
            month_max_length: 2,
            year_max_length: 4,
        }
    }

    /// The vendor dialog collects everything
    pub fn hosted() -> Self {
        Self {
            required: Vec::new(),
            month_max_length: 2,
            year_max_length: 4,
        }
    }
}

/// Fields found on the page at bind time
#[derive(Clone, Debug, Default)]
pub struct BoundFields {
    present: HashSet<CardField>,
}

/// Applies a [`ValidationProfile`] to the page
pub struct FieldBinder;

impl FieldBinder {
    /// Bind the form: mark required fields, cap lengths, set the action.
    ///
    /// Missing fields are recorded as absent and otherwise skipped.
    pub fn bind(host: &dyn FormHost, profile: &ValidationProfile, action: Option<&str>) -> BoundFields {
        if let Some(url) = action {
            host.set_action(url);
        }

        let present: HashSet<CardField> = CardField::ALL
            .into_iter()
            .filter(|f| host.has_field(*f))
            .collect();

        for field in &profile.required {
            if present.contains(field) {
                host.mark_required(*field);
            } else {
                tracing::debug!(field = %field, "Required field not rendered, skipping");
            }
        }

        if present.contains(&CardField::ExpiryMonth) {
            host.set_max_length(CardField::ExpiryMonth, profile.month_max_length);
        }
        if present.contains(&CardField::ExpiryYear) {
            host.set_max_length(CardField::ExpiryYear, profile.year_max_length);
        }

        BoundFields { present }
    }

    /// Run native validation, reporting failures to the user.
    ///
    /// A page without the form element cannot submit a token and fails here.
    pub fn check_form_validity(host: &dyn FormHost) -> Result<()> {
        if !host.has_form() {
            return Err(CheckoutError::Config("payment form not rendered".into()));
        }
        if host.check_validity() {
            Ok(())
        } else {
            host.report_validity();
            Err(CheckoutError::Validation)
        }
    }
}

impl BoundFields {
    pub fn is_bound(&self, field: CardField) -> bool {
        self.present.contains(&field)
    }

    /// Live feedback while the buyer types a card number
    pub fn on_card_number_input(&self, host: &dyn FormHost, messages: &Messages, value: &str) -> bool {
        if !self.is_bound(CardField::Number) {
            return true;
        }
        let valid = card::is_valid_card_number(value);
        if valid {
            host.show_card_hint(None);
        } else {
            host.show_card_hint(Some(&messages.invalid_card_number));
        }
        valid
    }

    /// Snapshot the card fields for one attempt
    pub fn read_card(&self, host: &dyn FormHost) -> CardInput {
        let read = |field| {
            if self.is_bound(field) {
                host.field_value(field).unwrap_or_default()
            } else {
                String::new()
            }
        };
        CardInput {
            number: read(CardField::Number),
            expiry_month: read(CardField::ExpiryMonth),
            expiry_year: read(CardField::ExpiryYear),
            security_code: read(CardField::SecurityCode),
            full_name: read(CardField::FullName),
        }
    }

    /// Blank every sensitive card field on the page
    pub fn clear_sensitive(&self, host: &dyn FormHost) {
        for field in CardField::ALL.into_iter().filter(CardField::is_sensitive) {
            if self.is_bound(field) {
                host.set_field_value(field, "");
            }
        }
    }
}
