//! Card Input
//!
//! Buyer-entered card fields and the checks that run on them before any
//! vendor call. Raw card values only live here for one submission attempt.

use serde::{Deserialize, Serialize};

use crate::config::Messages;
use crate::error::{CheckoutError, Result};

/// Minimum and maximum PAN length accepted by the checksum
const PAN_MIN_DIGITS: usize = 12;
const PAN_MAX_DIGITS: usize = 19;

/// Checkout form fields the adapter knows about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardField {
    Number,
    ExpiryMonth,
    ExpiryYear,
    SecurityCode,
    FullName,
}

impl CardField {
    pub const ALL: [CardField; 5] = [
        CardField::Number,
        CardField::ExpiryMonth,
        CardField::ExpiryYear,
        CardField::SecurityCode,
        CardField::FullName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardField::Number => "card number",
            CardField::ExpiryMonth => "expiry month",
            CardField::ExpiryYear => "expiry year",
            CardField::SecurityCode => "security code",
            CardField::FullName => "full name",
        }
    }

    /// Whether the value is sensitive card data that must be cleared after tokenization
    pub fn is_sensitive(&self) -> bool {
        !matches!(self, CardField::FullName)
    }
}

impl std::fmt::Display for CardField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card data for one submission attempt
///
/// Deliberately not `Serialize`; `Debug` only shows the last four digits.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardInput {
    pub number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub security_code: String,
    pub full_name: String,
}

impl CardInput {
    /// Last four digits of the card number, for log correlation
    pub fn last4(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(char::is_ascii_digit).collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }
}

impl std::fmt::Debug for CardInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardInput")
            .field("number", &format_args!("****{}", self.last4()))
            .field("expiry_month", &"**")
            .field("expiry_year", &"****")
            .field("security_code", &"***")
            .field("full_name", &"<redacted>")
            .finish()
    }
}

/// Check a card number with the Luhn checksum.
///
/// The empty string counts as valid ("not yet entered"). Spaces and dashes are
/// ignored; any other non-digit fails.
pub fn is_valid_card_number(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }

    let mut digits = Vec::with_capacity(PAN_MAX_DIGITS);
    for c in trimmed.chars() {
        match c {
            ' ' | '-' => continue,
            '0'..='9' => digits.push(c as u32 - '0' as u32),
            _ => return false,
        }
    }

    if !(PAN_MIN_DIGITS..=PAN_MAX_DIGITS).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// Expiry date in the strict format the microform vendor expects
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpiryDate {
    /// Two digits, "01" to "12"
    #[serde(rename = "expirationMonth")]
    pub month: String,

    /// Four digits
    #[serde(rename = "expirationYear")]
    pub year: String,
}

impl ExpiryDate {
    /// Validate a four-digit year and a two-digit month, year first.
    pub fn parse_strict(month: &str, year: &str, messages: &Messages) -> Result<Self> {
        let year = year.trim();
        let month = month.trim();

        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(CheckoutError::Format {
                field: CardField::ExpiryYear,
                message: messages.invalid_year.clone(),
            });
        }

        let month_ok = month.len() == 2
            && month.chars().all(|c| c.is_ascii_digit())
            && matches!(month.parse::<u8>(), Ok(1..=12));
        if !month_ok {
            return Err(CheckoutError::Format {
                field: CardField::ExpiryMonth,
                message: messages.invalid_month.clone(),
            });
        }

        Ok(Self {
            month: month.to_string(),
            year: year.to_string(),
        })
    }
}
