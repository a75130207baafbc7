//! CyberSource Flex Microform binding

use async_trait::async_trait;
use futures::channel::oneshot;
use serde::Deserialize;
use serde_json::json;
use wasm_bindgen::prelude::*;

use checkout_core::vendor::MicroformSdk;
use checkout_core::{CheckoutError, ExpiryDate, Result};

use super::{from_js, to_js};

/// Host elements the vendor iframes are mounted into
pub const NUMBER_CONTAINER: &str = "#number-container";
pub const SECURITY_CODE_CONTAINER: &str = "#securityCode-container";

#[wasm_bindgen]
extern "C" {
    type Flex;

    #[wasm_bindgen(constructor, catch)]
    fn new(capture_context: &str) -> std::result::Result<Flex, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn microform(this: &Flex, options: &JsValue) -> std::result::Result<Microform, JsValue>;

    type Microform;

    #[wasm_bindgen(method, js_name = createField, catch)]
    fn create_field(this: &Microform, name: &str, options: &JsValue) -> std::result::Result<MicroformField, JsValue>;

    #[wasm_bindgen(method, js_name = createToken, catch)]
    fn create_token(this: &Microform, options: &JsValue, callback: &js_sys::Function) -> std::result::Result<(), JsValue>;

    type MicroformField;

    #[wasm_bindgen(method, catch)]
    fn load(this: &MicroformField, container: &str) -> std::result::Result<(), JsValue>;
}

/// Error object passed to the `createToken` callback
#[derive(Debug, Deserialize)]
struct FlexError {
    #[serde(default)]
    message: String,
}

fn field_styles() -> serde_json::Value {
    json!({
        "input": {
            "font-size": "14px",
            "font-family": "helvetica, tahoma, calibri, sans-serif",
            "color": "#555"
        },
        ":focus": { "color": "blue" },
        ":disabled": { "cursor": "not-allowed" },
        "valid": { "color": "#3c763d" },
        "invalid": { "color": "#a94442" }
    })
}

fn js_error(context: &str, e: &JsValue) -> CheckoutError {
    CheckoutError::SdkLoad(format!("{context}: {e:?}"))
}

/// Loaded microform with its number and security code fields mounted
pub struct FlexMicroform {
    microform: Microform,
}

impl FlexMicroform {
    /// Build the microform from a capture context. The Flex script must be loaded.
    pub fn mount(capture_context: &str) -> Result<Self> {
        let flex = Flex::new(capture_context).map_err(|e| js_error("new Flex", &e))?;
        let microform = flex
            .microform(&to_js(&json!({ "styles": field_styles() }))?)
            .map_err(|e| js_error("flex.microform", &e))?;

        for (name, placeholder, container) in [
            ("number", "Enter card number", NUMBER_CONTAINER),
            ("securityCode", "•••", SECURITY_CODE_CONTAINER),
        ] {
            let field = microform
                .create_field(name, &to_js(&json!({ "placeholder": placeholder }))?)
                .map_err(|e| js_error("createField", &e))?;
            field.load(container).map_err(|e| js_error("field.load", &e))?;
        }

        tracing::debug!("Microform fields mounted");
        Ok(Self { microform })
    }
}

#[async_trait(?Send)]
impl MicroformSdk for FlexMicroform {
    async fn create_token(&self, expiry: &ExpiryDate) -> Result<String> {
        // Serializes as { expirationMonth, expirationYear }
        let options = to_js(expiry)?;

        let (tx, rx) = oneshot::channel::<(JsValue, JsValue)>();
        let callback = Closure::once_into_js(move |err: JsValue, token: JsValue| {
            let _ = tx.send((err, token));
        });

        self.microform
            .create_token(&options, callback.unchecked_ref())
            .map_err(|e| js_error("createToken", &e))?;

        let (err, token) = rx
            .await
            .map_err(|_| CheckoutError::Tokenization("microform dropped the request".into()))?;

        if !err.is_null() && !err.is_undefined() {
            let err: FlexError = from_js(&err)?;
            return Err(CheckoutError::Tokenization(err.message));
        }
        Ok(token.as_string().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flex_error_message() {
        let err: FlexError =
            serde_json::from_str(r#"{"reason": "CREATE_TOKEN_VALIDATION_FIELDS", "message": "Validation error"}"#)
                .unwrap();
        assert_eq!(err.message, "Validation error");
    }
}
