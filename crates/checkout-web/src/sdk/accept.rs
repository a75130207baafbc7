//! Authorize.Net Accept.js binding

use async_trait::async_trait;
use futures::channel::oneshot;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use checkout_core::vendor::{AuthData, CardTokenizer, OpaqueData};
use checkout_core::{CardInput, CheckoutError, Result};

use super::{from_js, to_js};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Accept, js_name = dispatchData, catch)]
    fn dispatch_data(secure_data: &JsValue, callback: &js_sys::Function) -> std::result::Result<(), JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SecureData<'a> {
    auth_data: SecureAuth<'a>,
    card_data: SecureCard<'a>,
}

#[derive(Serialize)]
struct SecureAuth<'a> {
    #[serde(rename = "clientKey")]
    client_key: &'a str,
    #[serde(rename = "apiLoginID")]
    api_login_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SecureCard<'a> {
    card_number: &'a str,
    month: &'a str,
    year: &'a str,
    card_code: &'a str,
    full_name: &'a str,
}

impl<'a> SecureData<'a> {
    fn new(auth: &'a AuthData, card: &'a CardInput) -> Self {
        Self {
            auth_data: SecureAuth {
                client_key: &auth.client_key,
                api_login_id: &auth.api_login_id,
            },
            card_data: SecureCard {
                card_number: &card.number,
                month: &card.expiry_month,
                year: &card.expiry_year,
                card_code: &card.security_code,
                full_name: &card.full_name,
            },
        }
    }
}

/// `responseHandler` argument
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AcceptResponse {
    messages: ResponseMessages,
    #[serde(default)]
    opaque_data: Option<ResponseOpaque>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseMessages {
    result_code: String,
    #[serde(default)]
    message: Vec<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    code: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseOpaque {
    data_descriptor: String,
    data_value: String,
}

impl AcceptResponse {
    pub(crate) fn into_opaque(self) -> Result<OpaqueData> {
        if self.messages.result_code == "Error" {
            let text = self
                .messages
                .message
                .iter()
                .map(|m| m.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            tracing::debug!(
                codes = ?self.messages.message.iter().map(|m| m.code.as_str()).collect::<Vec<_>>(),
                "Accept.js rejected card data"
            );
            return Err(CheckoutError::Tokenization(text));
        }

        // A missing payload is caught as an empty token downstream
        let (descriptor, value) = self
            .opaque_data
            .map(|o| (o.data_descriptor, o.data_value))
            .unwrap_or_default();
        Ok(OpaqueData { descriptor, value })
    }
}

/// `Accept.dispatchData` as a future
pub struct AcceptTokenizer;

#[async_trait(?Send)]
impl CardTokenizer for AcceptTokenizer {
    async fn dispatch(&self, auth: &AuthData, card: &CardInput) -> Result<OpaqueData> {
        let secure_data = to_js(&SecureData::new(auth, card))?;

        let (tx, rx) = oneshot::channel::<JsValue>();
        let callback = Closure::once_into_js(move |response: JsValue| {
            let _ = tx.send(response);
        });

        dispatch_data(&secure_data, callback.unchecked_ref())
            .map_err(|e| CheckoutError::SdkLoad(format!("Accept.dispatchData: {e:?}")))?;

        let response = rx
            .await
            .map_err(|_| CheckoutError::Tokenization("Accept.js dropped the request".into()))?;
        from_js::<AcceptResponse>(&response)?.into_opaque()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_result_joins_messages() {
        let response: AcceptResponse = serde_json::from_str(
            r#"{"messages": {"resultCode": "Error", "message": [
                {"code": "E_WC_05", "text": "Please provide valid credit card number."},
                {"code": "E_WC_08", "text": "Expiration date must be in the future."}
            ]}}"#,
        )
        .unwrap();

        assert_eq!(
            response.into_opaque(),
            Err(CheckoutError::Tokenization(
                "Please provide valid credit card number. Expiration date must be in the future.".into()
            ))
        );
    }

    #[test]
    fn test_ok_result_yields_opaque_data() {
        let response: AcceptResponse = serde_json::from_str(
            r#"{"messages": {"resultCode": "Ok", "message": [{"code": "I_WC_01", "text": "Successful."}]},
                "opaqueData": {"dataDescriptor": "COMMON.ACCEPT.INAPP.PAYMENT", "dataValue": "eyJj"}}"#,
        )
        .unwrap();

        let opaque = response.into_opaque().unwrap();
        assert_eq!(opaque.descriptor, "COMMON.ACCEPT.INAPP.PAYMENT");
        assert_eq!(opaque.value, "eyJj");
    }

    #[test]
    fn test_secure_data_shape() {
        let auth = AuthData { client_key: "ck".into(), api_login_id: "id".into() };
        let card = CardInput {
            number: "4111111111111111".into(),
            expiry_month: "09".into(),
            expiry_year: "30".into(),
            security_code: "123".into(),
            full_name: "Jane Doe".into(),
        };
        let json = serde_json::to_value(SecureData::new(&auth, &card)).unwrap();
        assert_eq!(json["authData"]["apiLoginID"], "id");
        assert_eq!(json["authData"]["clientKey"], "ck");
        assert_eq!(json["cardData"]["cardNumber"], "4111111111111111");
        assert_eq!(json["cardData"]["cardCode"], "123");
        assert_eq!(json["cardData"]["fullName"], "Jane Doe");
    }
}
