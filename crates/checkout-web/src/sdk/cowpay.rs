//! Cowpay iframe and OTP dialogs

use wasm_bindgen::prelude::*;
use web_sys::Document;

use checkout_core::vendor::HostedDialog;
use checkout_core::{CheckoutError, Result};

pub const IFRAME_CONTAINER_ID: &str = "cowpay-iframe-container";
pub const OTP_CONTAINER_ID: &str = "cowpay-otp-container";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = COWPAYIFRAMEDIALOG, js_name = init, catch)]
    fn iframe_init() -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = COWPAYIFRAMEDIALOG, js_name = load, catch)]
    fn iframe_load(token: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = COWPAYOTPDIALOG, js_name = init, catch)]
    fn otp_init() -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = COWPAYOTPDIALOG, js_name = load, catch)]
    fn otp_load(reference_id: &str) -> std::result::Result<(), JsValue>;
}

/// Dialogs provided by the Cowpay plugin script
pub struct CowpayDialog {
    document: Document,
}

impl CowpayDialog {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The plugin renders into a fixed element id; create it once.
    fn ensure_container(&self, id: &str) -> Result<()> {
        if self.document.get_element_by_id(id).is_some() {
            return Ok(());
        }
        let body = self
            .document
            .body()
            .ok_or_else(|| CheckoutError::SdkLoad("document has no body".into()))?;
        let container = self
            .document
            .create_element("div")
            .map_err(|e| CheckoutError::SdkLoad(format!("{e:?}")))?;
        container.set_id(id);
        body.append_child(&container)
            .map_err(|e| CheckoutError::SdkLoad(format!("{e:?}")))?;
        Ok(())
    }
}

fn plugin_error(e: JsValue) -> CheckoutError {
    CheckoutError::SdkLoad(format!("Cowpay plugin: {e:?}"))
}

impl HostedDialog for CowpayDialog {
    fn open_payment(&self, iframe_token: &str) -> Result<()> {
        self.ensure_container(IFRAME_CONTAINER_ID)?;
        iframe_init().map_err(plugin_error)?;
        iframe_load(iframe_token).map_err(plugin_error)?;
        tracing::debug!("Cowpay payment dialog opened");
        Ok(())
    }

    fn open_challenge(&self, reference_id: &str) -> Result<()> {
        self.ensure_container(OTP_CONTAINER_ID)?;
        otp_init().map_err(plugin_error)?;
        otp_load(reference_id).map_err(plugin_error)?;
        tracing::debug!("Cowpay OTP dialog opened");
        Ok(())
    }
}
