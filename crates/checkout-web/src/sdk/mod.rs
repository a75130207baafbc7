//! Vendor SDK bindings
//!
//! Each vendor script is reached through `wasm-bindgen` externs. Values
//! cross the boundary as JSON so the Rust side stays plain serde types.

mod accept;
mod cowpay;
mod flex;

use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlScriptElement, Window};

use checkout_core::config::MicroformConfig;
use checkout_core::host::with_timeout;
use checkout_core::vendor::{CardTokenizer, HostedDialog, MicroformSdk, VendorFactory};
use checkout_core::{CheckoutError, Result};

use crate::page::BrowserTimer;

pub use accept::AcceptTokenizer;
pub use cowpay::CowpayDialog;
pub use flex::FlexMicroform;

pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    let text = serde_json::to_string(value)?;
    js_sys::JSON::parse(&text).map_err(|e| CheckoutError::Config(format!("{e:?}")))
}

pub(crate) fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T> {
    let text = js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_default();
    serde_json::from_str(&text)
        .map_err(|e| CheckoutError::Tokenization(format!("unexpected vendor response: {e}")))
}

fn has_global(window: &Window, name: &str) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str(name)).unwrap_or(false)
}

/// Append a `<script>` and wait for it to load or fail.
pub async fn load_script(document: &Document, src: &str) -> Result<()> {
    let script: HtmlScriptElement = document
        .create_element("script")
        .map_err(|e| CheckoutError::SdkLoad(format!("{e:?}")))?
        .dyn_into()
        .map_err(|_| CheckoutError::SdkLoad("script element unavailable".into()))?;

    let (tx, rx) = oneshot::channel::<bool>();
    let tx = Rc::new(std::cell::RefCell::new(Some(tx)));
    let settle = |loaded: bool| {
        let tx = Rc::clone(&tx);
        Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(loaded);
            }
        })
    };
    let on_load = settle(true);
    let on_error = settle(false);

    script.set_src(src);
    script.set_async(true);
    script.set_onload(Some(on_load.as_ref().unchecked_ref()));
    script.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    let head = document
        .head()
        .ok_or_else(|| CheckoutError::SdkLoad("document has no head".into()))?;
    head.append_child(&script)
        .map_err(|e| CheckoutError::SdkLoad(format!("{e:?}")))?;

    let loaded = rx.await.unwrap_or(false);
    script.set_onload(None);
    script.set_onerror(None);

    if loaded {
        tracing::debug!(src, "Vendor script loaded");
        Ok(())
    } else {
        Err(CheckoutError::SdkLoad(format!("failed to load {src}")))
    }
}

/// Vendor widgets backed by the page's scripts
pub struct BrowserVendors {
    window: Window,
    document: Document,
    load_timeout: Duration,
}

impl BrowserVendors {
    pub fn new(window: Window, document: Document, load_timeout: Duration) -> Self {
        Self { window, document, load_timeout }
    }
}

#[async_trait(?Send)]
impl VendorFactory for BrowserVendors {
    fn card_tokenizer(&self) -> Result<Rc<dyn CardTokenizer>> {
        if !has_global(&self.window, "Accept") {
            // dispatch reports the missing script at click time
            tracing::warn!("Accept.js is not loaded yet");
        }
        Ok(Rc::new(AcceptTokenizer))
    }

    async fn load_microform(&self, config: &MicroformConfig) -> Result<Rc<dyn MicroformSdk>> {
        if !has_global(&self.window, "Flex") {
            with_timeout(
                &BrowserTimer,
                self.load_timeout,
                load_script(&self.document, config.sdk_url()),
            )
            .await
            .map_err(|e| match e {
                CheckoutError::Timeout(ms) => CheckoutError::SdkLoad(format!("script load timed out after {ms} ms")),
                other => other,
            })?;
        }
        let context = config.capture_context.as_deref().unwrap_or_default();
        Ok(Rc::new(FlexMicroform::mount(context)?))
    }

    fn hosted_dialog(&self) -> Result<Rc<dyn HostedDialog>> {
        Ok(Rc::new(CowpayDialog::new(self.document.clone())))
    }
}
