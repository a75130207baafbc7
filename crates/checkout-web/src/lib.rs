//! checkout-web
//!
//! Browser side of the checkout adapter: DOM form, vendor scripts, execution
//! endpoint and the Leptos subscription admin views.
//!
//! The server template either sets `window.CheckoutConfig` before the module
//! loads, or calls `init_checkout(config)` itself.

mod admin;
mod dom;
mod execution;
mod mount;
mod page;
mod sdk;
mod telemetry;

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Context};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use checkout_core::{CheckoutAdapter, CheckoutConfiguration, Hosts};

pub use admin::{PaymentsToggleButton, SubscriptionAdmin, SubscriptionList};
pub use dom::DomForm;
pub use execution::HttpExecution;
pub use mount::MountedCheckout;
pub use page::{BrowserNavigator, BrowserTimer, MessageSubscription};
pub use sdk::BrowserVendors;

/// Page global read by `start`
const CONFIG_GLOBAL: &str = "CheckoutConfig";

thread_local! {
    static MOUNTED: RefCell<Option<MountedCheckout>> = const { RefCell::new(None) };
}

/// WASM entry point
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let Some(window) = web_sys::window() else {
        return;
    };
    let config = js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL))
        .unwrap_or(JsValue::UNDEFINED);
    // Logging waits for a configuration so `log_filter` can apply
    if config.is_undefined() || config.is_null() {
        return;
    }

    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = init_checkout(config).await {
            web_sys::console::error_1(&e);
        }
    });
}

/// Attach the checkout adapter to the payment form.
///
/// Replaces any adapter mounted earlier on this page.
#[wasm_bindgen]
pub async fn init_checkout(config: JsValue) -> Result<(), JsValue> {
    boot(config)
        .await
        .map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

async fn boot(raw: JsValue) -> anyhow::Result<()> {
    let json = js_sys::JSON::stringify(&raw)
        .ok()
        .and_then(|s| s.as_string())
        .ok_or_else(|| anyhow!("checkout configuration is not JSON-serializable"))?;
    let config = CheckoutConfiguration::from_json(&json).context("parsing checkout configuration")?;
    telemetry::init(config.log_filter.as_deref());

    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    let document = window.document().ok_or_else(|| anyhow!("no document"))?;

    let form = Rc::new(DomForm::locate(document.clone(), &config));
    let hosts = Hosts {
        form: form.clone(),
        navigator: Rc::new(BrowserNavigator::new(window.clone())),
        execution: Rc::new(HttpExecution::new(window.location().href().ok())),
        timer: Rc::new(BrowserTimer),
    };
    let vendors = BrowserVendors::new(window.clone(), document, config.vendor_timeout());

    let adapter = CheckoutAdapter::init(config, hosts, &vendors)
        .await
        .context("attaching checkout")?;
    tracing::info!(processor = adapter.processor(), state = ?adapter.state(), "Checkout ready");

    let mounted = MountedCheckout::mount(&window, &form, adapter)?;
    MOUNTED.with(|slot| slot.replace(Some(mounted)));
    Ok(())
}

/// Render the subscription admin into the element with id `root_id`.
#[wasm_bindgen]
pub fn mount_subscription_admin(root_id: &str, currency: String) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    telemetry::init(None);

    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(root_id))
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
        .ok_or_else(|| JsValue::from_str(&format!("#{root_id} not found")))?;

    leptos::mount::mount_to(root, move || admin_view(currency)).forget();
    Ok(())
}

fn admin_view(currency: String) -> impl leptos::prelude::IntoView {
    use leptos::prelude::*;

    view! { <SubscriptionAdmin currency=currency /> }
}
