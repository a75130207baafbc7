//! Admin API Client

use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

use checkout_core::admin::{
    cookie_value, AdminMethod, PaymentsToggle, SubscriptionListing, SubscriptionRecord, CSRF_COOKIE,
    CSRF_HEADER, SUBSCRIPTIONS_PATH,
};

fn origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

fn csrf_token() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let cookies = document.dyn_ref::<HtmlDocument>()?.cookie().ok()?;
    cookie_value(&cookies, CSRF_COOKIE)
}

async fn send(method: AdminMethod, path: &str) -> Result<String, String> {
    let client = reqwest::Client::new();
    let url = format!("{}{}", origin(), path);
    let mut request = match method {
        AdminMethod::Get => client.get(url),
        AdminMethod::Post => client.post(url),
    };
    if let Some(token) = csrf_token() {
        request = request.header(CSRF_HEADER, token);
    }

    let response = request.send().await.map_err(|e| e.to_string())?;
    if response.status().is_success() {
        response.text().await.map_err(|e| e.to_string())
    } else {
        Err(format!("Request failed ({})", response.status()))
    }
}

/// Load the subscription list
pub async fn fetch_subscriptions() -> Result<Vec<SubscriptionRecord>, String> {
    let body = send(AdminMethod::Get, SUBSCRIPTIONS_PATH).await?;
    SubscriptionListing::parse(&body).map_err(|e| e.to_string())
}

/// Read a payments switch. `None` when the switch has no status endpoint.
pub async fn fetch_toggle_state(toggle: PaymentsToggle) -> Option<Result<bool, String>> {
    let path = toggle.status_path()?;
    Some(match send(AdminMethod::Get, path).await {
        Ok(body) => toggle.parse_state(&body).map_err(|e| e.to_string()),
        Err(e) => Err(e),
    })
}

/// Flip a payments switch and return its new state
pub async fn flip_toggle(toggle: PaymentsToggle) -> Result<bool, String> {
    let (method, path) = toggle.flip_request();
    let body = send(method, path).await?;
    toggle.parse_state(&body).map_err(|e| e.to_string())
}
