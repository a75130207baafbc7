//! Window services: navigation, timers and cross-window messages

use std::time::Duration;

use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{MessageEvent, UrlSearchParams, Window};

use checkout_core::{Navigator, Timer};

pub struct BrowserNavigator {
    window: Window,
}

impl BrowserNavigator {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Navigator for BrowserNavigator {
    fn redirect(&self, url: &str) {
        if let Err(e) = self.window.location().set_href(url) {
            tracing::error!(url, error = ?e, "Navigation failed");
        }
    }

    fn query_param(&self, name: &str) -> Option<String> {
        let search = self.window.location().search().ok()?;
        UrlSearchParams::new_with_str(&search).ok()?.get(name)
    }
}

pub struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).await;
    }
}

/// A window `message` listener, removed again on drop
pub struct MessageSubscription {
    window: Window,
    callback: Closure<dyn FnMut(MessageEvent)>,
}

impl MessageSubscription {
    /// Listen for messages whose data is JSON-representable.
    pub fn listen(window: &Window, mut handler: impl FnMut(Value) + 'static) -> anyhow::Result<Self> {
        let callback = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            match message_data(&event) {
                Some(data) => handler(data),
                None => tracing::trace!("Skipping non-JSON window message"),
            }
        });
        window
            .add_event_listener_with_callback("message", callback.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("adding message listener: {e:?}"))?;

        Ok(Self { window: window.clone(), callback })
    }
}

impl Drop for MessageSubscription {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("message", self.callback.as_ref().unchecked_ref());
    }
}

fn message_data(event: &MessageEvent) -> Option<Value> {
    let text = js_sys::JSON::stringify(&event.data()).ok()?.as_string()?;
    serde_json::from_str(&text).ok()
}
