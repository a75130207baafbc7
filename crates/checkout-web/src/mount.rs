//! Wiring the adapter to page events

use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlInputElement, Window};

use checkout_core::{CardField, CheckoutAdapter};

use crate::dom::DomForm;
use crate::page::MessageSubscription;

/// DOM event listener removed on drop
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(target: EventTarget, kind: &'static str, handler: impl FnMut(Event) + 'static) -> anyhow::Result<Self> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("adding {kind} listener: {e:?}"))?;
        Ok(Self { target, kind, callback })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// An adapter with its page listeners; dropping it detaches everything
pub struct MountedCheckout {
    adapter: Rc<CheckoutAdapter>,
    _listeners: Vec<Listener>,
    _messages: MessageSubscription,
}

impl MountedCheckout {
    pub fn mount(window: &Window, form: &DomForm, adapter: Rc<CheckoutAdapter>) -> anyhow::Result<Self> {
        let mut listeners = Vec::new();

        match form.submit_button() {
            Some(button) => {
                let adapter = Rc::clone(&adapter);
                listeners.push(Listener::attach(button.into(), "click", move |event: Event| {
                    event.prevent_default();
                    let attempt = adapter.on_submit_click();
                    wasm_bindgen_futures::spawn_local(async move {
                        let outcome = attempt.await;
                        tracing::debug!(outcome = ?outcome, "Submit click handled");
                    });
                })?);
            }
            None => tracing::warn!(processor = adapter.processor(), "Submit button not found"),
        }

        if let Some(number) = form.input(CardField::Number) {
            let adapter = Rc::clone(&adapter);
            listeners.push(Listener::attach(number.into(), "keyup", move |event: Event| {
                if let Some(input) = event.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) {
                    adapter.on_card_number_input(&input.value());
                }
            })?);
        }

        let messages = {
            let adapter = Rc::clone(&adapter);
            MessageSubscription::listen(window, move |data| {
                let handled = adapter.on_gateway_message(&data);
                wasm_bindgen_futures::spawn_local(async move {
                    let outcome = handled.await;
                    tracing::debug!(outcome = ?outcome, "Gateway message handled");
                });
            })?
        };

        Ok(Self { adapter, _listeners: listeners, _messages: messages })
    }

    pub fn adapter(&self) -> &Rc<CheckoutAdapter> {
        &self.adapter
    }
}
