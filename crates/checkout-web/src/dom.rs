//! DOM-backed payment form

use anyhow::{anyhow, Context};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlFormElement, HtmlInputElement};

use checkout_core::{CardField, CheckoutConfiguration, FieldSelectors, FormHost};

const ERROR_STYLE: &str = "color: red";

/// The payment form as rendered by the server template
///
/// The form element is optional. Hosted checkouts work without it, and every
/// form-level call is skipped when it is absent.
pub struct DomForm {
    document: Document,
    form: Option<HtmlFormElement>,
    selectors: FieldSelectors,
    submit_button_id: String,
    error_class: String,
}

impl DomForm {
    /// Find the form the configuration points at.
    pub fn locate(document: Document, config: &CheckoutConfiguration) -> Self {
        let selectors = config.selectors.clone();
        let form = document
            .get_element_by_id(&selectors.form_id)
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok());
        if form.is_none() {
            tracing::warn!(form_id = %selectors.form_id, "Payment form not rendered");
        }

        Self {
            document,
            form,
            submit_button_id: config.submit_button_id(),
            error_class: config.error_class(),
            selectors,
        }
    }

    fn form(&self, operation: &str) -> Option<&HtmlFormElement> {
        if self.form.is_none() {
            tracing::debug!(operation, "No payment form, skipping");
        }
        self.form.as_ref()
    }

    pub fn submit_button(&self) -> Option<Element> {
        self.document.get_element_by_id(&self.submit_button_id)
    }

    pub fn input(&self, field: CardField) -> Option<HtmlInputElement> {
        self.document
            .get_element_by_id(self.selectors.field_id(field))?
            .dyn_into()
            .ok()
    }

    fn all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn error_containers(&self) -> Vec<Element> {
        self.all(&format!(".{}", self.error_class))
    }

    fn hidden_input(&self, name: &str) -> anyhow::Result<HtmlInputElement> {
        let form = self
            .form
            .as_ref()
            .ok_or_else(|| anyhow!("no payment form to hold {name}"))?;
        let existing = self
            .document
            .get_element_by_id(name)
            .or_else(|| {
                form.query_selector(&format!("input[name=\"{name}\"]"))
                    .ok()
                    .flatten()
            })
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        if let Some(input) = existing {
            return Ok(input);
        }

        let input: HtmlInputElement = self
            .document
            .create_element("input")
            .map_err(|e| anyhow!("{e:?}"))?
            .dyn_into()
            .map_err(|_| anyhow!("created element is not an input"))?;
        input.set_type("hidden");
        input.set_name(name);
        form.append_child(&input)
            .map_err(|e| anyhow!("{e:?}"))
            .context("appending hidden input")?;
        Ok(input)
    }
}

impl FormHost for DomForm {
    fn has_form(&self) -> bool {
        self.form.is_some()
    }

    fn has_field(&self, field: CardField) -> bool {
        self.input(field).is_some()
    }

    fn field_value(&self, field: CardField) -> Option<String> {
        self.input(field).map(|input| input.value())
    }

    fn set_field_value(&self, field: CardField, value: &str) {
        if let Some(input) = self.input(field) {
            input.set_value(value);
        }
    }

    fn mark_required(&self, field: CardField) {
        if let Some(input) = self.input(field) {
            input.set_required(true);
        }
    }

    fn set_max_length(&self, field: CardField, max: u32) {
        if let Some(input) = self.input(field) {
            input.set_max_length(i32::try_from(max).unwrap_or(i32::MAX));
        }
    }

    fn set_action(&self, url: &str) {
        if let Some(form) = self.form("set_action") {
            form.set_action(url);
        }
    }

    fn check_validity(&self) -> bool {
        self.form("check_validity").is_some_and(HtmlFormElement::check_validity)
    }

    fn report_validity(&self) {
        if let Some(form) = self.form("report_validity") {
            form.report_validity();
        }
    }

    fn set_hidden(&self, name: &str, value: &str) {
        match self.hidden_input(name) {
            Ok(input) => input.set_value(value),
            Err(e) => tracing::error!(name, error = %e, "Could not write hidden field"),
        }
    }

    fn submit(&self) {
        let Some(form) = self.form("submit") else {
            return;
        };
        if let Err(e) = form.submit() {
            tracing::error!(error = ?e, "Form submit rejected by the browser");
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        let Some(button) = self.submit_button() else {
            return;
        };
        match button.dyn_ref::<HtmlButtonElement>() {
            Some(button) => button.set_disabled(!enabled),
            None if enabled => {
                let _ = button.remove_attribute("disabled");
            }
            None => {
                let _ = button.set_attribute("disabled", "disabled");
            }
        }
    }

    fn show_card_hint(&self, message: Option<&str>) {
        for hint in self.all(&format!(".{}", self.selectors.card_hint_class)) {
            hint.set_text_content(message);
            if message.is_some() {
                let _ = hint.set_attribute("style", ERROR_STYLE);
            }
        }
    }

    fn show_inline_error(&self, message: &str) {
        for container in self.error_containers() {
            let Ok(line) = self.document.create_element("p") else {
                continue;
            };
            line.set_text_content(Some(&format!("* {message}")));
            let _ = container.set_attribute("style", ERROR_STYLE);
            let _ = container.append_child(&line);
        }
    }

    fn clear_inline_errors(&self) {
        for container in self.error_containers() {
            container.set_inner_html("");
        }
        if let Some(banner) = self.document.get_element_by_id(&self.selectors.banner_id) {
            banner.set_text_content(None);
            let _ = banner.class_list().add_1("hidden");
        }
    }

    fn show_banner(&self, message: &str) {
        match self.document.get_element_by_id(&self.selectors.banner_id) {
            Some(banner) => {
                banner.set_text_content(Some(message));
                let _ = banner.class_list().remove_1("hidden");
            }
            // No banner slot rendered, fall back to the inline area
            None => self.show_inline_error(message),
        }
    }
}
