//! In-memory page, vendor and network fakes

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;

use checkout_core::card::{CardField, CardInput, ExpiryDate};
use checkout_core::config::MicroformConfig;
use checkout_core::error::{CheckoutError, Result};
use checkout_core::host::{ExecutionClient, Hosts, Navigator, Timer};
use checkout_core::vendor::{
    AuthData, CardTokenizer, HostedDialog, MicroformSdk, OpaqueData, VendorFactory,
};
use checkout_core::FormHost;

pub struct FakeForm {
    pub form_rendered: Cell<bool>,
    pub present: HashSet<CardField>,
    pub values: RefCell<HashMap<CardField, String>>,
    pub required: RefCell<HashSet<CardField>>,
    pub max_lengths: RefCell<HashMap<CardField, u32>>,
    pub action: RefCell<Option<String>>,
    pub valid: Cell<bool>,
    pub reported: Cell<u32>,
    pub hidden: RefCell<HashMap<String, String>>,
    pub submits: Cell<u32>,
    /// Card field values captured at the moment of each submit
    pub values_at_submit: RefCell<Vec<HashMap<CardField, String>>>,
    pub submit_enabled: Cell<bool>,
    pub card_hint: RefCell<Option<String>>,
    pub inline_errors: RefCell<Vec<String>>,
    pub banners: RefCell<Vec<String>>,
}

impl FakeForm {
    pub fn with_fields(fields: &[CardField]) -> Rc<Self> {
        Rc::new(Self {
            form_rendered: Cell::new(true),
            present: fields.iter().copied().collect(),
            values: RefCell::new(HashMap::new()),
            required: RefCell::new(HashSet::new()),
            max_lengths: RefCell::new(HashMap::new()),
            action: RefCell::new(None),
            valid: Cell::new(true),
            reported: Cell::new(0),
            hidden: RefCell::new(HashMap::new()),
            submits: Cell::new(0),
            values_at_submit: RefCell::new(Vec::new()),
            submit_enabled: Cell::new(true),
            card_hint: RefCell::new(None),
            inline_errors: RefCell::new(Vec::new()),
            banners: RefCell::new(Vec::new()),
        })
    }

    pub fn full() -> Rc<Self> {
        Self::with_fields(&CardField::ALL)
    }

    /// Card inputs rendered outside any form element
    pub fn without_form() -> Rc<Self> {
        let form = Self::full();
        form.form_rendered.set(false);
        form
    }

    pub fn fill(&self, field: CardField, value: &str) {
        self.values.borrow_mut().insert(field, value.to_string());
    }

    pub fn fill_card(&self, number: &str, month: &str, year: &str) {
        self.fill(CardField::Number, number);
        self.fill(CardField::ExpiryMonth, month);
        self.fill(CardField::ExpiryYear, year);
        self.fill(CardField::SecurityCode, "123");
        self.fill(CardField::FullName, "Jane Doe");
    }

    pub fn value(&self, field: CardField) -> String {
        self.values.borrow().get(&field).cloned().unwrap_or_default()
    }

    pub fn hidden(&self, name: &str) -> Option<String> {
        self.hidden.borrow().get(name).cloned()
    }
}

impl FormHost for FakeForm {
    fn has_form(&self) -> bool {
        self.form_rendered.get()
    }

    fn has_field(&self, field: CardField) -> bool {
        self.present.contains(&field)
    }

    fn field_value(&self, field: CardField) -> Option<String> {
        if !self.has_field(field) {
            return None;
        }
        Some(self.value(field))
    }

    fn set_field_value(&self, field: CardField, value: &str) {
        if self.has_field(field) {
            self.fill(field, value);
        }
    }

    fn mark_required(&self, field: CardField) {
        self.required.borrow_mut().insert(field);
    }

    fn set_max_length(&self, field: CardField, max: u32) {
        self.max_lengths.borrow_mut().insert(field, max);
    }

    fn set_action(&self, url: &str) {
        if !self.has_form() {
            return;
        }
        *self.action.borrow_mut() = Some(url.to_string());
    }

    fn check_validity(&self) -> bool {
        self.valid.get()
    }

    fn report_validity(&self) {
        self.reported.set(self.reported.get() + 1);
    }

    fn set_hidden(&self, name: &str, value: &str) {
        self.hidden.borrow_mut().insert(name.to_string(), value.to_string());
    }

    fn submit(&self) {
        if !self.has_form() {
            return;
        }
        self.values_at_submit.borrow_mut().push(self.values.borrow().clone());
        self.submits.set(self.submits.get() + 1);
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.submit_enabled.set(enabled);
    }

    fn show_card_hint(&self, message: Option<&str>) {
        *self.card_hint.borrow_mut() = message.map(str::to_string);
    }

    fn show_inline_error(&self, message: &str) {
        self.inline_errors.borrow_mut().push(message.to_string());
    }

    fn clear_inline_errors(&self) {
        self.inline_errors.borrow_mut().clear();
    }

    fn show_banner(&self, message: &str) {
        self.banners.borrow_mut().push(message.to_string());
    }
}

#[derive(Default)]
pub struct FakeNavigator {
    pub query: HashMap<String, String>,
    pub redirects: RefCell<Vec<String>>,
}

impl FakeNavigator {
    pub fn with_query(pairs: &[(&str, &str)]) -> Rc<Self> {
        Rc::new(Self {
            query: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            redirects: RefCell::new(Vec::new()),
        })
    }
}

impl Navigator for FakeNavigator {
    fn redirect(&self, url: &str) {
        self.redirects.borrow_mut().push(url.to_string());
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.query.get(name).cloned()
    }
}

pub struct FakeExecution {
    pub response: RefCell<Result<String>>,
    pub calls: RefCell<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeExecution {
    pub fn answering(response: Result<String>) -> Rc<Self> {
        Rc::new(Self {
            response: RefCell::new(response),
            calls: RefCell::new(Vec::new()),
        })
    }
}

#[async_trait(?Send)]
impl ExecutionClient for FakeExecution {
    async fn execute(&self, url: &str, fields: &[(String, String)]) -> Result<String> {
        self.calls.borrow_mut().push((url.to_string(), fields.to_vec()));
        self.response.borrow().clone()
    }
}

pub struct TokioTimer;

#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub struct FakeTokenizer {
    pub responses: RefCell<Vec<Result<OpaqueData>>>,
    pub calls: Cell<u32>,
    pub last_auth: RefCell<Option<AuthData>>,
    pub last_card: RefCell<Option<CardInput>>,
    /// When set, the next call waits for this before answering
    pub gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl FakeTokenizer {
    /// Answers are consumed in order; the last one repeats
    pub fn answering(responses: Vec<Result<OpaqueData>>) -> Rc<Self> {
        Rc::new(Self {
            responses: RefCell::new(responses),
            calls: Cell::new(0),
            last_auth: RefCell::new(None),
            last_card: RefCell::new(None),
            gate: RefCell::new(None),
        })
    }

    pub fn ok() -> Rc<Self> {
        Self::answering(vec![Ok(OpaqueData {
            descriptor: "COMMON.ACCEPT.INAPP.PAYMENT".into(),
            value: "opaque-value".into(),
        })])
    }

    pub fn gated(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }
}

#[async_trait(?Send)]
impl CardTokenizer for FakeTokenizer {
    async fn dispatch(&self, auth: &AuthData, card: &CardInput) -> Result<OpaqueData> {
        self.calls.set(self.calls.get() + 1);
        *self.last_auth.borrow_mut() = Some(auth.clone());
        *self.last_card.borrow_mut() = Some(card.clone());

        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let mut responses = self.responses.borrow_mut();
        if responses.len() > 1 {
            responses.remove(0)
        } else {
            responses[0].clone()
        }
    }
}

pub struct FakeMicroform {
    pub response: RefCell<Result<String>>,
    pub calls: Cell<u32>,
    pub last_expiry: RefCell<Option<ExpiryDate>>,
}

impl FakeMicroform {
    pub fn answering(response: Result<String>) -> Rc<Self> {
        Rc::new(Self {
            response: RefCell::new(response),
            calls: Cell::new(0),
            last_expiry: RefCell::new(None),
        })
    }
}

#[async_trait(?Send)]
impl MicroformSdk for FakeMicroform {
    async fn create_token(&self, expiry: &ExpiryDate) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        *self.last_expiry.borrow_mut() = Some(expiry.clone());
        self.response.borrow().clone()
    }
}

#[derive(Default)]
pub struct FakeDialog {
    pub payments: RefCell<Vec<String>>,
    pub challenges: RefCell<Vec<String>>,
}

impl HostedDialog for FakeDialog {
    fn open_payment(&self, iframe_token: &str) -> Result<()> {
        self.payments.borrow_mut().push(iframe_token.to_string());
        Ok(())
    }

    fn open_challenge(&self, reference_id: &str) -> Result<()> {
        self.challenges.borrow_mut().push(reference_id.to_string());
        Ok(())
    }
}

pub struct FakeVendors {
    pub tokenizer: Rc<FakeTokenizer>,
    pub microform: Rc<FakeMicroform>,
    pub microform_load: Option<CheckoutError>,
    pub microform_loads: Cell<u32>,
    pub dialog: Rc<FakeDialog>,
}

impl Default for FakeVendors {
    fn default() -> Self {
        Self {
            tokenizer: FakeTokenizer::ok(),
            microform: FakeMicroform::answering(Ok("flex-jwt-token".into())),
            microform_load: None,
            microform_loads: Cell::new(0),
            dialog: Rc::new(FakeDialog::default()),
        }
    }
}

#[async_trait(?Send)]
impl VendorFactory for FakeVendors {
    fn card_tokenizer(&self) -> Result<Rc<dyn CardTokenizer>> {
        Ok(self.tokenizer.clone())
    }

    async fn load_microform(&self, _config: &MicroformConfig) -> Result<Rc<dyn MicroformSdk>> {
        self.microform_loads.set(self.microform_loads.get() + 1);
        match &self.microform_load {
            Some(err) => Err(err.clone()),
            None => Ok(self.microform.clone()),
        }
    }

    fn hosted_dialog(&self) -> Result<Rc<dyn HostedDialog>> {
        Ok(self.dialog.clone())
    }
}

/// Page with typed handles kept for assertions
pub struct Page {
    pub form: Rc<FakeForm>,
    pub navigator: Rc<FakeNavigator>,
    pub execution: Rc<FakeExecution>,
}

impl Page {
    pub fn new(form: Rc<FakeForm>, navigator: Rc<FakeNavigator>) -> Self {
        Self {
            form,
            navigator,
            execution: FakeExecution::answering(Ok("https://host/receipt".into())),
        }
    }

    pub fn hosts(&self) -> Hosts {
        Hosts {
            form: self.form.clone(),
            navigator: self.navigator.clone(),
            execution: self.execution.clone(),
            timer: Rc::new(TokioTimer),
        }
    }
}
