//! Submit/Redirect Orchestrator
//!
//! Drives one submission attempt at a time through the state machine:
//!
//! ```text
//! Idle ─click─▶ Validating ─▶ Tokenizing ─▶ Submitting ─▶ Submitted
//!   │               │             │
//!   │               └─────────────┴──────▶ Failed ─click─▶ Validating
//!   │
//!   └─click (hosted)─▶ AwaitingGatewayMessage ─paid─▶ Executing ─▶ Redirected
//! ```
//!
//! The page runs on one thread, so state lives in a `Cell`. The click guard
//! runs synchronously inside `on_submit_click`, before any future is polled,
//! which makes duplicate click events no-ops.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::config::{CheckoutConfiguration, Messages};
use crate::error::{CheckoutError, ErrorKind};
use crate::form::{BoundFields, FieldBinder, FieldSelectors, FormHost};
use crate::host::{with_timeout, Hosts};
use crate::message::{GatewayMessage, GatewayStatus};
use crate::strategy::{Attachment, Strategy};
use crate::vendor::VendorFactory;

/// Where the current submission attempt stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Tokenizing,
    Submitting,
    AwaitingGatewayMessage,
    /// Completion forwarded to the execution endpoint, awaiting its answer
    Executing,
    Submitted,
    Redirected,
    Failed(ErrorKind),
}

impl SubmissionState {
    /// An attempt is in flight; further clicks are ignored
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SubmissionState::Validating
                | SubmissionState::Tokenizing
                | SubmissionState::Submitting
                | SubmissionState::Executing
        )
    }

    /// The page is navigating away
    pub fn is_finished(&self) -> bool {
        matches!(self, SubmissionState::Submitted | SubmissionState::Redirected)
    }
}

/// What a click led to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Duplicate or late click, nothing happened
    Ignored,
    Submitted,
    AwaitingGateway,
    Failed(ErrorKind),
}

/// What a gateway message led to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageOutcome {
    Ignored,
    ChallengeOpened,
    Redirected,
    Failed(ErrorKind),
}

enum Admission {
    Done(ClickOutcome),
    InPage,
}

enum MessageAdmission {
    Done(MessageOutcome),
    Execute { url: String, fields: Vec<(String, String)> },
}

/// Checkout adapter for one page and one processor
pub struct CheckoutAdapter {
    strategy: Strategy,
    hosts: Hosts,
    fields: BoundFields,
    messages: Messages,
    selectors: FieldSelectors,
    vendor_timeout: Duration,
    state: Cell<SubmissionState>,
    attempt: Cell<Option<Uuid>>,
}

impl CheckoutAdapter {
    /// Select the strategy, bind the form, and resume a finished round-trip.
    pub async fn init(
        config: CheckoutConfiguration,
        hosts: Hosts,
        vendors: &dyn VendorFactory,
    ) -> crate::Result<Rc<Self>> {
        let Attachment { strategy, warning } = Strategy::attach(&config, vendors).await?;
        let fields = FieldBinder::bind(
            hosts.form.as_ref(),
            &strategy.profile(),
            config.processor.post_url(),
        );

        let adapter = Rc::new(Self {
            strategy,
            hosts,
            fields,
            vendor_timeout: config.vendor_timeout(),
            messages: config.messages,
            selectors: config.selectors,
            state: Cell::new(SubmissionState::Idle),
            attempt: Cell::new(None),
        });

        if let Some(err) = warning {
            adapter.form().show_banner(&err.user_message(&adapter.messages));
        }

        adapter.resume_from_redirect();
        Ok(adapter)
    }

    pub fn state(&self) -> SubmissionState {
        self.state.get()
    }

    pub fn processor(&self) -> &'static str {
        self.strategy.processor()
    }

    /// Correlation id of the current or last attempt
    pub fn attempt_id(&self) -> Option<Uuid> {
        self.attempt.get()
    }

    /// Live card-number feedback
    pub fn on_card_number_input(&self, value: &str) -> bool {
        self.fields.on_card_number_input(self.form(), &self.messages, value)
    }

    /// Redirect to the receipt when the URL says the gateway already approved.
    ///
    /// Returns whether a redirect happened.
    pub fn resume_from_redirect(&self) -> bool {
        let Strategy::HostedRedirect { config, resume, .. } = &self.strategy else {
            return false;
        };

        let navigator = self.hosts.navigator.as_ref();
        if !resume.matches(|name| navigator.query_param(name)) {
            return false;
        }

        match crate::config::present(&config.receipt_url) {
            Some(url) => {
                tracing::info!(processor = self.processor(), "Resuming approved payment");
                navigator.redirect(url);
                self.transition(SubmissionState::Redirected);
                true
            }
            None => {
                tracing::warn!(processor = self.processor(), "Approved return without receipt URL");
                false
            }
        }
    }

    /// Handle a click on the submit button.
    ///
    /// The re-entrancy guard runs now; the returned future performs the attempt.
    pub fn on_submit_click(self: &Rc<Self>) -> impl Future<Output = ClickOutcome> + use<> {
        let admission = self.admit_click();
        let this = Rc::clone(self);
        async move {
            match admission {
                Admission::Done(outcome) => outcome,
                Admission::InPage => this.run_in_page_attempt().await,
            }
        }
    }

    fn admit_click(&self) -> Admission {
        let state = self.state();
        if state.is_busy() || state.is_finished() {
            tracing::debug!(state = ?state, "Ignoring click while attempt in progress");
            return Admission::Done(ClickOutcome::Ignored);
        }

        self.attempt.set(Some(Uuid::new_v4()));
        self.form().clear_inline_errors();

        if self.strategy.is_hosted() {
            // Reopening the dialog from AwaitingGatewayMessage is allowed
            let outcome = match self.strategy.launch_hosted(self.hosts.navigator.as_ref()) {
                Ok(()) => {
                    self.transition(SubmissionState::AwaitingGatewayMessage);
                    ClickOutcome::AwaitingGateway
                }
                Err(e) => ClickOutcome::Failed(self.fail(e)),
            };
            return Admission::Done(outcome);
        }

        self.form().set_submit_enabled(false);
        self.transition(SubmissionState::Validating);
        Admission::InPage
    }

    async fn run_in_page_attempt(&self) -> ClickOutcome {
        let form = self.form();

        if let Err(e) = FieldBinder::check_form_validity(form) {
            return ClickOutcome::Failed(self.fail(e));
        }

        let prepared = match self.strategy.prepare(form, &self.fields, &self.messages) {
            Ok(prepared) => prepared,
            Err(e) => return ClickOutcome::Failed(self.fail(e)),
        };

        self.transition(SubmissionState::Tokenizing);
        let result = with_timeout(
            self.hosts.timer.as_ref(),
            self.vendor_timeout,
            self.strategy.tokenize(&prepared),
        )
        .await;
        drop(prepared);

        let token = match result {
            Ok(token) => token,
            Err(e) => return ClickOutcome::Failed(self.fail(e)),
        };

        self.transition(SubmissionState::Submitting);
        self.strategy.apply_token(&token, form, &self.fields, &self.selectors);
        form.submit();
        self.transition(SubmissionState::Submitted);

        tracing::info!(
            processor = self.processor(),
            attempt = ?self.attempt_id(),
            "Submitted tokenized payment form"
        );
        ClickOutcome::Submitted
    }

    /// Handle a cross-window message. Untagged messages change nothing.
    pub fn on_gateway_message(self: &Rc<Self>, data: &Value) -> impl Future<Output = MessageOutcome> + use<> {
        let admitted = self.admit_message(data);
        let this = Rc::clone(self);
        async move {
            match admitted {
                MessageAdmission::Execute { url, fields } => this.execute_payment(url, fields).await,
                MessageAdmission::Done(outcome) => outcome,
            }
        }
    }

    fn admit_message(&self, data: &Value) -> MessageAdmission {
        let Strategy::HostedRedirect { config, message_source, .. } = &self.strategy else {
            return MessageAdmission::Done(MessageOutcome::Ignored);
        };
        let Some(message) = GatewayMessage::classify(data, message_source) else {
            return MessageAdmission::Done(MessageOutcome::Ignored);
        };

        let state = self.state();
        if state.is_busy() || state.is_finished() {
            tracing::debug!(state = ?state, "Ignoring gateway message");
            return MessageAdmission::Done(MessageOutcome::Ignored);
        }

        let outcome = match &message.status {
            GatewayStatus::Challenge { reference_id } => {
                match self.strategy.open_challenge(reference_id) {
                    Ok(()) => {
                        self.transition(SubmissionState::AwaitingGatewayMessage);
                        MessageOutcome::ChallengeOpened
                    }
                    Err(e) => MessageOutcome::Failed(self.fail(e)),
                }
            }
            GatewayStatus::Pending => {
                tracing::debug!(processor = self.processor(), "Gateway message without completion");
                MessageOutcome::Ignored
            }
            GatewayStatus::Completed => {
                let url = match crate::config::require(&config.execution_url, "execution_url") {
                    Ok(url) => url.to_string(),
                    Err(e) => return MessageAdmission::Done(MessageOutcome::Failed(self.fail(e))),
                };
                tracing::info!(
                    processor = self.processor(),
                    reference = ?message.reference_id(),
                    "Gateway reported completion"
                );
                self.transition(SubmissionState::Executing);
                return MessageAdmission::Execute { url, fields: message.form_fields() };
            }
        };
        MessageAdmission::Done(outcome)
    }

    async fn execute_payment(&self, url: String, fields: Vec<(String, String)>) -> MessageOutcome {
        let result = with_timeout(
            self.hosts.timer.as_ref(),
            self.vendor_timeout,
            self.hosts.execution.execute(&url, &fields),
        )
        .await;

        match result {
            Ok(redirect) => {
                self.hosts.navigator.redirect(&redirect);
                self.transition(SubmissionState::Redirected);
                MessageOutcome::Redirected
            }
            Err(e) => {
                // Network failures surface as errors, never a silent hang
                let e = match e {
                    CheckoutError::Network(_) | CheckoutError::Timeout(_) => e,
                    other => CheckoutError::Network(other.to_string()),
                };
                MessageOutcome::Failed(self.fail(e))
            }
        }
    }

    /// Report a failure and leave the adapter ready for another click.
    fn fail(&self, error: CheckoutError) -> ErrorKind {
        let kind = error.kind();
        tracing::warn!(
            processor = self.processor(),
            attempt = ?self.attempt_id(),
            kind = ?kind,
            error = %error,
            "Checkout attempt failed"
        );

        let form = self.form();
        match &error {
            // Native validation already highlighted the fields
            CheckoutError::Validation => {}
            e if e.is_inline() => form.show_inline_error(&e.user_message(&self.messages)),
            e => form.show_banner(&e.user_message(&self.messages)),
        }
        form.set_submit_enabled(true);
        self.transition(SubmissionState::Failed(kind));
        kind
    }

    fn transition(&self, to: SubmissionState) {
        let from = self.state.replace(to);
        tracing::debug!(from = ?from, to = ?to, "Submission state changed");
    }

    fn form(&self) -> &dyn FormHost {
        self.hosts.form.as_ref()
    }
}
