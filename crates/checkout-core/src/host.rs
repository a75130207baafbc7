//! Page services other than the form itself

use std::future::Future;
use std::pin::pin;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{select, Either};
use serde::Deserialize;

use crate::error::{CheckoutError, Result};
use crate::form::FormHost;

/// Window location access
pub trait Navigator {
    /// Full-page navigation
    fn redirect(&self, url: &str);

    /// First value of a query parameter of the current URL
    fn query_param(&self, name: &str) -> Option<String>;
}

/// Form-encoded POST to the execution endpoint
#[async_trait(?Send)]
pub trait ExecutionClient {
    /// Post `fields` with session credentials and return the URL to redirect to
    async fn execute(&self, url: &str, fields: &[(String, String)]) -> Result<String>;
}

/// Single-shot timer
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

/// JSON body returned by the execution endpoint
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ExecutionResponse {
    #[serde(default)]
    pub url: Option<String>,

    /// Explanation sent instead of a URL when the payment is not executable
    #[serde(default)]
    pub message: Option<String>,
}

impl ExecutionResponse {
    /// Interpret a response body, given whether the HTTP status was a success
    pub fn from_body(success: bool, body: &str) -> Result<String> {
        let response: ExecutionResponse = serde_json::from_str(body)
            .map_err(|e| CheckoutError::Network(format!("unexpected response: {e}")))?;
        response.into_redirect(success)
    }

    pub fn into_redirect(self, success: bool) -> Result<String> {
        match (success, self.url) {
            (true, Some(url)) if !url.is_empty() => Ok(url),
            (_, _) => Err(CheckoutError::Network(self.message.unwrap_or_default())),
        }
    }
}

/// Everything the adapter needs from the page
#[derive(Clone)]
pub struct Hosts {
    pub form: Rc<dyn FormHost>,
    pub navigator: Rc<dyn Navigator>,
    pub execution: Rc<dyn ExecutionClient>,
    pub timer: Rc<dyn Timer>,
}

/// Race `future` against the timer
pub async fn with_timeout<T>(
    timer: &dyn Timer,
    duration: Duration,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    let work = pin!(future);
    let deadline = timer.sleep(duration);
    match select(work, deadline).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(CheckoutError::Timeout(
            u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}
