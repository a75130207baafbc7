//! Execution endpoint client

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use checkout_core::host::ExecutionResponse;
use checkout_core::{CheckoutError, ExecutionClient, Result};

/// Resolve a configured execution URL against the page address.
///
/// Templates render paths such as `/payment/cowpay/execute/`, which reqwest
/// only accepts in absolute form.
pub fn resolve_execution_url(base: Option<&str>, url: &str) -> Result<Url> {
    let resolved = match base {
        Some(base) => Url::parse(base).and_then(|base| base.join(url)),
        None => Url::parse(url),
    };
    resolved.map_err(|e| CheckoutError::Config(format!("invalid execution url {url:?}: {e}")))
}

/// Posts gateway completion payloads with the page's session cookies
#[derive(Clone, Default)]
pub struct HttpExecution {
    client: reqwest::Client,
    base: Option<String>,
}

impl HttpExecution {
    /// `base` is the page URL relative execution paths resolve against
    pub fn new(base: Option<String>) -> Self {
        Self { client: reqwest::Client::new(), base }
    }

    fn request(&self, url: &str, fields: &[(String, String)]) -> Result<reqwest::RequestBuilder> {
        let url = resolve_execution_url(self.base.as_deref(), url)?;
        let request = self.client.post(url).form(fields);
        #[cfg(target_arch = "wasm32")]
        let request = request.fetch_credentials_include();
        Ok(request)
    }
}

fn settle(status: StatusCode, body: &str) -> Result<String> {
    tracing::debug!(status = status.as_u16(), "Execution endpoint answered");
    ExecutionResponse::from_body(status.is_success(), body)
}

#[async_trait(?Send)]
impl ExecutionClient for HttpExecution {
    async fn execute(&self, url: &str, fields: &[(String, String)]) -> Result<String> {
        let response = self
            .request(url, fields)?
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        settle(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://shop.example.com/basket/checkout/?sku=A1";

    #[test]
    fn test_relative_path_resolves_against_page() {
        let url = resolve_execution_url(Some(PAGE), "/payment/cowpay/execute/").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/payment/cowpay/execute/");

        let url = resolve_execution_url(Some(PAGE), "execute/").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/basket/checkout/execute/");
    }

    #[test]
    fn test_absolute_url_is_kept() {
        let url = resolve_execution_url(Some(PAGE), "https://pay.example.net/execute/").unwrap();
        assert_eq!(url.as_str(), "https://pay.example.net/execute/");
    }

    #[test]
    fn test_relative_path_without_page_is_config_error() {
        let err = resolve_execution_url(None, "/payment/cowpay/execute/").unwrap_err();
        assert!(matches!(err, CheckoutError::Config(_)));
    }

    #[test]
    fn test_request_posts_form_to_absolute_url() {
        let execution = HttpExecution::new(Some(PAGE.into()));
        let fields = vec![
            ("payment_status".to_string(), "PAID".to_string()),
            ("payment_gateway_reference_id".to_string(), "gw 77".to_string()),
        ];

        let request = execution
            .request("/payment/cowpay/execute/", &fields)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://shop.example.com/payment/cowpay/execute/");
        assert_eq!(
            request.headers()[reqwest::header::CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        let body = request.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(body, b"payment_status=PAID&payment_gateway_reference_id=gw+77");
    }

    #[test]
    fn test_settle_maps_endpoint_answers() {
        assert_eq!(
            settle(StatusCode::OK, r#"{"url": "https://shop.example.com/receipt/"}"#).unwrap(),
            "https://shop.example.com/receipt/"
        );
        assert_eq!(
            settle(StatusCode::OK, r#"{"message": "Payment has not been completed yet."}"#),
            Err(CheckoutError::Network("Payment has not been completed yet.".into()))
        );
        assert_eq!(
            settle(StatusCode::BAD_REQUEST, r#"{"url": "https://x/", "message": "Declined"}"#),
            Err(CheckoutError::Network("Declined".into()))
        );
    }
}
