//! Mock SOAP backend for testing
//!
//! Answers POSTs on per-service paths with canned SOAP envelopes so the
//! broker can be exercised end to end without a real ERP system.

use std::collections::HashMap;
use std::time::Duration;
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

use broker::config::ServiceEndpoint;

pub const SERVICE_CODES: &[&str] = &["SO", "STO", "DN", "MAT", "SRC", "INF", "QTY"];

pub struct MockSapBackend {
    pub server: MockServer,
    pub base_url: String,
}

impl MockSapBackend {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    pub fn service_path(code: &str) -> String {
        format!("/sap/bc/srt/rfc/{}", code.to_lowercase())
    }

    pub fn action(code: &str) -> String {
        format!("urn:sap-com:document:sap:rfc:functions:{}Request", code)
    }

    /// Endpoints for every service, all pointing at this server
    pub fn services(&self) -> HashMap<String, ServiceEndpoint> {
        SERVICE_CODES
            .iter()
            .map(|code| {
                (
                    code.to_string(),
                    ServiceEndpoint {
                        url: format!("{}{}", self.base_url, Self::service_path(code)),
                        action: Self::action(code),
                    },
                )
            })
            .collect()
    }

    /// Any POST to the service answers with a SOAP envelope wrapping `inner`
    pub async fn mock_success(&self, code: &str, inner: &str) {
        Mock::given(method("POST"))
            .and(path(Self::service_path(code)))
            .respond_with(ResponseTemplate::new(200).set_body_string(soap_reply(inner)))
            .mount(&self.server)
            .await;
    }

    /// Success only for requests whose body contains `needle`
    pub async fn mock_success_when(&self, code: &str, needle: &str, inner: &str, delay: Duration) {
        Mock::given(method("POST"))
            .and(path(Self::service_path(code)))
            .and(body_string_contains(needle))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(soap_reply(inner))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Success guarded by the headers the broker must send
    pub async fn mock_success_with_headers(&self, code: &str, inner: &str, authorization: &str) {
        Mock::given(method("POST"))
            .and(path(Self::service_path(code)))
            .and(header("content-type", "text/xml; charset=utf-8"))
            .and(header("accept", "text/xml"))
            .and(header("soapaction", Self::action(code).as_str()))
            .and(header("authorization", authorization))
            .respond_with(ResponseTemplate::new(200).set_body_string(soap_reply(inner)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_raw(&self, code: &str, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path(Self::service_path(code)))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_delayed(&self, code: &str, delay: Duration) {
        Mock::given(method("POST"))
            .and(path(Self::service_path(code)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(soap_reply("<Done/>"))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn received(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

pub fn soap_reply(inner: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap-env:Envelope xmlns:soap-env="http://schemas.xmlsoap.org/soap/envelope/">"#,
            "<soap-env:Header/><soap-env:Body>{}</soap-env:Body></soap-env:Envelope>"
        ),
        inner
    )
}
