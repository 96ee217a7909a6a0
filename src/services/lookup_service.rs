//! Lookup dispatcher - forwards one portal query to the external lookup API.
//!
//! # Process
//!
//! 1. Build `{base}{path}?{param}={query}` with the query form-encoded
//! 2. Issue a single GET (no retry)
//! 3. Return the JSON body on success, `{error, details}` otherwise
//! 4. Record one search log entry either way (best effort)

use std::time::Duration;

use serde_json::{Value, json};
use url::Url;

use crate::{
    models::{
        endpoint::EndpointDescriptor,
        search_log::{LogStatus, NewSearchLog},
    },
    services::log_service,
    storage::Storage,
};

/// Result of one dispatched lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    pub status: LogStatus,

    /// Upstream JSON on success, `{"error", "details"}` on failure
    pub body: Value,
}

impl LookupOutcome {
    fn failed(details: impl Into<String>) -> Self {
        Self {
            status: LogStatus::Error,
            body: json!({
                "error": "Request failed",
                "details": details.into(),
            }),
        }
    }
}

/// HTTP client bound to the fixed lookup base URL.
#[derive(Debug, Clone)]
pub struct LookupClient {
    http: reqwest::Client,
    base_url: String,
}

impl LookupClient {
    /// Build a client. `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into(),
        })
    }

    /// Full request URL for `query` against `endpoint`.
    pub fn build_url(&self, endpoint: &EndpointDescriptor, query: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            endpoint.endpoint
        ))?;
        url.query_pairs_mut().append_pair(endpoint.param, query);
        Ok(url)
    }

    /// Run one lookup and log it under `key_name`.
    ///
    /// Never fails: transport, status and parse errors all become an error-shaped
    /// outcome. A failure to write the log entry is only traced.
    pub async fn dispatch(
        &self,
        storage: &dyn Storage,
        endpoint: &EndpointDescriptor,
        query: &str,
        key_name: &str,
    ) -> LookupOutcome {
        let outcome = self.fetch(endpoint, query).await;

        match outcome.status {
            LogStatus::Success => {
                tracing::info!(endpoint = endpoint.endpoint, key_name, "lookup succeeded")
            }
            LogStatus::Error => {
                tracing::warn!(endpoint = endpoint.endpoint, key_name, body = %outcome.body, "lookup failed")
            }
        }

        log_service::record(
            storage,
            NewSearchLog {
                key_name: key_name.to_string(),
                endpoint: endpoint.endpoint.to_string(),
                query: query.to_string(),
                status: outcome.status,
            },
        )
        .await;

        outcome
    }

    async fn fetch(&self, endpoint: &EndpointDescriptor, query: &str) -> LookupOutcome {
        let url = match self.build_url(endpoint, query) {
            Ok(url) => url,
            Err(e) => return LookupOutcome::failed(format!("Invalid lookup URL: {e}")),
        };

        let response = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => return LookupOutcome::failed(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return LookupOutcome::failed(format!("HTTP {status}"));
        }

        match response.json::<Value>().await {
            Ok(body) => LookupOutcome {
                status: LogStatus::Success,
                body,
            },
            Err(e) => LookupOutcome::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};

    use super::*;
    use crate::models::endpoint::find_endpoint;
    use crate::services::log_service::list_logs;
    use crate::storage::local::LocalStorage;

    /// Serve `app` on an ephemeral port and return its base URL.
    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    fn mobile() -> &'static EndpointDescriptor {
        find_endpoint("/mobile").unwrap()
    }

    #[test]
    fn test_build_url_encodes_query() {
        let client = LookupClient::new("https://lookup.example.com/api/", None).unwrap();

        let url = client.build_url(mobile(), "98 76&x=1").unwrap();

        assert_eq!(url.path(), "/api/mobile");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("number".to_string(), "98 76&x=1".to_string())]);
    }

    #[tokio::test]
    async fn test_success_returns_body_and_logs_success() {
        let upstream = Router::new().route(
            "/api/mobile",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({ "echo": params.get("number") }))
            }),
        );
        let base = spawn_upstream(upstream).await;
        let client = LookupClient::new(base, None).unwrap();
        let storage = LocalStorage::in_memory();

        let outcome = client.dispatch(&storage, mobile(), "9999999999", "Tester").await;

        assert_eq!(outcome.status, LogStatus::Success);
        assert_eq!(outcome.body, json!({ "echo": "9999999999" }));

        let logs = list_logs(&storage).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, LogStatus::Success);
        assert_eq!(logs[0].key_name, "Tester");
        assert_eq!(logs[0].endpoint, "/mobile");
        assert_eq!(logs[0].query, "9999999999");
    }

    #[tokio::test]
    async fn test_server_error_yields_error_payload_and_one_error_log() {
        let upstream = Router::new().route(
            "/api/mobile",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "oops": true }))) }),
        );
        let base = spawn_upstream(upstream).await;
        let client = LookupClient::new(base, None).unwrap();
        let storage = LocalStorage::in_memory();

        let outcome = client.dispatch(&storage, mobile(), "9999999999", "Tester").await;

        assert_eq!(outcome.status, LogStatus::Error);
        assert!(outcome.body.get("error").is_some());
        assert!(outcome.body["details"].as_str().unwrap().contains("500"));

        let logs = list_logs(&storage).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, LogStatus::Error);
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let upstream = Router::new().route("/api/mobile", get(|| async { "plain text" }));
        let base = spawn_upstream(upstream).await;
        let client = LookupClient::new(base, None).unwrap();
        let storage = LocalStorage::in_memory();

        let outcome = client.dispatch(&storage, mobile(), "1", "Tester").await;

        assert_eq!(outcome.status, LogStatus::Error);
        assert_eq!(outcome.body["error"], "Request failed");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = LookupClient::new(format!("http://{addr}"), None).unwrap();
        let storage = LocalStorage::in_memory();

        let outcome = client.dispatch(&storage, mobile(), "1", "Tester").await;

        assert_eq!(outcome.status, LogStatus::Error);
        assert_eq!(list_logs(&storage).await.unwrap()[0].status, LogStatus::Error);
    }
}
