//! Admin API client over HTTP.
//!
//! Every endpoint answers with a `{ success, message, ... }` envelope. The
//! bearer token comes from an [`AdminSession`] the caller owns.

use crate::config::AdminConfig;
use crate::domain::auth::{AdminSession, ImportSummary, PinPage};
use crate::domain::ports::AdminApi;
use crate::error::{GateError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
struct Pagination {
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    password: &'a str,
}

pub struct HttpAdminClient {
    client: Client,
    base_url: String,
}

impl HttpAdminClient {
    pub fn new(config: &AdminConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("resultgate/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/admin/{path}", self.base_url)
    }

    async fn send(&self, endpoint: &'static str, request: RequestBuilder) -> Result<Envelope> {
        let response = request.send().await.inspect_err(|e| {
            tracing::error!(endpoint, error = %e, "admin request failed");
        })?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::error!(endpoint, "admin session rejected");
            return Err(GateError::Unauthorized);
        }

        let body = response.bytes().await?;
        let envelope: Envelope = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(endpoint, %status, error = %e, "malformed admin response");
            GateError::Rejected(format!("Malformed response from server ({status})"))
        })?;
        if !envelope.success {
            let message = envelope
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("Request failed ({status})"));
            tracing::error!(endpoint, %status, reason = %message, "admin request rejected");
            return Err(GateError::Rejected(message));
        }
        Ok(envelope)
    }
}

#[async_trait]
impl AdminApi for HttpAdminClient {
    async fn login(&self, password: &str) -> Result<AdminSession> {
        let request = self
            .client
            .post(self.url("login"))
            .json(&LoginBody { password });
        let envelope = self.send("login", request).await?;
        let token = envelope
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GateError::Rejected("Login response carried no token".to_string()))?;
        tracing::info!("admin logged in");
        Ok(AdminSession::new(token))
    }

    async fn stats(&self, session: &AdminSession) -> Result<serde_json::Value> {
        let request = self
            .client
            .get(self.url("stats"))
            .bearer_auth(session.token());
        Ok(self.send("stats", request).await?.data)
    }

    async fn pins(&self, session: &AdminSession, page: u32) -> Result<PinPage> {
        let request = self
            .client
            .get(self.url("pins"))
            .query(&[("page", page)])
            .bearer_auth(session.token());
        let envelope = self.send("pins", request).await?;
        let pins = match envelope.data {
            serde_json::Value::Array(pins) => pins,
            _ => Vec::new(),
        };
        let total = envelope
            .pagination
            .map_or(pins.len() as u64, |p| p.total);
        Ok(PinPage { page, pins, total })
    }

    async fn import_pins(
        &self,
        session: &AdminSession,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<ImportSummary> {
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let request = self
            .client
            .post(self.url("import-pins"))
            .bearer_auth(session.token())
            .multipart(Form::new().part("file", part));
        let envelope = self.send("import-pins", request).await?;
        let message = envelope.message.unwrap_or_default();
        tracing::info!(file_name, summary = %message, "pins imported");
        Ok(ImportSummary { message })
    }
}
