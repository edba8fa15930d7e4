use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::models::users::SessionHandle;

pub mod deliveries;
pub mod referrals;
pub mod users;

/// A non-2xx answer from the backend, carrying the `message` field of the
/// body when the server sent one.
#[derive(Debug, thiserror::Error)]
#[error("Request rejected with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
pub struct ApiRejection {
    pub status: u16,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    url: String,
    session: SessionHandle,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(
        url: &str,
        timeout: Duration,
        session: SessionHandle,
    ) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Could not build HTTP client")?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            session,
            client,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, anyhow::Error> {
        let request = self.client.get(format!("{}{}", self.url, path));
        self.send(request).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, anyhow::Error> {
        let request = self.client.put(format!("{}{}", self.url, path)).json(body);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, anyhow::Error> {
        let request_id = Uuid::new_v4().hyphenated().to_string();
        // Read on every request so a logout takes effect immediately.
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.header("X-Request-Id", &request_id).send().await?;
        let status = response.status();
        let body = response.text().await?;
        log::debug!("Request {} answered with {}", request_id, status);

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from));

            return Err(ApiRejection {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        // Some mutations answer with an empty body.
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        let value = serde_json::from_str(body).context("Bad response format")?;

        Ok(value)
    }
}
