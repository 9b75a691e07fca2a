//! The gateway is the single egress point for every backend call. It
//! attaches the stored bearer credential on the way out and watches for
//! session expiry on the way back in.

pub mod auth;
pub mod tasks;

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::ClientError;
use crate::session::SessionStore;

type ForcedLogoutHook = Box<dyn Fn() + Send + Sync>;

pub struct Gateway {
    http: reqwest::Client,
    api_base: Url,
    session: Arc<dyn SessionStore>,
    forced_logout: Option<ForcedLogoutHook>,
}

impl Gateway {
    pub fn new(api_base: Url, session: Arc<dyn SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            session,
            forced_logout: None,
        }
    }

    /// Register the hook fired after a 401 has cleared the session. The CLI
    /// installs one that tells the user to sign in again; a UI would route
    /// back to its login entry point.
    pub fn with_forced_logout<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.forced_logout = Some(Box::new(hook));
        self
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base.as_str().trim_end_matches('/'), path)
    }

    /// Issue a single request. At-most-once: no retries at this layer.
    ///
    /// A 401 response clears the session store and fires the forced-logout
    /// hook exactly once before the error reaches the caller; the caller may
    /// report the failure but must not assume the session still exists.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ClientError> {
        let url = self.endpoint(path);
        let mut builder = self.http.request(method.clone(), &url);

        if let Some(credential) = self.session.current() {
            builder = builder.bearer_auth(&credential.token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!(%method, %url, "issuing request");
        let response = builder.send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let message = read_error_message(response).await;
            self.force_logout(&message);
            return Err(ClientError::Auth(message));
        }
        if !status.is_success() {
            let message = read_error_message(response).await;
            tracing::debug!(%status, %url, "request failed: {message}");
            return Err(ClientError::request(Some(status.as_u16()), message));
        }

        Ok(response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = encode_body(body)?;
        let response = self.request(Method::POST, path, Some(&body)).await?;
        Ok(response.json().await?)
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = encode_body(body)?;
        let response = self.request(Method::PUT, path, Some(&body)).await?;
        Ok(response.json().await?)
    }

    /// DELETE, discarding whatever body the backend sends.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.request(Method::DELETE, path, None).await?;
        Ok(())
    }

    fn force_logout(&self, message: &str) {
        tracing::warn!("session rejected by backend: {message}");
        if let Err(err) = self.session.clear() {
            tracing::error!("failed to clear session after auth failure: {err}");
        }
        if let Some(hook) = &self.forced_logout {
            hook();
        }
    }
}

fn encode_body<B: Serialize>(body: &B) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(body)
        .map_err(|e| ClientError::request(None, format!("failed to encode request body: {e}")))
}

/// Pull the human-readable cause out of an error response. The backend sends
/// `{"detail": "..."}`; older deployments used `{"message": "..."}`.
async fn read_error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        if let Some(detail) = value
            .get("detail")
            .or_else(|| value.get("message"))
            .and_then(|v| v.as_str())
        {
            return detail.to_string();
        }
    }

    if body.trim().is_empty() {
        status.to_string()
    } else {
        body
    }
}
