//! Typed wrapper over the REST API.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;
use validation_core::{
    ModelProject, NewValidationResult, ResultQuery, ValidationResult, ValidationTest,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid API url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {}", render_detail(.detail))]
    Api { status: u16, detail: Value },
}

impl ClientError {
    /// HTTP status for errors the server answered with.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn render_detail(detail: &Value) -> String {
    match detail {
        Value::String(text) => text.clone(),
        Value::Null => "no detail".to_string(),
        other => other.to_string(),
    }
}

/// Body of a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: Uuid,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(invalid("expected an absolute http(s) url".to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("validation-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ApiClient {
            http,
            base,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute url for `segments` below the base path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl {
                url: self.base.to_string(),
                reason: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "sending request");
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("detail").cloned())
            .unwrap_or(Value::Null);
        debug!(status = status.as_u16(), detail = %detail, "request rejected");
        Err(ClientError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(Method::POST, url).json(body)).await
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let url = self.endpoint(&["health"])?;
        self.send(self.request(Method::GET, url)).await
    }

    #[instrument(skip(self))]
    pub async fn list_results(
        &self,
        query: &ResultQuery,
    ) -> Result<Vec<ValidationResult>, ClientError> {
        let url = self.endpoint(&["results", ""])?;
        self.send(self.request(Method::GET, url).query(query)).await
    }

    #[instrument(skip(self))]
    pub async fn get_result(&self, id: Uuid) -> Result<ValidationResult, ClientError> {
        let url = self.endpoint(&["results", &id.to_string()])?;
        self.send(self.request(Method::GET, url)).await
    }

    #[instrument(skip_all)]
    pub async fn create_result(
        &self,
        payload: &NewValidationResult,
    ) -> Result<ValidationResult, ClientError> {
        let url = self.endpoint(&["results", ""])?;
        self.post_json(url, payload).await
    }

    /// Delete a result; the server echoes the removed id.
    #[instrument(skip(self))]
    pub async fn delete_result(&self, id: Uuid) -> Result<Deleted, ClientError> {
        let url = self.endpoint(&["results", &id.to_string()])?;
        self.send(self.request(Method::DELETE, url)).await
    }

    /// Fetch a model by id or alias.
    #[instrument(skip(self))]
    pub async fn get_model(&self, key: &str) -> Result<ModelProject, ClientError> {
        let url = self.endpoint(&["models", key])?;
        self.send(self.request(Method::GET, url)).await
    }

    /// Fetch a validation test by id or alias.
    #[instrument(skip(self))]
    pub async fn get_test(&self, key: &str) -> Result<ValidationTest, ClientError> {
        let url = self.endpoint(&["tests", key])?;
        self.send(self.request(Method::GET, url)).await
    }
}
