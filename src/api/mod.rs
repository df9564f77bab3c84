//! HTTP access to the Living Apps records API.
//!
//! One resource path per collection:
//! `GET|POST /apps/{appId}/records`, `GET|PATCH|DELETE /apps/{appId}/records/{id}`.
//! Failures are terminal per operation: there is no retry policy and no
//! request timeout; callers surface errors and move on.

pub mod records;

use serde::Serialize;

/// Connection settings shared by all collection clients.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base path without trailing slash, e.g. `https://my.living-apps.de/rest`.
    pub base_url: String,
    /// Optional API key, attached as `X-API-Key` to every request.
    pub api_key: Option<String>,
}

impl ApiConfig {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network-level failure (connect, DNS, body read).
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx response; `body` carries the response text as diagnostic.
    #[error("API error {status}: {body}")]
    Transport { status: u16, body: String },
}

/// Send a request, attaching the API key when configured, and turn any
/// non-success status into [`ApiError::Transport`].
pub(crate) async fn send_checked(
    request: reqwest::RequestBuilder,
    api_key: Option<&str>,
) -> Result<reqwest::Response, ApiError> {
    let request = match api_key {
        Some(key) => request.header("X-API-Key", key),
        None => request,
    };

    let resp = request.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Transport {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

/// Request body shape for POST/PATCH: `{"fields": {...}}`.
#[derive(Debug, Serialize)]
pub(crate) struct FieldsBody<'a, F: Serialize> {
    pub fields: &'a F,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_trims_trailing_slash() {
        let config = ApiConfig::new("https://my.living-apps.de/rest/", None);
        assert_eq!(config.base_url, "https://my.living-apps.de/rest");
    }

    #[test]
    fn test_fields_body_shape() {
        let fields = crate::types::EmployeeFields {
            name: Some("Anna".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(FieldsBody { fields: &fields }).unwrap();
        assert_eq!(body["fields"]["name"], "Anna");
        assert!(body["fields"].get("role").is_none());
    }
}
