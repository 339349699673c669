//! HTTP utilities for Azure Resource Manager REST calls

use anyhow::{Context, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Header carrying a per-request correlation ID
const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// A non-success response from the management API
#[derive(Debug, Clone, Error)]
#[error("API request failed: {status} {code}: {message}")]
pub struct ApiError {
    pub status: u16,
    /// ARM error code, e.g. `ResourceNotFound`
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Decode an ARM error body (`{"error": {"code", "message"}}`)
    fn from_body(status: StatusCode, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let error = parsed.as_ref().and_then(|v| v.get("error"));

        let code = error
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown"))
            .to_string();
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| sanitize_for_log(body));

        Self {
            status: status.as_u16(),
            code,
            message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }
}

/// A successful response: status, headers and the decoded body
#[derive(Debug, Clone)]
pub struct ArmResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `Value::Null` when the body was empty
    pub body: Value,
}

impl ArmResponse {
    /// Read a header as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// HTTP client wrapper for ARM API calls
#[derive(Clone)]
pub struct ArmHttpClient {
    client: Client,
}

impl ArmHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("arm-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: &str) -> Result<ArmResponse> {
        self.send(Method::GET, url, token, None).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put(&self, url: &str, token: &str, body: &Value) -> Result<ArmResponse> {
        self.send(Method::PUT, url, token, Some(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, token: &str) -> Result<ArmResponse> {
        self.send(Method::DELETE, url, token, None).await
    }

    /// Send a request and decode the response.
    /// Non-2xx responses become an [`ApiError`].
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Result<ArmResponse> {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!("{} {} ({})", method, url, request_id);

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(token)
            .header(CLIENT_REQUEST_ID_HEADER, &request_id);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            if status == StatusCode::NOT_FOUND {
                tracing::debug!("API returned 404 - {}", sanitize_for_log(&text));
            } else {
                tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
            }
            return Err(ApiError::from_body(status, &text).into());
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).context("Failed to parse response JSON")?
        };

        Ok(ArmResponse {
            status,
            headers,
            body,
        })
    }
}

/// Short remediation hint for an API failure, if one applies
pub fn error_hint(error: &anyhow::Error) -> Option<&'static str> {
    let api = error.chain().find_map(|e| e.downcast_ref::<ApiError>())?;

    match api.status {
        401 => Some("Authentication failed. Check ARM_ACCESS_TOKEN or the client credentials."),
        403 => Some("Permission denied. Check the role assignments of the calling principal."),
        404 => Some("Resource not found."),
        409 => Some("Resource conflict. The resource may already exist or be in use."),
        429 => Some("Rate limit exceeded. Please try again later."),
        400 => Some("Invalid request. Check your parameters."),
        500 | 502 | 503 => Some("Azure service temporarily unavailable. Please try again."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_decodes_arm_body() {
        let body = r#"{"error":{"code":"ResourceNotFound","message":"The Resource was not found."}}"#;
        let err = ApiError::from_body(StatusCode::NOT_FOUND, body);
        assert_eq!(err.status, 404);
        assert_eq!(err.code, "ResourceNotFound");
        assert_eq!(err.message, "The Resource was not found.");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_api_error_falls_back_to_reason() {
        let err = ApiError::from_body(StatusCode::BAD_GATEWAY, "upstream\nfailure");
        assert_eq!(err.code, "Bad Gateway");
        assert_eq!(err.message, "upstreamfailure");
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_error_hint_through_context() {
        let err: anyhow::Error = ApiError {
            status: 403,
            code: "AuthorizationFailed".into(),
            message: "no".into(),
        }
        .into();
        let err = err.context("retrieving dataset");
        assert!(error_hint(&err).unwrap().starts_with("Permission denied"));
    }
}
