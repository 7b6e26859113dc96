//! HTTP transport to the connector backend.
//!
//! The backend's endpoints disagree on their reply shape: some return
//! `{"success": bool, "message"}`, others `{"status": "success"|"error",
//! "message"}`. Both normalize into [`BackendReply`] here so the driver
//! sees one shape.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend replied with malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, ClientError>;

/// Normalized backend verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendReply {
    pub ok: bool,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReply {
    Flagged {
        success: bool,
        #[serde(default)]
        message: String,
    },
    Status {
        status: String,
        #[serde(default)]
        message: String,
    },
}

fn normalize(value: &Value) -> Result<BackendReply> {
    let raw: RawReply = serde_json::from_value(value.clone())?;
    Ok(match raw {
        RawReply::Flagged { success, message } => BackendReply { ok: success, message },
        RawReply::Status { status, message } => BackendReply {
            ok: status == "success",
            message,
        },
    })
}

/// Turns an HTTP status and response body into a verdict. Non-2xx statuses
/// are failures no matter what the body claims; their message comes from
/// the body when one parses, since the backend reports validation errors
/// as 400/500 replies with a reason attached.
fn verdict(status: reqwest::StatusCode, body: &str) -> Result<BackendReply> {
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| normalize(&value).ok())
            .filter(|reply| !reply.message.is_empty())
            .map_or_else(|| format!("backend returned HTTP {status}"), |reply| reply.message);
        return Ok(BackendReply { ok: false, message });
    }
    let value: Value = serde_json::from_str(body)?;
    normalize(&value)
}

/// Seam between the submit driver and the network.
pub trait Transport {
    /// Posts a JSON document and returns the normalized verdict.
    fn post_json(&self, path: &str, body: &Value) -> Result<BackendReply>;

    /// Posts urlencoded form fields and returns the normalized verdict.
    fn post_form(&self, path: &str, fields: &[(String, String)]) -> Result<BackendReply>;

    /// Fetches a page's preset document.
    fn fetch_preset(&self, path: &str) -> Result<Value>;
}

/// Blocking HTTP transport against a configured base URL.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn decode(response: reqwest::blocking::Response) -> Result<BackendReply> {
        let status = response.status();
        let body = response.text()?;
        verdict(status, &body)
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, path: &str, body: &Value) -> Result<BackendReply> {
        Self::decode(self.client.post(self.url(path)).json(body).send()?)
    }

    fn post_form(&self, path: &str, fields: &[(String, String)]) -> Result<BackendReply> {
        Self::decode(self.client.post(self.url(path)).form(fields).send()?)
    }

    fn fetch_preset(&self, path: &str) -> Result<Value> {
        let value: Value = self
            .client
            .get(self.url(path))
            .send()?
            .error_for_status()?
            .json()?;
        // Some endpoints wrap the document in an envelope.
        for key in ["preset", "data"] {
            if let Some(inner) = value.get(key) {
                return Ok(inner.clone());
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flagged_replies_normalize() {
        let reply = normalize(&json!({ "success": true, "message": "pushed" })).unwrap();
        assert_eq!(reply, BackendReply { ok: true, message: "pushed".to_string() });

        let reply = normalize(&json!({ "success": false })).unwrap();
        assert!(!reply.ok);
        assert_eq!(reply.message, "");
    }

    #[test]
    fn status_replies_normalize() {
        let reply = normalize(&json!({ "status": "success", "message": "ok" })).unwrap();
        assert!(reply.ok);

        let reply = normalize(&json!({ "status": "error", "message": "missing field" })).unwrap();
        assert!(!reply.ok);
        assert_eq!(reply.message, "missing field");
    }

    #[test]
    fn unrecognized_replies_are_malformed() {
        assert!(normalize(&json!({ "result": 1 })).is_err());
    }

    #[test]
    fn non_2xx_is_a_failure_even_with_a_success_body() {
        use reqwest::StatusCode;

        let reply =
            verdict(StatusCode::INTERNAL_SERVER_ERROR, r#"{"success": true}"#).unwrap();
        assert!(!reply.ok);
        assert_eq!(reply.message, "backend returned HTTP 500 Internal Server Error");
    }

    #[test]
    fn non_2xx_keeps_the_body_message() {
        use reqwest::StatusCode;

        let reply = verdict(
            StatusCode::BAD_REQUEST,
            r#"{"status": "error", "message": "missing field"}"#,
        )
        .unwrap();
        assert!(!reply.ok);
        assert_eq!(reply.message, "missing field");

        // An unparseable error body still reports the status.
        let reply = verdict(StatusCode::BAD_GATEWAY, "<html>").unwrap();
        assert!(!reply.ok);
        assert!(reply.message.contains("502"));
    }

    #[test]
    fn ok_status_with_malformed_body_is_an_error() {
        use reqwest::StatusCode;

        assert!(verdict(StatusCode::OK, "not json").is_err());
        let reply = verdict(StatusCode::OK, r#"{"success": true, "message": "m"}"#).unwrap();
        assert!(reply.ok);
    }
}
