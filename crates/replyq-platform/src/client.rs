// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the posting platform.
//!
//! Provides [`PlatformClient`], the [`PostClient`] implementation. Every
//! platform-level result -- including non-2xx statuses, transport failures,
//! and per-call timeouts -- is reported as a [`PostOutcome`] so the engine's
//! classifier sees a uniform shape. Retry policy lives in the batch
//! processor, not here.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use tracing::{debug, warn};

use replyq_core::types::{Credential, PostOutcome, ReplyPayload};
use replyq_core::{PostClient, ReplyqError};

use crate::types::{ApiErrorResponse, CreatePostRequest, CreatePostResponse, ReplySettings};

/// Rate-limit window reset header: epoch seconds.
const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";

/// HTTP client for the posting platform API.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: reqwest::Client,
    base_url: String,
}

impl PlatformClient {
    /// Creates a new platform client.
    ///
    /// `timeout` is the per-call cap, distinct from any batch deadline; a
    /// timed-out call surfaces as a transport outcome and classifies as
    /// transient.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ReplyqError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReplyqError::Platform {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    /// Extract the quota reset hint from response headers, if present.
    fn reset_hint(response: &reqwest::Response) -> Option<chrono::DateTime<chrono::Utc>> {
        let epoch = response
            .headers()
            .get(RATE_LIMIT_RESET_HEADER)?
            .to_str()
            .ok()?
            .parse::<i64>()
            .ok()?;
        DateTime::from_timestamp(epoch, 0)
    }
}

#[async_trait]
impl PostClient for PlatformClient {
    async fn post(
        &self,
        target_id: &str,
        payload: &ReplyPayload,
        credential: &Credential,
    ) -> Result<PostOutcome, ReplyqError> {
        let request = CreatePostRequest {
            text: payload.text.clone(),
            reply: ReplySettings {
                in_reply_to_tweet_id: target_id.to_string(),
            },
        };

        // Bearer auth is per-request: the credential may rotate mid-batch.
        let response = self
            .client
            .post(format!("{}/2/tweets", self.base_url))
            .bearer_auth(&credential.access_token)
            .json(&request)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!(target_id, error = %e, "post transport failure");
                let detail = if e.is_timeout() {
                    format!("request timed out: {e}")
                } else {
                    format!("transport error: {e}")
                };
                return Ok(PostOutcome::transport(detail));
            }
        };

        let status = response.status();
        debug!(target_id, status = %status, "post response received");

        if status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return match serde_json::from_str::<CreatePostResponse>(&body) {
                Ok(created) => Ok(PostOutcome {
                    http_status: status.as_u16(),
                    message: String::new(),
                    reset_hint: None,
                    post_id: Some(created.data.id),
                }),
                // A 2xx with an unreadable body gives the classifier a
                // transient verdict; a retry then lands on the duplicate
                // path if the post actually went through.
                Err(e) => Ok(PostOutcome::transport(format!(
                    "malformed response body: {e}"
                ))),
            };
        }

        let reset_hint = Self::reset_hint(&response);
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body)
            .ok()
            .and_then(|err| err.message())
        {
            Some(msg) => format!("HTTP {}: {msg}", status.as_u16()),
            None => format!("HTTP {}: {body}", status.as_u16()),
        };

        Ok(PostOutcome {
            http_status: status.as_u16(),
            message,
            reset_hint,
            post_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> PlatformClient {
        PlatformClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn test_credential() -> Credential {
        Credential {
            access_token: "test-token".into(),
            expires_at: None,
        }
    }

    fn test_payload() -> ReplyPayload {
        ReplyPayload {
            text: "thanks for listening!".into(),
            draft_id: Some("draft-1".into()),
        }
    }

    #[tokio::test]
    async fn post_success_returns_created_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "text": "thanks for listening!",
                "reply": {"in_reply_to_tweet_id": "9001"}
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"data": {"id": "777"}})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let outcome = client
            .post("9001", &test_payload(), &test_credential())
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.http_status, 201);
        assert_eq!(outcome.post_id.as_deref(), Some("777"));
    }

    #[tokio::test]
    async fn forbidden_folds_error_body_into_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "title": "Forbidden",
                "detail": "the Tweet is deleted or not visible to you"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let outcome = client
            .post("9001", &test_payload(), &test_credential())
            .await
            .unwrap();

        assert_eq!(outcome.http_status, 403);
        assert!(outcome.message.contains("deleted or not visible"));
        assert!(outcome.post_id.is_none());
    }

    #[tokio::test]
    async fn rate_limit_carries_reset_hint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("x-rate-limit-reset", "1767225600")
                    .set_body_json(serde_json::json!({"title": "Too Many Requests"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let outcome = client
            .post("9001", &test_payload(), &test_credential())
            .await
            .unwrap();

        assert_eq!(outcome.http_status, 429);
        let reset = outcome.reset_hint.expect("reset hint should be parsed");
        assert_eq!(reset.timestamp(), 1767225600);
    }

    #[tokio::test]
    async fn non_json_error_body_degrades_to_raw_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let outcome = client
            .post("9001", &test_payload(), &test_credential())
            .await
            .unwrap();

        assert_eq!(outcome.http_status, 503);
        assert!(outcome.message.contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn connection_failure_becomes_transport_outcome() {
        // Nothing listening on this port.
        let client = test_client("http://127.0.0.1:9");
        let outcome = client
            .post("9001", &test_payload(), &test_credential())
            .await
            .unwrap();

        assert_eq!(outcome.http_status, 0);
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn malformed_success_body_becomes_transport_outcome() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let outcome = client
            .post("9001", &test_payload(), &test_credential())
            .await
            .unwrap();

        assert_eq!(outcome.http_status, 0);
        assert!(outcome.message.contains("malformed response body"));
    }
}
