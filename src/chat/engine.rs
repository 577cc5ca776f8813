use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::EngineConfig, error::ApiError};

/// Body sent to the external conversational engine.
#[derive(Debug, Serialize)]
struct EngineRequest<'a> {
    user_input: &'a str,
    detail_mode: &'a str,
    user_id: String,
}

/// Engine reply, passed through to the client verbatim. `sentiment` is
/// whatever classification object the engine attaches, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<serde_json::Value>,
}

/// Synchronous proxy to the external engine. Holds a single reqwest
/// client with a bounded timeout; performs no persistence and no retries.
#[derive(Clone)]
pub struct EngineClient {
    http: reqwest::Client,
    base_url: String,
    detail_mode: String,
}

impl EngineClient {
    pub fn new(cfg: &EngineConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            detail_mode: cfg.detail_mode.clone(),
        })
    }

    /// Forward one user message and wait for the engine's reply.
    ///
    /// An empty message is rejected before any network I/O. A non-2xx
    /// status or a transport failure surfaces as `ApiError::Upstream`
    /// carrying the engine's diagnostic body when one is available.
    pub async fn ask(&self, user_id: Uuid, message: &str) -> Result<EngineReply, ApiError> {
        if message.trim().is_empty() {
            return Err(ApiError::Validation("Message is required".into()));
        }

        let body = EngineRequest {
            user_input: message,
            detail_mode: &self.detail_mode,
            user_id: user_id.to_string(),
        };

        let resp = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "engine unreachable");
                ApiError::Upstream {
                    status: None,
                    detail: e.to_string(),
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            warn!(%status, "engine returned error status");
            return Err(ApiError::Upstream {
                status: Some(status.as_u16()),
                detail,
            });
        }

        let reply = resp.json::<EngineReply>().await.map_err(|e| {
            warn!(error = %e, "engine reply not decodable");
            ApiError::Upstream {
                status: Some(status.as_u16()),
                detail: e.to_string(),
            }
        })?;

        debug!(user_id = %user_id, "engine replied");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> EngineClient {
        EngineClient::new(&EngineConfig {
            base_url: base_url.into(),
            timeout_secs: 2,
            detail_mode: "concise".into(),
        })
        .expect("engine client")
    }

    #[tokio::test]
    async fn ask_forwards_message_and_returns_reply() {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_partial_json(json!({
                "user_input": "I have a headache",
                "detail_mode": "concise",
                "user_id": user_id.to_string(),
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "reply": "Stay hydrated and rest.",
                "sentiment": { "emotion": "neutral", "compound": 0.0 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server.uri())
            .ask(user_id, "I have a headache")
            .await
            .expect("ask");
        assert_eq!(reply.reply, "Stay hydrated and rest.");
        assert_eq!(reply.sentiment.unwrap()["emotion"], "neutral");
    }

    #[tokio::test]
    async fn ask_tolerates_missing_sentiment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "reply": "Hello." })),
            )
            .mount(&server)
            .await;

        let reply = client(&server.uri())
            .ask(Uuid::new_v4(), "hi")
            .await
            .expect("ask");
        assert_eq!(reply.reply, "Hello.");
        assert!(reply.sentiment.is_none());
    }

    #[tokio::test]
    async fn ask_rejects_empty_message_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .ask(Uuid::new_v4(), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn ask_maps_error_status_to_upstream_with_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .ask(Uuid::new_v4(), "hello")
            .await
            .unwrap_err();
        match err {
            ApiError::Upstream { status, detail } => {
                assert_eq!(status, Some(500));
                assert_eq!(detail, "model crashed");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ask_maps_connection_failure_to_upstream() {
        // Nothing listens on this port.
        let err = client("http://127.0.0.1:1")
            .ask(Uuid::new_v4(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Upstream { status: None, .. }));
    }
}
