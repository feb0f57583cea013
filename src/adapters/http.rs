use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Response, StatusCode};

use crate::domain::model::CallOutcome;
use crate::domain::ports::Discovery;
use crate::utils::error::Result;

/// HTTP caller for sibling services.
///
/// Resolution failures come back as `Err`; everything after a request
/// has been sent is classified into a [`CallOutcome`] so callers can
/// decide whether to degrade or to propagate.
pub struct SiblingCaller {
    discovery: Arc<dyn Discovery>,
    client: Client,
    timeout: Duration,
}

impl SiblingCaller {
    pub fn new(discovery: Arc<dyn Discovery>, timeout: Duration) -> Self {
        SiblingCaller {
            discovery,
            client: Client::new(),
            timeout,
        }
    }

    /// GET `path` on a freshly resolved instance of `service`.
    ///
    /// `auth` is the caller's Authorization header value, forwarded
    /// verbatim so the sibling sees the original bearer token.
    pub async fn get(&self, service: &str, path: &str, auth: Option<&str>) -> Result<CallOutcome> {
        self.request(Method::GET, service, path, None, auth).await
    }

    /// One logical cross-service call with an arbitrary method and an
    /// optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        service: &str,
        path: &str,
        body: Option<&serde_json::Value>,
        auth: Option<&str>,
    ) -> Result<CallOutcome> {
        let instance = self.discovery.resolve(service).await?;
        let url = format!("{}{}", instance.base_url(), path);

        let mut request = self.client.request(method, &url).timeout(self.timeout);
        if let Some(token) = auth {
            request = request.header(AUTHORIZATION, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let detail = if e.is_timeout() {
                    format!("{} did not answer within {:?}", service, self.timeout)
                } else {
                    e.to_string()
                };
                tracing::warn!("🔶 {} unreachable: {}", service, detail);
                return Ok(CallOutcome::Unavailable { detail });
            }
        };

        Ok(self.classify(service, response).await)
    }

    async fn classify(&self, service: &str, response: Response) -> CallOutcome {
        let status = response.status();

        if status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    return CallOutcome::Unavailable {
                        detail: format!("{} body read failed: {}", service, e),
                    }
                }
            };
            if text.trim().is_empty() {
                return CallOutcome::Ok(serde_json::Value::Null);
            }
            return match serde_json::from_str(&text) {
                Ok(value) => CallOutcome::Ok(value),
                Err(e) => CallOutcome::Unavailable {
                    detail: format!("{} sent an unparseable body: {}", service, e),
                },
            };
        }

        if status == StatusCode::NOT_FOUND {
            return CallOutcome::NotFound;
        }

        if status.is_client_error() {
            let detail = response.text().await.unwrap_or_default();
            let detail = if detail.trim().is_empty() {
                status.to_string()
            } else {
                detail
            };
            return CallOutcome::Invalid {
                status: status.as_u16(),
                detail,
            };
        }

        tracing::warn!("🔶 {} answered {}", service, status);
        CallOutcome::Unavailable {
            detail: format!("{} answered {}", service, status),
        }
    }
}
