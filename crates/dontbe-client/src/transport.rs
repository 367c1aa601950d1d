//! Transport seam.
//!
//! Sessions and toggles only ever see [`Transport`]; [`HttpTransport`] is the
//! production implementation over reqwest, and tests swap in scripted fakes.

use crate::config::ClientConfig;
use async_trait::async_trait;
use dontbe_core::ResponseEnvelope;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Which API root a path is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
}

/// One request, independent of how it is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub version: ApiVersion,
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            version: ApiVersion::V1,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn v2(mut self) -> Self {
        self.version = ApiVersion::V2;
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        for (index, (key, value)) in self.query.iter().enumerate() {
            let sep = if index == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

/// Network or decoding failure below the envelope.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response envelope: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server returned {status} without an envelope: {body}")]
    Status { status: u16, body: String },
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Generic authenticated request primitive.
///
/// Implementations send `request` with `token` as bearer credentials and
/// return the decoded envelope. An envelope carrying an error status is
/// still `Ok`; interpreting the status is the caller's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        request: ApiRequest,
        token: &str,
    ) -> Result<ResponseEnvelope<Value>, TransportError>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    v1_base: String,
    v2_base: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            v1_base: config.base_url.clone(),
            v2_base: config.v2_base_url(),
        })
    }

    /// Absolute URL for a request path.
    pub fn url_for(&self, version: ApiVersion, path: &str) -> String {
        let base = match version {
            ApiVersion::V1 => &self.v1_base,
            ApiVersion::V2 => &self.v2_base,
        };
        join_url(base, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        request: ApiRequest,
        token: &str,
    ) -> Result<ResponseEnvelope<Value>, TransportError> {
        let url = self.url_for(request.version, &request.path);
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .bearer_auth(token)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        match serde_json::from_slice::<ResponseEnvelope<Value>>(&bytes) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }),
            Err(err) => Err(TransportError::Decode(err)),
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer one request with a canned response; the handle yields the
    /// raw request head as received.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (ClientConfig, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });
        let config = ClientConfig {
            base_url: format!("http://{}/api/v1", addr),
            ..ClientConfig::default()
        };
        (config, handle)
    }

    #[tokio::test]
    async fn sends_bearer_and_cursor() {
        let (config, server) = serve_once("200 OK", r#"{"status":200,"message":"ok","data":[]}"#).await;
        let transport = HttpTransport::new(&config).unwrap();

        let envelope = transport
            .request(ApiRequest::get("/notifications").query("cursor", "-1"), "tok-1")
            .await
            .unwrap();
        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.data, Some(json!([])));

        let head = server.await.unwrap().to_lowercase();
        assert!(head.starts_with("get /api/v1/notifications?cursor=-1 http/1.1"));
        assert!(head.contains("authorization: bearer tok-1"));
    }

    #[tokio::test]
    async fn error_status_with_envelope_is_returned() {
        let (config, server) =
            serve_once("400 Bad Request", r#"{"status":400,"message":"already voted"}"#).await;
        let transport = HttpTransport::new(&config).unwrap();

        let envelope = transport
            .request(
                ApiRequest::post("/ghost2").json(&json!({"alarmTriggerId": 3})).unwrap(),
                "tok",
            )
            .await
            .unwrap();
        assert_eq!(envelope.status, 400);
        assert_eq!(envelope.message, "already voted");
        assert!(server.await.unwrap().starts_with("POST /api/v1/ghost2 "));
    }

    #[tokio::test]
    async fn error_status_without_envelope() {
        let (config, server) = serve_once("502 Bad Gateway", "<html>bad gateway</html>").await;
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport
            .request(ApiRequest::get("/viewmember/1"), "tok")
            .await
            .unwrap_err();
        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 502);
                assert!(body.contains("bad gateway"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn undecodable_success_is_a_decode_error() {
        let (config, server) = serve_once("200 OK", "not json").await;
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport
            .request(ApiRequest::get("/notifications"), "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
        server.await.unwrap();
    }

    #[test]
    fn join_handles_slashes() {
        assert_eq!(
            join_url("http://host/api/v1/", "/member/1/member-contents"),
            "http://host/api/v1/member/1/member-contents"
        );
        assert_eq!(join_url("http://host/api/v1", "ghost2"), "http://host/api/v1/ghost2");
    }

    #[test]
    fn url_for_picks_root() {
        let config = ClientConfig {
            base_url: "http://host/api/v1".to_string(),
            ..ClientConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.url_for(ApiVersion::V2, "/content/5/detail"),
            "http://host/api/v2/content/5/detail"
        );
        assert_eq!(
            transport.url_for(ApiVersion::V1, "/viewmember/5"),
            "http://host/api/v1/viewmember/5"
        );
    }

    #[test]
    fn request_builder_and_display() {
        let request = ApiRequest::get("/notifications").query("cursor", "-1");
        assert_eq!(request.to_string(), "GET /notifications?cursor=-1");

        let request = ApiRequest::post("/content/3/liked")
            .json(&json!({"alarmTriggerType": "contentLiked"}))
            .unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, Some(json!({"alarmTriggerType": "contentLiked"})));
    }
}
