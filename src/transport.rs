//! The pluggable HTTP transport seam (§1, §5). The signing engine never
//! hardcodes a client: it hands a fully decorated [`SignedRequest`] to
//! whatever [`Transport`] the caller supplies.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::Method;
use crate::response::ResponseMetadata;

/// A request that has been through request-shaping (and, for SigV4,
/// signing) and is ready to issue over the wire (§6.1).
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: Method,
    pub host: String,
    /// Already percent-encoded per §4.1 (single-encoded; the SigV4
    /// double-encoding quirk applies only to the canonical request used
    /// for signing, never to the URI actually dispatched).
    pub path: String,
    /// Already assembled per [`crate::uri::query_string`] — empty
    /// string or a `?`-prefixed query.
    pub query_string: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub metadata: ResponseMetadata,
    pub body: Vec<u8>,
}

/// Pluggable HTTP transport. Transport-layer failures (bad URL,
/// timeout, network error) must be reported as the corresponding
/// `TransportError` variant — they bypass the decoder entirely (§4.5).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: SignedRequest) -> Result<RawResponse, TransportError>;
}

#[cfg(feature = "reqwest-transport")]
mod reqwest_transport {
    use super::*;
    use std::collections::HashMap;

    /// Default [`Transport`] backed by `reqwest`/rustls. Constructed
    /// with no timeout by default (§5) and without retry middleware —
    /// retries are explicitly out of scope (§1 Non-goals) and are the
    /// caller's policy to layer on.
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            let client = reqwest::Client::builder()
                .use_rustls_tls()
                .build()
                .expect("failed to build reqwest client");
            Self { client }
        }
    }

    impl Default for ReqwestTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn send(&self, request: SignedRequest) -> Result<RawResponse, TransportError> {
            let url = format!("https://{}{}{}", request.host, request.path, request.query_string);

            let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
                .map_err(|e| TransportError::BadUrl(e.to_string()))?;

            let mut builder = self.client.request(method, &url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = builder
                .body(request.body)
                .send()
                .await
                .map_err(|e| classify_send_error(&e, &url))?;

            let status_code = response.status().as_u16();
            let status_text = response
                .status()
                .canonical_reason()
                .unwrap_or_default()
                .to_string();
            let mut headers = HashMap::new();
            for (name, value) in response.headers() {
                if let Ok(v) = value.to_str() {
                    headers.insert(name.to_string(), v.to_string());
                }
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::NetworkError(e.to_string()))?
                .to_vec();

            Ok(RawResponse {
                metadata: ResponseMetadata {
                    url,
                    status_code,
                    status_text,
                    headers,
                },
                body,
            })
        }
    }

    fn classify_send_error(e: &reqwest::Error, url: &str) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_builder() || e.is_request() {
            TransportError::BadUrl(url.to_string())
        } else {
            TransportError::NetworkError(e.to_string())
        }
    }
}

#[cfg(feature = "reqwest-transport")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_request_carries_separately_assembled_path_and_query() {
        let req = SignedRequest {
            method: Method::Get,
            host: "example.amazonaws.com".to_string(),
            path: "/a/b".to_string(),
            query_string: "?x=1".to_string(),
            headers: vec![("Host".to_string(), "example.amazonaws.com".to_string())],
            body: Vec::new(),
        };
        assert_eq!(format!("https://{}{}{}", req.host, req.path, req.query_string), "https://example.amazonaws.com/a/b?x=1");
    }
}
