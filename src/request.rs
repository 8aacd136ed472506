//! Request Builder (§3 "Unsigned Request", §4.3): assembling an
//! unsigned request prior to signing.

use crate::response::Decoder;
use crate::service::{Protocol, ServiceDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Delete,
    Get,
    Head,
    Options,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Delete => "DELETE",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// Request body variants (§3 "Body Variants").
pub enum Body {
    Empty,
    /// `String(mime, text)` — the MIME type is declared by the caller
    /// and is never overridden by the service's own content negotiation.
    String(String, String),
    /// Serialized compactly; content-type is `application/json` unless
    /// the service descriptor overrides it (§6.4).
    Json(serde_json::Value),
}

impl Body {
    /// The bytes whose SHA-256 becomes the payload hash, shared by
    /// `x-amz-content-sha256` and the canonical request's payload-hash
    /// line (computed once, used twice — §9 "Body hash caching").
    pub fn payload_bytes(&self) -> Vec<u8> {
        match self {
            Body::Empty => Vec::new(),
            Body::String(_, text) => text.as_bytes().to_vec(),
            Body::Json(value) => serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    /// `Some(mime)` only for the `String` variant, which declares its
    /// own content-type explicitly (§4.4.2 item 4).
    pub fn explicit_content_type(&self) -> Option<&str> {
        match self {
            Body::String(mime, _) => Some(mime.as_str()),
            _ => None,
        }
    }
}

/// An unsigned request: operation name, method, path, body, headers,
/// query, and a response decoder. Carries no credentials or timestamp.
///
/// `add_headers`/`add_query` append to the existing sequences in
/// place, preserving order, matching the builder semantics of §4.3.
/// Once handed to a send function the builder is considered consumed.
pub struct UnsignedRequest<T> {
    pub name: String,
    pub method: Method,
    pub path: String,
    pub body: Body,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub(crate) decoder: Decoder<T>,
}

impl<T> UnsignedRequest<T> {
    pub fn new(
        name: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        body: Body,
        decoder: Decoder<T>,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            body,
            headers: Vec::new(),
            query: Vec::new(),
            decoder,
        }
    }

    pub fn add_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn add_query<I, K, V>(&mut self, query: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(query.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Pre-signing transformation applied by both signed and unsigned sends
/// (§4.3): for `Protocol::Json` services, prepend
/// `x-amz-target: <target_prefix>.<operation_name>`. No other protocol
/// dialect injects headers at this stage.
pub(crate) fn apply_protocol_headers<T>(
    service: &ServiceDescriptor,
    request: &mut UnsignedRequest<T>,
) {
    if service.protocol == Protocol::Json {
        let target = format!("{}.{}", service.target_prefix, request.name);
        request.headers.insert(0, ("x-amz-target".to_string(), target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::constant_decoder;
    use crate::service::Signer;

    fn noop_request() -> UnsignedRequest<()> {
        UnsignedRequest::new(
            "ListCertificates",
            Method::Get,
            "/",
            Body::Empty,
            constant_decoder(()),
        )
    }

    #[test]
    fn add_headers_and_query_append_in_order() {
        let mut req = noop_request();
        req.add_headers([("a", "1")]);
        req.add_headers([("b", "2")]);
        assert_eq!(
            req.headers,
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );

        req.add_query([("x", "1"), ("y", "2")]);
        assert_eq!(
            req.query,
            vec![("x".to_string(), "1".to_string()), ("y".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn json_protocol_prepends_target_header() {
        let service = ServiceDescriptor::define_global(
            "certificatemanager",
            "2015-12-08",
            Protocol::Json,
            Signer::SignV4,
        )
        .set_target_prefix("CertificateManager");

        let mut req = noop_request();
        req.add_headers([("x-custom", "value")]);
        apply_protocol_headers(&service, &mut req);

        assert_eq!(
            req.headers[0],
            ("x-amz-target".to_string(), "CertificateManager.ListCertificates".to_string())
        );
        assert_eq!(req.headers[1], ("x-custom".to_string(), "value".to_string()));
    }

    #[test]
    fn non_json_protocol_injects_nothing() {
        let service =
            ServiceDescriptor::define_global("sts", "2011-06-15", Protocol::Query, Signer::SignV4);
        let mut req = noop_request();
        apply_protocol_headers(&service, &mut req);
        assert!(req.headers.is_empty());
    }

    #[test]
    fn empty_body_hashes_to_empty_string_sha256() {
        assert!(Body::Empty.payload_bytes().is_empty());
    }

    #[test]
    fn string_body_declares_its_own_mime() {
        let body = Body::String("text/plain".to_string(), "hi".to_string());
        assert_eq!(body.explicit_content_type(), Some("text/plain"));
        assert_eq!(body.payload_bytes(), b"hi");
    }

    #[test]
    fn json_body_has_no_explicit_mime_override() {
        let body = Body::Json(serde_json::json!({"a": 1}));
        assert_eq!(body.explicit_content_type(), None);
        assert_eq!(body.payload_bytes(), br#"{"a":1}"#);
    }
}
