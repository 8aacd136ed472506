//! SigV4 Signing Engine (§4.4): timestamp formatting, canonical
//! request construction, string-to-sign, key derivation, the
//! HMAC-SHA256 chain, and Authorization header synthesis.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::credentials::Credentials;
use crate::error::TransportError;
use crate::request::{apply_protocol_headers, Method, UnsignedRequest};
use crate::response::StatusClass;
use crate::service::{ServiceDescriptor, Signer, TimestampFormat};
use crate::transport::{RawResponse, SignedRequest, Transport};
use crate::uri;

type HmacSha256 = Hmac<Sha256>;

/// ISO 8601 basic-format timestamp (§4.4.1): `YYYYMMDDTHHMMSSZ`.
pub fn format_posix(t: DateTime<Utc>) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Renders `t` per a service's declared [`TimestampFormat`] (§3). Not
/// consulted by the SigV4 header-signing path itself — `x-amz-date` is
/// always ISO-8601-basic per §4.4.1 regardless of this setting — this
/// exists for service operations that embed a `Timestamp` parameter in
/// the request body/query using the service's own convention.
pub fn format_timestamp(format: TimestampFormat, t: DateTime<Utc>) -> String {
    match format {
        TimestampFormat::Iso8601 => t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        TimestampFormat::Rfc822 => t.to_rfc2822(),
        TimestampFormat::UnixTimestamp => t.timestamp().to_string(),
    }
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn hmac_sha256(key: &[u8], msg: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts a key of any length");
    mac.update(msg);
    mac.finalize().into_bytes().to_vec()
}

/// Four-step HMAC chain deriving the signing key (§4.4.5).
fn derive_signing_key(secret_access_key: &str, short_date: &str, region: &str, signing_name: &str) -> Vec<u8> {
    let k_secret = format!("AWS4{}", secret_access_key);
    let k_date = hmac_sha256(k_secret.as_bytes(), short_date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, signing_name.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// Lowercases a header name, trims ASCII whitespace from the value and
/// collapses internal whitespace runs to a single space, then groups
/// by name (combining repeated values with a comma) and sorts ascending
/// (§4.4.3 item 4). `host` is synthesized rather than taken from
/// `headers`. `content-type` and `accept` are excluded from the signed
/// set regardless of case (§9 "Header filtering before signing").
fn canonical_headers(host: &str, headers: &[(String, String)]) -> (String, String) {
    use std::collections::BTreeMap;

    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    grouped.entry("host".to_string()).or_default().push(host.to_string());
    for (name, value) in headers {
        let lname = name.to_lowercase();
        if lname == "content-type" || lname == "accept" {
            continue;
        }
        let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
        grouped.entry(lname).or_default().push(collapsed);
    }

    let mut canonical = String::new();
    let mut names = Vec::with_capacity(grouped.len());
    for (name, values) in &grouped {
        canonical.push_str(name);
        canonical.push(':');
        canonical.push_str(&values.join(","));
        canonical.push('\n');
        names.push(name.clone());
    }
    (canonical, names.join(";"))
}

/// Inputs to the core canonicalization + signing math, independent of
/// any particular `UnsignedRequest`/`Transport` — this is the seam the
/// known-answer vectors in §8 exercise directly.
pub struct SigningContext<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub region: &'a str,
    pub signing_name: &'a str,
    /// Already formatted per [`format_posix`].
    pub timestamp: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub query: &'a [(String, String)],
    /// Headers to sign, in addition to the synthetic `Host` header.
    pub headers: &'a [(String, String)],
    pub host: &'a str,
    pub payload_hash: &'a str,
    /// AWS's double-URI-encoding quirk for non-S3 signers (§4.4.3 item 2).
    pub double_encode_uri: bool,
}

pub struct Authorization {
    pub value: String,
    pub signed_headers: String,
    pub signature: String,
    pub credential_scope: String,
}

/// Runs the canonical request → string-to-sign → key derivation →
/// Authorization pipeline (§4.4.3–§4.4.6).
pub fn sign(ctx: &SigningContext<'_>) -> Authorization {
    let canonical_uri = uri::canonical_uri(ctx.path, ctx.double_encode_uri);
    let canonical_query = uri::canonical_query_string(ctx.query);
    let (canonical_headers, signed_headers) = canonical_headers(ctx.host, ctx.headers);

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        ctx.method, canonical_uri, canonical_query, canonical_headers, signed_headers, ctx.payload_hash
    );

    let short_date = &ctx.timestamp[..8];
    let credential_scope = format!(
        "{}/{}/{}/aws4_request",
        short_date, ctx.region, ctx.signing_name
    );
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        ctx.timestamp,
        credential_scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let signing_key = derive_signing_key(ctx.secret_access_key, short_date, ctx.region, ctx.signing_name);
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    let value = format!(
        "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
        ctx.access_key_id, credential_scope, signed_headers, signature
    );

    Authorization {
        value,
        signed_headers,
        signature,
        credential_scope,
    }
}

fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
}

/// Pre-signing header augmentation (§4.4.2), applied in order:
/// `x-amz-date`, `x-amz-content-sha256`, `Accept` and `Content-Type`
/// (the latter two only when not already caller-supplied).
fn add_initial_headers<T>(
    service: &ServiceDescriptor,
    request: &mut UnsignedRequest<T>,
    timestamp: &str,
    payload_hash: &str,
) {
    request.headers.push(("x-amz-date".to_string(), timestamp.to_string()));
    request
        .headers
        .push(("x-amz-content-sha256".to_string(), payload_hash.to_string()));
    if !has_header(&request.headers, "accept") {
        request
            .headers
            .push(("Accept".to_string(), service.accept_type().to_string()));
    }
    if !has_header(&request.headers, "content-type") {
        let content_type = match request.body.explicit_content_type() {
            Some(mime) => mime.to_string(),
            None => service.content_type(),
        };
        request.headers.push(("Content-Type".to_string(), content_type));
    }
}

fn wire_request(method: Method, host: String, path: &str, query: &[(String, String)], headers: Vec<(String, String)>, body: Vec<u8>) -> SignedRequest {
    SignedRequest {
        method,
        host,
        path: uri::canonical_uri(path, false),
        query_string: uri::query_string(query),
        headers,
        body,
    }
}

async fn dispatch<T>(
    signed: SignedRequest,
    transport: &dyn Transport,
    decoder: crate::response::Decoder<T>,
) -> Result<T, TransportError> {
    match transport.send(signed).await {
        Ok(RawResponse { metadata, body }) => {
            let status_class = StatusClass::of(metadata.status_code);
            if status_class == StatusClass::BadStatus {
                tracing::warn!(status = metadata.status_code, url = %metadata.url, "non-2xx response from AWS");
            }
            decoder(status_class, &metadata, &body)
        }
        Err(e) => {
            tracing::error!(error = %e, "transport failure sending AWS request");
            Err(e)
        }
    }
}

/// Prepares and issues a SigV4-signed request (§4.4, §4.4.9).
///
/// If `service.signer == Signer::SignS3` the send fails immediately
/// with `BadBody` and no network I/O occurs (S5 in §8) — the S3
/// signing variant is a recognized, explicitly unimplemented dispatch
/// path (§1, §9 "S3 signer").
pub async fn send_signed<T>(
    service: &ServiceDescriptor,
    credentials: &Credentials,
    request: UnsignedRequest<T>,
    transport: &dyn Transport,
) -> Result<T, TransportError> {
    send_signed_at(service, credentials, request, transport, Utc::now()).await
}

/// Same as [`send_signed`] but with an injectable "current time", so
/// callers (and tests) can pin the signing timestamp.
pub async fn send_signed_at<T>(
    service: &ServiceDescriptor,
    credentials: &Credentials,
    mut request: UnsignedRequest<T>,
    transport: &dyn Transport,
    now: DateTime<Utc>,
) -> Result<T, TransportError> {
    if service.signer == Signer::SignS3 {
        return Err(TransportError::BadBody(
            "TODO: S3 Signing Scheme not implemented.".to_string(),
        ));
    }

    apply_protocol_headers(service, &mut request);

    let payload = request.body.payload_bytes();
    let payload_hash = sha256_hex(&payload);
    let timestamp = format_posix(now);
    add_initial_headers(service, &mut request, &timestamp, &payload_hash);

    let host = service.host();
    let region = service.region();
    let signing_name = service.signing_name().to_string();

    let auth = sign(&SigningContext {
        access_key_id: &credentials.access_key_id,
        secret_access_key: &credentials.secret_access_key,
        region: &region,
        signing_name: &signing_name,
        timestamp: &timestamp,
        method: request.method.as_str(),
        path: &request.path,
        query: &request.query,
        headers: &request.headers,
        host: &host,
        payload_hash: &payload_hash,
        double_encode_uri: true,
    });

    tracing::debug!(
        service = %service.endpoint_prefix,
        operation = %request.name,
        method = %request.method.as_str(),
        path = %request.path,
        "signing AWS request"
    );

    let mut outgoing_headers = std::mem::take(&mut request.headers);
    outgoing_headers.push(("Authorization".to_string(), auth.value));
    if let Some(token) = &credentials.session_token {
        outgoing_headers.push(("x-amz-security-token".to_string(), token.clone()));
    }

    let signed = wire_request(
        request.method,
        host,
        &request.path,
        &request.query,
        outgoing_headers,
        payload,
    );

    dispatch(signed, transport, request.decoder).await
}

/// Prepares a request without authentication (§4.4.8): the same
/// pre-signing header augmentation as the signed path, but no
/// canonicalization, key derivation, or Authorization header.
pub async fn send_unsigned<T>(
    service: &ServiceDescriptor,
    mut request: UnsignedRequest<T>,
    transport: &dyn Transport,
) -> Result<T, TransportError> {
    apply_protocol_headers(service, &mut request);

    let payload = request.body.payload_bytes();
    let payload_hash = sha256_hex(&payload);
    let timestamp = format_posix(Utc::now());
    add_initial_headers(service, &mut request, &timestamp, &payload_hash);

    let host = service.host();
    let headers = std::mem::take(&mut request.headers);
    let signed = wire_request(request.method, host, &request.path, &request.query, headers, payload);

    dispatch(signed, transport, request.decoder).await
}
