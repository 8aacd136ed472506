//! Response Decoder Contract (§4.5): how transport bytes become a
//! typed success or typed failure.

use std::collections::HashMap;

use crate::error::TransportError;

/// Two-valued projection of the transport outcome (§3 "Response Status
/// Classification"). Lower-level transport failures never reach a
/// decoder — they short-circuit to a `TransportError` before this
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    GoodStatus,
    BadStatus,
}

impl StatusClass {
    pub fn of(status_code: u16) -> Self {
        if (200..300).contains(&status_code) {
            StatusClass::GoodStatus
        } else {
            StatusClass::BadStatus
        }
    }
}

/// Transport-provided response metadata (§4.5, §6.1).
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    pub url: String,
    pub status_code: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
}

/// A decoder maps `(status_class, metadata, body_bytes)` to a typed
/// result (§4.5). Boxed so an `UnsignedRequest<T>` can carry one
/// without becoming generic over a closure type.
pub type Decoder<T> =
    Box<dyn Fn(StatusClass, &ResponseMetadata, &[u8]) -> Result<T, TransportError> + Send + Sync>;

/// Delegates fully to `f`; any `Err(msg)` it returns becomes
/// `TransportError::BadBody(msg)`.
pub fn full_decoder<T, F>(f: F) -> Decoder<T>
where
    T: 'static,
    F: Fn(StatusClass, &ResponseMetadata, &[u8]) -> Result<T, String> + Send + Sync + 'static,
{
    Box::new(move |status, meta, body| f(status, meta, body).map_err(TransportError::BadBody))
}

/// Like [`full_decoder`], but `json` builds a JSON-decoding closure per
/// `(status, metadata)` which is then applied to the parsed body.
/// Decoding failure maps to `TransportError::BadBody(error_string)`.
pub fn json_full_decoder<T, F, D>(json: F) -> Decoder<T>
where
    T: 'static,
    D: Fn(serde_json::Value) -> Result<T, String> + Send + Sync + 'static,
    F: Fn(StatusClass, &ResponseMetadata) -> D + Send + Sync + 'static,
{
    Box::new(move |status, meta, body| {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| TransportError::BadBody(e.to_string()))?;
        let decode = json(status, meta);
        decode(value).map_err(TransportError::BadBody)
    })
}

/// Runs `f` only on `GoodStatus`; a `BadStatus` short-circuits to
/// `TransportError::BadStatus(status_code)` without consulting `f`.
pub fn string_body_decoder<T, F>(f: F) -> Decoder<T>
where
    T: 'static,
    F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
{
    Box::new(move |status, meta, body| match status {
        StatusClass::BadStatus => Err(TransportError::BadStatus(meta.status_code)),
        StatusClass::GoodStatus => {
            let text = String::from_utf8_lossy(body);
            f(&text).map_err(TransportError::BadBody)
        }
    })
}

/// Like [`string_body_decoder`], but parses the body as JSON before
/// handing it to `decode`.
pub fn json_body_decoder<T, F>(decode: F) -> Decoder<T>
where
    T: 'static,
    F: Fn(serde_json::Value) -> Result<T, String> + Send + Sync + 'static,
{
    Box::new(move |status, meta, body| match status {
        StatusClass::BadStatus => Err(TransportError::BadStatus(meta.status_code)),
        StatusClass::GoodStatus => {
            let value: serde_json::Value = serde_json::from_slice(body)
                .map_err(|e| TransportError::BadBody(e.to_string()))?;
            decode(value).map_err(TransportError::BadBody)
        }
    })
}

/// Returns `value` on `GoodStatus`; `BadStatus` short-circuits as
/// above. Useful for operations whose success carries no payload.
pub fn constant_decoder<T>(value: T) -> Decoder<T>
where
    T: Clone + Send + Sync + 'static,
{
    Box::new(move |status, meta, _body| match status {
        StatusClass::BadStatus => Err(TransportError::BadStatus(meta.status_code)),
        StatusClass::GoodStatus => Ok(value.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(status_code: u16) -> ResponseMetadata {
        ResponseMetadata {
            url: "https://example.amazonaws.com/".to_string(),
            status_code,
            status_text: "".to_string(),
            headers: HashMap::new(),
        }
    }

    #[test]
    fn string_body_decoder_short_circuits_on_bad_status() {
        let decoder: Decoder<String> = string_body_decoder(|s| Ok(s.to_string()));
        let result = decoder(StatusClass::BadStatus, &meta(500), b"ignored");
        assert_eq!(result, Err(TransportError::BadStatus(500)));
    }

    #[test]
    fn string_body_decoder_runs_on_good_status() {
        let decoder: Decoder<String> = string_body_decoder(|s| Ok(s.to_uppercase()));
        let result = decoder(StatusClass::GoodStatus, &meta(200), b"ok");
        assert_eq!(result, Ok("OK".to_string()));
    }

    #[test]
    fn json_body_decoder_short_circuits_regardless_of_body_validity() {
        let decoder: Decoder<serde_json::Value> = json_body_decoder(Ok);
        let result = decoder(StatusClass::BadStatus, &meta(500), b"{not json");
        assert_eq!(result, Err(TransportError::BadStatus(500)));
    }

    #[test]
    fn json_body_decoder_parses_on_good_status() {
        let decoder: Decoder<i64> = json_body_decoder(|v| {
            v.get("n")
                .and_then(|n| n.as_i64())
                .ok_or_else(|| "missing n".to_string())
        });
        let result = decoder(StatusClass::GoodStatus, &meta(200), br#"{"n": 42}"#);
        assert_eq!(result, Ok(42));
    }

    #[test]
    fn constant_decoder_ignores_body() {
        let decoder: Decoder<&'static str> = constant_decoder("ack");
        assert_eq!(
            decoder(StatusClass::GoodStatus, &meta(204), b""),
            Ok("ack")
        );
        assert_eq!(
            decoder(StatusClass::BadStatus, &meta(503), b""),
            Err(TransportError::BadStatus(503))
        );
    }

    #[test]
    fn full_decoder_maps_err_string_to_bad_body() {
        let decoder: Decoder<()> = full_decoder(|_status, _meta, _body| Err("boom".to_string()));
        let result = decoder(StatusClass::GoodStatus, &meta(200), b"");
        assert_eq!(result, Err(TransportError::BadBody("boom".to_string())));
    }

    #[test]
    fn status_class_of_classifies_2xx_as_good() {
        assert_eq!(StatusClass::of(200), StatusClass::GoodStatus);
        assert_eq!(StatusClass::of(299), StatusClass::GoodStatus);
        assert_eq!(StatusClass::of(199), StatusClass::BadStatus);
        assert_eq!(StatusClass::of(300), StatusClass::BadStatus);
        assert_eq!(StatusClass::of(500), StatusClass::BadStatus);
    }
}
