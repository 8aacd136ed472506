//! AWS-specific percent-encoding and query-string assembly (§4.1).
//!
//! The byte-level encoding itself is delegated to `urlencoding`, whose
//! safe set (`A-Za-z0-9-_.~`, uppercase `%HH`) is exactly RFC 3986
//! unreserved; the per-segment splitting, double-encoding, and
//! query-ordering quirks around it are what's genuinely custom here.

/// Percent-encode `s` per RFC 3986 *unreserved* characters
/// (`A-Z a-z 0-9 - _ . ~`). Every other byte becomes `%HH` with
/// uppercase hex.
pub fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Percent-encode each `/`-delimited segment of `path` individually and
/// rejoin with `/`, leaving the separators untouched. An empty path
/// normalizes to `/`.
fn encode_path_once(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(percent_encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Canonical URI for the SigV4 canonical request (§4.4.3 item 2).
///
/// `double_encode` selects the well-known AWS quirk: V4-signed services
/// encode the path twice, S3-signed services encode it once. Do not
/// generalize or omit this — it is load-bearing for signature
/// correctness against real AWS endpoints.
pub fn canonical_uri(path: &str, double_encode: bool) -> String {
    let once = encode_path_once(path);
    if double_encode {
        encode_path_once(&once)
    } else {
        once
    }
}

/// Canonical query string used by the signing engine (§4.4.3 item 3):
/// pairs sorted by encoded key, then by encoded value, ascending, with
/// no leading `?`.
pub fn canonical_query_string(pairs: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Query string for the outgoing request URL (§4.1 `query_string`).
///
/// Unlike [`canonical_query_string`], this preserves a documented quirk
/// of the reference implementation: within a key, multi-valued entries
/// are emitted in the *reverse* of their insertion order. Keys
/// themselves are still sorted ascending by encoded form. Prefixed with
/// `?`, or the empty string when `pairs` is empty.
pub fn query_string(pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (k, v) in pairs {
        let ek = percent_encode(k);
        let ev = percent_encode(v);
        match grouped.iter_mut().find(|(key, _)| *key == ek) {
            Some(entry) => entry.1.push(ev),
            None => grouped.push((ek, vec![ev])),
        }
    }
    grouped.sort_by(|a, b| a.0.cmp(&b.0));
    let parts: Vec<String> = grouped
        .iter()
        .flat_map(|(k, vs)| vs.iter().rev().map(move |v| format!("{}={}", k, v)))
        .collect();
    format!("?{}", parts.join("&"))
}
