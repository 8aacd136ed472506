//! Foundation library for constructing and dispatching authenticated
//! HTTP requests to Amazon Web Services.
//!
//! The central responsibility is a byte-exact implementation of AWS
//! Signature Version 4 (SigV4), together with the per-service request
//! shaping — protocol dialect, host resolution, content negotiation,
//! target prefixing — that has to happen before signing. Payload
//! codecs, credential acquisition, higher-level service clients, and
//! retry/backoff policy are all left to the caller.

pub mod credentials;
pub mod error;
pub mod request;
pub mod response;
pub mod service;
pub mod signing;
pub mod transport;
pub mod uri;

pub use credentials::Credentials;
pub use error::TransportError;
pub use request::{Body, Method, UnsignedRequest};
pub use response::{
    constant_decoder, full_decoder, json_body_decoder, json_full_decoder, string_body_decoder,
    ResponseMetadata, StatusClass,
};
pub use service::{Endpoint, HostResolver, Protocol, RegionResolver, ServiceDescriptor, Signer, TimestampFormat};
pub use signing::{send_signed, send_signed_at, send_unsigned};
pub use transport::{RawResponse, SignedRequest, Transport};

#[cfg(feature = "reqwest-transport")]
pub use transport::ReqwestTransport;
