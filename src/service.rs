//! Service Descriptor: the immutable per-service configuration that
//! parameterizes request shaping and signing (§3, §4.2).

/// Wire protocol dialect. Selects target-prefix injection and content
/// negotiation (§4.3, §6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Ec2,
    Json,
    Query,
    RestJson,
    RestXml,
}

/// Signing scheme (§4.4, §4.4.9). `SignS3` is a recognized, documented
/// non-implemented variant: dispatching a send through it fails fast
/// with `TransportError::BadBody` before any network I/O (S5 in §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signer {
    SignV4,
    SignS3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    Iso8601,
    Rfc822,
    UnixTimestamp,
}

/// Global services sign with the fixed `us-east-1` region (§6.3);
/// regional services carry their own region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Global,
    Regional(String),
}

/// Host resolution strategy. Modeled as a tagged variant rather than a
/// stored closure: the reference implementation this crate descends
/// from kept `host_resolver` as a first-class function value, but that
/// makes the descriptor neither cheaply `Clone` nor serializable. A
/// `Custom` variant still allows callers to plug in an arbitrary
/// resolver (e.g. a region-pinned MinIO gateway) without giving up
/// value-type semantics for the two built-in cases (§9 "Descriptor
/// polymorphism").
#[derive(Clone, Copy)]
pub enum HostResolver {
    Default,
    DigitalOcean,
    Custom(fn(&Endpoint, &str) -> String),
}

impl HostResolver {
    fn resolve(&self, endpoint: &Endpoint, endpoint_prefix: &str) -> String {
        match self {
            HostResolver::Default => match endpoint {
                Endpoint::Global => format!("{}.amazonaws.com", endpoint_prefix),
                Endpoint::Regional(region) => {
                    format!("{}.{}.amazonaws.com", endpoint_prefix, region)
                }
            },
            HostResolver::DigitalOcean => match endpoint {
                Endpoint::Global => "nyc3.digitaloceanspaces.com".to_string(),
                Endpoint::Regional(region) => format!("{}.digitaloceanspaces.com", region),
            },
            HostResolver::Custom(f) => f(endpoint, endpoint_prefix),
        }
    }
}

#[derive(Clone, Copy)]
pub enum RegionResolver {
    Default,
    DigitalOcean,
    Custom(fn(&Endpoint) -> String),
}

impl RegionResolver {
    fn resolve(&self, endpoint: &Endpoint) -> String {
        match self {
            RegionResolver::Default => match endpoint {
                Endpoint::Global => "us-east-1".to_string(),
                Endpoint::Regional(region) => region.clone(),
            },
            RegionResolver::DigitalOcean => match endpoint {
                Endpoint::Global => "nyc3".to_string(),
                Endpoint::Regional(region) => region.clone(),
            },
            RegionResolver::Custom(f) => f(endpoint),
        }
    }
}

/// Immutable record of per-service knobs (§3). Every "setter" consumes
/// `self` and returns a new value — there is no interior mutability
/// here, matching §4.2/§9's copy-on-modify requirement.
#[derive(Clone)]
pub struct ServiceDescriptor {
    pub endpoint_prefix: String,
    pub api_version: String,
    pub protocol: Protocol,
    pub signer: Signer,
    pub json_version: Option<String>,
    pub signing_name: Option<String>,
    pub target_prefix: String,
    pub timestamp_format: TimestampFormat,
    pub xml_namespace: Option<String>,
    pub endpoint: Endpoint,
    pub host_resolver: HostResolver,
    pub region_resolver: RegionResolver,
}

fn default_target_prefix(endpoint_prefix: &str, api_version: &str) -> String {
    format!(
        "AWS{}_{}",
        endpoint_prefix.to_uppercase(),
        api_version.replace('-', "")
    )
}

fn default_timestamp_format(protocol: Protocol) -> TimestampFormat {
    match protocol {
        Protocol::Json | Protocol::RestJson => TimestampFormat::UnixTimestamp,
        Protocol::Ec2 | Protocol::Query | Protocol::RestXml => TimestampFormat::Iso8601,
    }
}

impl ServiceDescriptor {
    fn new(
        endpoint_prefix: impl Into<String>,
        api_version: impl Into<String>,
        protocol: Protocol,
        signer: Signer,
        endpoint: Endpoint,
    ) -> Self {
        let endpoint_prefix = endpoint_prefix.into();
        let api_version = api_version.into();
        let target_prefix = default_target_prefix(&endpoint_prefix, &api_version);
        let timestamp_format = default_timestamp_format(protocol);
        Self {
            endpoint_prefix,
            api_version,
            protocol,
            signer,
            json_version: None,
            signing_name: None,
            target_prefix,
            timestamp_format,
            xml_namespace: None,
            endpoint,
            host_resolver: HostResolver::Default,
            region_resolver: RegionResolver::Default,
        }
    }

    /// Construct a descriptor for a global service (e.g. `sts`, `iam`).
    pub fn define_global(
        endpoint_prefix: impl Into<String>,
        api_version: impl Into<String>,
        protocol: Protocol,
        signer: Signer,
    ) -> Self {
        Self::new(endpoint_prefix, api_version, protocol, signer, Endpoint::Global)
    }

    /// Construct a descriptor for a regional service (e.g. `acm`).
    pub fn define_regional(
        endpoint_prefix: impl Into<String>,
        api_version: impl Into<String>,
        protocol: Protocol,
        signer: Signer,
        region: impl Into<String>,
    ) -> Self {
        Self::new(
            endpoint_prefix,
            api_version,
            protocol,
            signer,
            Endpoint::Regional(region.into()),
        )
    }

    pub fn set_json_version(mut self, json_version: impl Into<String>) -> Self {
        self.json_version = Some(json_version.into());
        self
    }

    pub fn set_signing_name(mut self, signing_name: impl Into<String>) -> Self {
        self.signing_name = Some(signing_name.into());
        self
    }

    pub fn set_target_prefix(mut self, target_prefix: impl Into<String>) -> Self {
        self.target_prefix = target_prefix.into();
        self
    }

    pub fn set_timestamp_format(mut self, timestamp_format: TimestampFormat) -> Self {
        self.timestamp_format = timestamp_format;
        self
    }

    pub fn set_xml_namespace(mut self, xml_namespace: impl Into<String>) -> Self {
        self.xml_namespace = Some(xml_namespace.into());
        self
    }

    /// Rebind host/region resolution to DigitalOcean Spaces (§4.2, S4).
    pub fn to_digital_ocean_spaces(mut self) -> Self {
        self.host_resolver = HostResolver::DigitalOcean;
        self.region_resolver = RegionResolver::DigitalOcean;
        self
    }

    pub fn host(&self) -> String {
        self.host_resolver.resolve(&self.endpoint, &self.endpoint_prefix)
    }

    pub fn region(&self) -> String {
        self.region_resolver.resolve(&self.endpoint)
    }

    /// The name used for key-derivation in the credential scope (§3
    /// `signing_name`): an explicit override, else `endpoint_prefix`.
    pub fn signing_name(&self) -> &str {
        self.signing_name.as_deref().unwrap_or(&self.endpoint_prefix)
    }

    pub fn content_type(&self) -> String {
        match self.protocol {
            Protocol::RestXml => "application/xml; charset=utf-8".to_string(),
            _ => match &self.json_version {
                Some(v) => format!("application/x-amz-json-{}; charset=utf-8", v),
                None => "application/json; charset=utf-8".to_string(),
            },
        }
    }

    pub fn accept_type(&self) -> &'static str {
        match self.protocol {
            Protocol::RestXml => "application/xml",
            _ => "application/json",
        }
    }
}

/// Best-effort region extraction from a bare host string, independent
/// of a descriptor's own `region_resolver`. A convenience for callers
/// that only have a URL (e.g. one read back from a config file) and
/// want the region without reconstructing a `ServiceDescriptor`.
pub fn region_from_host(host: &str) -> Option<String> {
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 4 && parts[parts.len() - 2] == "amazonaws" && parts[parts.len() - 1] == "com"
    {
        return Some(parts[parts.len() - 3].to_string());
    }
    if parts.len() == 3 && parts[1] == "digitaloceanspaces" && parts[2] == "com" {
        return Some(parts[0].to_string());
    }
    None
}
