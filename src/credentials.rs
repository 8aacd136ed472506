use std::fmt;

/// AWS credentials (§3 "Credentials").
///
/// Caller-owned: the library never mutates, persists, or logs these.
/// The hand-rolled [`fmt::Debug`] impl redacts the secret material so
/// an accidental `{:?}` in a log line never leaks it, mirroring the
/// discipline `config::load` applies to the gateway's master key.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***REDACTED***")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "***REDACTED***"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret_material() {
        let creds = Credentials::new("AKIDEXAMPLE", "secret").with_session_token("T0K3N");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("AKIDEXAMPLE"));
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("T0K3N"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn no_session_token_by_default() {
        let creds = Credentials::new("id", "secret");
        assert!(creds.session_token.is_none());
    }
}
