//! Errors raised while assembling the session runtime.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The credential namespace cannot prefix settings keys.
    #[error("Invalid credential namespace '{namespace}': {reason}")]
    InvalidNamespace {
        namespace: String,
        reason: &'static str,
    },

    /// A host bridge was not injected and the platform has no default.
    #[error("{capability} is required for the session coordinator: {hint}")]
    CapabilityMissing {
        capability: &'static str,
        hint: &'static str,
    },

    /// The desktop settings store could not be opened.
    #[error("Default settings store unavailable: {0}")]
    DefaultSettingsStore(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl Error {
    /// Name of the missing bridge, if this is a capability error.
    pub fn missing_capability(&self) -> Option<&'static str> {
        match self {
            Error::CapabilityMissing { capability, .. } => Some(capability),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_error_names_the_namespace() {
        let err = Error::InvalidNamespace {
            namespace: "a.b".to_string(),
            reason: "must not contain '.'",
        };
        assert_eq!(
            err.to_string(),
            "Invalid credential namespace 'a.b': must not contain '.'"
        );
        assert!(err.missing_capability().is_none());
    }

    #[test]
    fn test_missing_capability_name() {
        let err = Error::CapabilityMissing {
            capability: "IdentityProvider",
            hint: "inject an adapter around the platform identity SDK",
        };
        assert_eq!(err.missing_capability(), Some("IdentityProvider"));
        assert!(err.to_string().starts_with("IdentityProvider is required"));
    }
}
