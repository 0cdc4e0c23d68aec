//! Deployment configuration.

use serde::{Deserialize, Serialize};

use crate::framing::FramingMode;
use crate::session::SessionConfig;

/// Settings chosen once per deployment.
///
/// Every field has a default, so a partial (or empty) serialized config is
/// valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    /// Framing written into (and expected from) images.
    pub mode: FramingMode,
    /// Limits for the session store used by the session-keyed framing.
    pub session: SessionConfig,
}

impl StegoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config for the session-keyed framing with default store limits.
    pub fn session_keyed() -> Self {
        Self {
            mode: FramingMode::SessionKeyed,
            ..Self::default()
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_self_describing() {
        let config = StegoConfig::new();
        assert_eq!(config.mode, FramingMode::SelfDescribing);
        assert!(config.is_default());
    }

    #[test]
    fn test_session_keyed_not_default() {
        let config = StegoConfig::session_keyed();
        assert_eq!(config.mode, FramingMode::SessionKeyed);
        assert!(!config.is_default());
    }

    #[test]
    fn test_override_store_limits() {
        let mut config = StegoConfig::session_keyed();
        config.session.max_entries = 16;
        config.session.ttl_secs = Some(600);
        assert_eq!(config.session.max_entries, 16);
        assert!(!config.is_default());
    }
}
