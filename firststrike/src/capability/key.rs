//! Credential selection

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::api_key_from_env;

/// Host-provided credential selection
///
/// Surfaced when the provider reports quota exhaustion, so the operator can
/// switch to credentials with remaining quota.
#[async_trait]
pub trait KeySelector: Send + Sync {
    /// Whether a usable key is currently selected
    async fn has_selected_key(&self) -> bool;

    /// Ask the host to let the operator pick a different key
    async fn request_key_selection(&self);
}

/// Credentials taken from an environment variable
///
/// Selection cannot happen in-process; requesting one logs how to supply
/// a different key.
#[derive(Debug, Clone)]
pub struct EnvKeySelector {
    env_var: String,
}

impl EnvKeySelector {
    pub fn new(env_var: impl Into<String>) -> Self {
        Self { env_var: env_var.into() }
    }

    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    /// Operator-facing remediation text
    pub fn instructions(&self) -> String {
        format!(
            "Export a key with available quota in {} (or point api-key-env at another variable) and retry.",
            self.env_var
        )
    }
}

#[async_trait]
impl KeySelector for EnvKeySelector {
    async fn has_selected_key(&self) -> bool {
        debug!(env_var = %self.env_var, "has_selected_key: called");
        api_key_from_env(&self.env_var).is_some()
    }

    async fn request_key_selection(&self) {
        debug!(env_var = %self.env_var, "request_key_selection: called");
        warn!("{}", self.instructions());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn test_has_selected_key() {
        let selector = EnvKeySelector::new("FIRSTSTRIKE_SELECTOR_KEY");

        unsafe { std::env::remove_var("FIRSTSTRIKE_SELECTOR_KEY") };
        assert!(!selector.has_selected_key().await);

        unsafe { std::env::set_var("FIRSTSTRIKE_SELECTOR_KEY", "   ") };
        assert!(!selector.has_selected_key().await);

        unsafe { std::env::set_var("FIRSTSTRIKE_SELECTOR_KEY", "k-456") };
        assert!(selector.has_selected_key().await);

        unsafe { std::env::remove_var("FIRSTSTRIKE_SELECTOR_KEY") };
    }

    #[tokio::test]
    async fn test_request_key_selection_names_variable() {
        let selector = EnvKeySelector::new("ALT_GEMINI_KEY");
        assert!(selector.instructions().contains("ALT_GEMINI_KEY"));
        selector.request_key_selection().await;
        assert_eq!(selector.env_var(), "ALT_GEMINI_KEY");
    }
}
