//! Per-user spoken-style configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// How the engine should speak to one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub be_succinct: bool,
    /// One-time hint about succinct mode, cleared after it was spoken once.
    pub explain_succinct_mode: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            be_succinct: false,
            explain_succinct_mode: true,
        }
    }
}

/// Durable store for [`UserConfig`], keyed by the platform user id.
pub trait ConfigService {
    fn get_config(&self, user_id: &str) -> UserConfig;
    fn persist_config(&self, user_id: &str, config: UserConfig);
}

/// Process-local config store, the default for tests and the CLI.
#[derive(Debug, Default)]
pub struct InMemoryConfigService {
    configs: Mutex<HashMap<String, UserConfig>>,
}

impl InMemoryConfigService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigService for InMemoryConfigService {
    fn get_config(&self, user_id: &str) -> UserConfig {
        self.configs
            .lock()
            .unwrap()
            .get(user_id)
            .copied()
            .unwrap_or_default()
    }

    fn persist_config(&self, user_id: &str, config: UserConfig) {
        self.configs
            .lock()
            .unwrap()
            .insert(user_id.to_string(), config);
    }
}
