//! Post-create hooks
//!
//! A hook is registered for a connector type and derives extra asset drafts
//! whenever an asset using that connector is created. Every hook runs before
//! anything is persisted, so a failing hook leaves the registry untouched.

use catalogue_common::types::AssetDraft;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod kafka;

pub use kafka::HistoricalArchiveHook;

pub const DEFAULT_HISTORICAL_CONNECTOR: &str = "mongodb";
pub const DEFAULT_HISTORICAL_PROTOCOL: &str = "mongodb";
pub const DEFAULT_HISTORICAL_DATABASE: &str = "historical";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("Missing parameter: {hook} requires at least {required} interface parameters, found {found}")]
    MissingParameter {
        hook: &'static str,
        required: usize,
        found: usize,
    },
}

/// Derives additional assets from a newly created one
pub trait PostCreateHook: Send + Sync {
    fn name(&self) -> &'static str;

    fn derive(&self, draft: &AssetDraft) -> Result<Vec<AssetDraft>, HookError>;
}

/// Companion database that receives archived stream data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    pub historical_connector: String,
    pub historical_protocol: String,
    pub historical_database: String,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            historical_connector: DEFAULT_HISTORICAL_CONNECTOR.to_string(),
            historical_protocol: DEFAULT_HISTORICAL_PROTOCOL.to_string(),
            historical_database: DEFAULT_HISTORICAL_DATABASE.to_string(),
        }
    }
}

impl HookConfig {
    pub fn from_env() -> Self {
        let var = |key: &str, default: &str| {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Self {
            historical_connector: var("HISTORICAL_CONNECTOR", DEFAULT_HISTORICAL_CONNECTOR),
            historical_protocol: var("HISTORICAL_PROTOCOL", DEFAULT_HISTORICAL_PROTOCOL),
            historical_database: var("HISTORICAL_DATABASE", DEFAULT_HISTORICAL_DATABASE),
        }
    }
}

/// Hooks keyed by lower-cased connector type
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<String, Vec<Arc<dyn PostCreateHook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in hooks
    pub fn with_defaults(config: &HookConfig) -> Self {
        let mut registry = Self::new();
        registry.register("kafka", HistoricalArchiveHook::new(config.clone()));
        registry
    }

    pub fn register(&mut self, connector: &str, hook: impl PostCreateHook + 'static) {
        self.hooks
            .entry(connector.to_lowercase())
            .or_default()
            .push(Arc::new(hook));
    }

    /// Run every hook registered for the draft's connector, in registration order
    pub fn derive_all(&self, draft: &AssetDraft) -> Result<Vec<AssetDraft>, HookError> {
        let Some(hooks) = self.hooks.get(&draft.interface.connector.to_lowercase()) else {
            return Ok(Vec::new());
        };

        let mut derived = Vec::new();
        for hook in hooks {
            let drafts = hook.derive(draft)?;
            tracing::debug!(hook = hook.name(), count = drafts.len(), "Hook derived assets");
            derived.extend(drafts);
        }
        Ok(derived)
    }
}
