//! Plugin configuration.
//!
//! # Responsibility
//! - Name the persisted entry (`owner_id`, `key_name`).
//! - Choose how geometry rebuilds treat objects the plugin did not create.
//!
//! # Invariants
//! - `owner_id` is never nil and `key_name` is never blank after validation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable plugin identifier; owner of the persisted entry in every document.
pub const PLUGIN_ID: Uuid = Uuid::from_u128(0x6d3f_2b1a_8c4e_4f09_9a71_3e5c_d2b8_40f6);
/// String-table key of the persisted state blob.
pub const STATE_KEY_NAME: &str = "SaveDemoState";

/// How a rebuild makes room for the new sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryPolicy {
    /// Clear every object in the document, then add the sphere.
    #[default]
    ClearDocument,
    /// Delete only the sphere this plugin added last; keep everything else.
    ReplaceOwned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub owner_id: Uuid,
    pub key_name: String,
    pub geometry_policy: GeometryPolicy,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            owner_id: PLUGIN_ID,
            key_name: STATE_KEY_NAME.to_string(),
            geometry_policy: GeometryPolicy::default(),
        }
    }
}

impl PluginConfig {
    /// Parses a JSON config object; absent fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner_id.is_nil() {
            return Err(ConfigError::NilOwnerId);
        }
        if self.key_name.trim().is_empty() {
            return Err(ConfigError::EmptyKeyName);
        }
        Ok(())
    }

    /// Owner string used in the document string table.
    pub fn owner(&self) -> String {
        self.owner_id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    NilOwnerId,
    EmptyKeyName,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(details) => write!(f, "invalid plugin config: {details}"),
            Self::NilOwnerId => write!(f, "owner_id must not be nil"),
            Self::EmptyKeyName => write!(f, "key_name must not be empty"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GeometryPolicy, PluginConfig, PLUGIN_ID, STATE_KEY_NAME};

    #[test]
    fn empty_object_yields_defaults() {
        let config = PluginConfig::from_json_str("{}").expect("defaults");
        assert_eq!(config, PluginConfig::default());
        assert_eq!(config.owner_id, PLUGIN_ID);
        assert_eq!(config.key_name, STATE_KEY_NAME);
        assert_eq!(config.geometry_policy, GeometryPolicy::ClearDocument);
    }

    #[test]
    fn parses_policy_in_snake_case() {
        let config = PluginConfig::from_json_str(r#"{"geometry_policy":"replace_owned"}"#)
            .expect("policy");
        assert_eq!(config.geometry_policy, GeometryPolicy::ReplaceOwned);
    }

    #[test]
    fn rejects_blank_key_and_nil_owner() {
        let err = PluginConfig::from_json_str(r#"{"key_name":"  "}"#).expect_err("blank key");
        assert_eq!(err, ConfigError::EmptyKeyName);

        let err = PluginConfig::from_json_str(
            r#"{"owner_id":"00000000-0000-0000-0000-000000000000"}"#,
        )
        .expect_err("nil owner");
        assert_eq!(err, ConfigError::NilOwnerId);

        let err = PluginConfig::from_json_str("[1]").expect_err("not an object");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
