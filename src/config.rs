//! Configuration of a render root.
//!
//! ```
//! use reactk::{Compatibility, RootConfig};
//!
//! let config = RootConfig::from_json(r#"{"threaded": true, "compatibility": {"Window": "update"}}"#)
//!     .unwrap();
//! assert!(config.threaded);
//! assert_eq!(config.overrides().unwrap()["Window"], Compatibility::Update);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use reactk_core::{Compatibility, ReconcileError};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Settings read once when a root is mounted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    /// Filter directives for [`crate::logging::init`], used when
    /// `REACTK_LOG` is unset.
    pub log_filter: Option<String>,
    /// Log every action of a pass at `info` level.
    pub log_actions: bool,
    /// Run the backend on its own thread.
    pub threaded: bool,
    /// Compatibility overrides by node kind name, e.g. `"Label": "recreate"`.
    pub compatibility: BTreeMap<String, String>,
}

impl RootConfig {
    /// Parses a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parses the compatibility overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnknownCompatibility`] for a word other than
    /// `update`, `replace` or `recreate`.
    pub fn overrides(&self) -> Result<BTreeMap<String, Compatibility>, ReconcileError> {
        self.compatibility
            .iter()
            .map(|(kind, word)| Ok((kind.clone(), word.parse()?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_the_default() {
        assert_eq!(RootConfig::from_json("{}").unwrap(), RootConfig::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = RootConfig::from_json(
            r#"{"log_actions": true, "compatibility": {"Label": "Recreate", "Frame": "replace"}}"#,
        )
        .unwrap();
        assert!(config.log_actions);
        let overrides = config.overrides().unwrap();
        assert_eq!(overrides["Label"], Compatibility::Recreate);
        assert_eq!(overrides["Frame"], Compatibility::Replace);
    }

    #[test]
    fn unknown_compatibility_is_rejected() {
        let config = RootConfig::from_json(r#"{"compatibility": {"Label": "mutate"}}"#).unwrap();
        assert!(matches!(
            config.overrides(),
            Err(ReconcileError::UnknownCompatibility(word)) if word == "mutate"
        ));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            RootConfig::from_json(r#"{"threaded": "yes"}"#),
            Err(Error::Config(_))
        ));
    }
}
