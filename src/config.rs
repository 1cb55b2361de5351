use std::collections::HashMap;

use serde::Deserialize;

/// Retained-entry cap used when a family has no explicit override.
pub const DEFAULT_CAP: usize = 30;

/// Per-family retention caps, deserialized from TOML:
///
/// ```toml
/// default_cap = 30
///
/// [families]
/// events = 50
/// releases = 20
/// ```
#[derive(Debug, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_cap")]
    pub default_cap: usize,
    #[serde(default)]
    pub families: HashMap<String, usize>,
}

fn default_cap() -> usize {
    DEFAULT_CAP
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            default_cap: DEFAULT_CAP,
            families: HashMap::new(),
        }
    }
}

impl RetentionConfig {
    pub fn cap_for(&self, family: &str) -> usize {
        self.families
            .get(family)
            .copied()
            .unwrap_or(self.default_cap)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from the platform config directory, if present.
    pub fn load() -> Option<Self> {
        let config_dir = dirs::config_dir()?;
        let config_path = config_dir.join("undolog").join("retention.toml");
        let content = std::fs::read_to_string(config_path).ok()?;
        toml::from_str(&content).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_config() {
        let config = RetentionConfig::default();
        assert_eq!(config.cap_for("events"), DEFAULT_CAP);
        assert_eq!(config.cap_for("releases"), DEFAULT_CAP);
    }

    #[test]
    fn family_overrides_win_over_the_default() {
        let config = RetentionConfig::from_toml_str(
            r#"
            default_cap = 40

            [families]
            releases = 10
            "#,
        )
        .expect("parse");

        assert_eq!(config.cap_for("releases"), 10);
        assert_eq!(config.cap_for("events"), 40);
    }

    #[test]
    fn empty_config_falls_back_to_the_default_cap() {
        let config = RetentionConfig::from_toml_str("").expect("parse");
        assert_eq!(config.default_cap, DEFAULT_CAP);
        assert_eq!(config.cap_for("anything"), DEFAULT_CAP);
    }
}
