//! Resolver configuration module.
//!
//! Handles loading, validating, and merging `srcset-resolver.toml`. Stock
//! defaults are serialized to a TOML table, the user file is merged on top
//! key by key, and the result is deserialized with unknown keys rejected.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [resolver]
//! preload_margin = 300       # px ahead of the viewport edge for lazy images
//! on_load_error = "release"  # "release" or "stall"
//!
//! [styles]
//! url_pattern = "/styles/{style}/public/{path}"
//! derivative = "none"        # "none", "webp" or "avif"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [styles]
//! derivative = "avif"
//! ```

use crate::visibility::DEFAULT_PRELOAD_MARGIN;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Runtime behaviour of the resolver.
    pub resolver: ResolverConfig,
    /// How candidate URLs are built from image style names.
    pub styles: StylesConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for placeholder in ["{style}", "{path}"] {
            if !self.styles.url_pattern.contains(placeholder) {
                return Err(ConfigError::Validation(format!(
                    "styles.url_pattern must contain {placeholder}"
                )));
            }
        }
        Ok(())
    }
}

/// What happens when the host reports that an applied source failed to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadErrorPolicy {
    /// Return to `Idle`, drop the failed `src`, service any deferred update.
    #[default]
    Release,
    /// Stay in `Updating`; the element accepts no further updates.
    Stall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Distance in px ahead of the viewport at which lazy images load.
    pub preload_margin: u32,
    pub on_load_error: LoadErrorPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            preload_margin: DEFAULT_PRELOAD_MARGIN,
            on_load_error: LoadErrorPolicy::default(),
        }
    }
}

/// Alternate encoding served next to each derivative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Derivative {
    #[default]
    None,
    Webp,
    Avif,
}

impl Derivative {
    /// Extension appended after the original one, if any.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Webp => Some("webp"),
            Self::Avif => Some("avif"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesConfig {
    /// URL of a style derivative; `{style}` and `{path}` are substituted.
    pub url_pattern: String,
    pub derivative: Derivative,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            url_pattern: "/styles/{style}/public/{path}".to_string(),
            derivative: Derivative::None,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when the file is
/// absent.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# srcset-resolver configuration
# =============================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Resolver
# ---------------------------------------------------------------------------
[resolver]
# Lazy images (loading="lazy") start loading once they come within this many
# CSS pixels of the viewport edge.
preload_margin = 300

# What to do when an applied image fails to load:
#   "release" - return the element to idle and drop the failed src; the next
#               resize or visibility trigger selects again.
#   "stall"   - keep the element busy; it is never reselected.
on_load_error = "release"

# ---------------------------------------------------------------------------
# Image styles (used by the `srcset` command)
# ---------------------------------------------------------------------------
[styles]
# URL of one style derivative. {style} is the style name, {path} the source
# image path without its leading slash.
url_pattern = "/styles/{style}/public/{path}"

# Alternate encoding served next to each derivative: "none", "webp", "avif".
# "webp" turns /x/photo.jpg into /x/photo.jpg.webp.
derivative = "none"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.resolver.preload_margin, 300);
        assert_eq!(config.resolver.on_load_error, LoadErrorPolicy::Release);
        assert_eq!(config.styles.derivative, Derivative::None);
    }

    #[test]
    fn parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
[styles]
derivative = "avif"
"#,
        )
        .unwrap();
        assert_eq!(config.styles.derivative, Derivative::Avif);
        assert_eq!(config.styles.url_pattern, "/styles/{style}/public/{path}");
        assert_eq!(config.resolver.preload_margin, 300);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
[resolver]
preload_offset = 200
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn merge_keeps_base_keys() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[resolver]\npreload_margin = 50").unwrap();
        let merged = merge_toml(base, overlay);
        let config: Config = merged.try_into().unwrap();
        assert_eq!(config.resolver.preload_margin, 50);
        assert_eq!(config.resolver.on_load_error, LoadErrorPolicy::Release);
    }

    #[test]
    fn validation_requires_placeholders() {
        let overlay: toml::Value =
            toml::from_str("[styles]\nurl_pattern = \"/styles/{style}\"").unwrap();
        let err = resolve_config(Some(overlay)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("{path}")));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("srcset-resolver.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("srcset-resolver.toml");
        fs::write(
            &path,
            r#"
[resolver]
on_load_error = "stall"
"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.resolver.on_load_error, LoadErrorPolicy::Stall);
        assert_eq!(config.resolver.preload_margin, 300);
    }

    #[test]
    fn load_config_invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("srcset-resolver.toml");
        fs::write(&path, "[resolver\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }
}
