//! Layout configuration.
//!
//! Everything a session needs to know about the target surface: viewport
//! size, document base URL, the fallback font and limits.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use numbat_common::Fx;
use numbat_display::{FontChoice, ImageStore, Size};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings for one layout session.
///
/// Every field has a default, so a config file only names what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Viewport width in px.
    pub viewport_width: Fx,
    /// Viewport height in px. Text starting below it is not laid out.
    pub viewport_height: Fx,
    /// Base URL relative image references resolve against.
    pub base_url: Option<String>,
    /// Font family used when the cascade names none.
    pub font_family: String,
    /// Font size used when the cascade names none.
    pub font_size: Fx,
    /// Font weight used when the cascade names none.
    pub font_weight: u16,
    /// Maximum number of primitives; creation beyond it is fatal.
    pub primitive_limit: Option<usize>,
    /// Natural sizes of images already known, as `url -> [w, h]`.
    pub images: BTreeMap<String, [i32; 2]>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_width: Fx::from_whole(320),
            viewport_height: Fx::from_whole(240),
            base_url: None,
            font_family: "serif".to_string(),
            font_size: Fx::from_whole(16),
            font_weight: 400,
            primitive_limit: None,
            images: BTreeMap::new(),
        }
    }
}

impl LayoutConfig {
    /// Parse a JSON configuration.
    ///
    /// # Errors
    ///
    /// Malformed JSON, unknown keys or a non-positive viewport.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    ///
    /// # Errors
    ///
    /// As [`LayoutConfig::from_json_str`], plus I/O failures.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidViewport`] for a zero or negative dimension.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport_width <= Fx::ZERO || self.viewport_height <= Fx::ZERO {
            return Err(ConfigError::InvalidViewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        Ok(())
    }

    /// The fallback font request.
    #[must_use]
    pub fn default_font(&self) -> FontChoice {
        FontChoice {
            family: self.font_family.clone(),
            fixed_height: self.font_size,
            weight: self.font_weight,
        }
    }

    /// An image store seeded with the configured natural sizes.
    #[must_use]
    pub fn image_store(&self) -> ImageStore {
        let mut store = ImageStore::new();
        for (url, [w, h]) in &self.images {
            store.set_natural_size(url, Size::from_whole(*w, *h));
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config =
            LayoutConfig::from_json_str(r#"{"viewport_width": 128, "base_url": "http://x/"}"#)
                .unwrap();
        assert_eq!(config.viewport_width, Fx::from_whole(128));
        assert_eq!(config.viewport_height, Fx::from_whole(240));
        assert_eq!(config.base_url.as_deref(), Some("http://x/"));
        assert_eq!(config.default_font().weight, 400);
    }

    #[test]
    fn test_rejects_unknown_keys_and_empty_viewport() {
        assert!(LayoutConfig::from_json_str(r#"{"viewport": 1}"#).is_err());
        assert!(matches!(
            LayoutConfig::from_json_str(r#"{"viewport_height": 0}"#),
            Err(ConfigError::InvalidViewport { .. })
        ));
    }

    #[test]
    fn test_image_sizes_seed_store() {
        let config =
            LayoutConfig::from_json_str(r#"{"images": {"http://x/a.png": [10, 20]}}"#).unwrap();
        let store = config.image_store();
        assert_eq!(store.natural_size("http://x/a.png"), Some(Size::from_whole(10, 20)));
    }
}
