use crate::error::TocError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tocsmith_layout::{InsertionPolicy, TocLayoutConfig};
use tocsmith_types::{Color, ZoomHint};

/// Base font names, resolved by the viewer as standard Type1 fonts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontConfig {
    pub body: String,
    pub heading: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { body: "Helvetica".to_string(), heading: "Helvetica".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorConfig {
    /// Entry titles, which are also the clickable part.
    pub entry: Color,
    pub page_number: Color,
    pub heading: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self { entry: Color::BLUE, page_number: Color::BLACK, heading: Color::BLACK }
    }
}

/// Everything that controls one synthesis run.
///
/// Every field has a default, so `{}` is a complete configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthesisConfig {
    pub layout: TocLayoutConfig,
    pub policy: InsertionPolicy,
    pub zoom: ZoomHint,
    pub write_bookmarks: bool,
    pub fonts: FontConfig,
    pub colors: ColorConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            layout: TocLayoutConfig::default(),
            policy: InsertionPolicy::default(),
            zoom: ZoomHint::default(),
            write_bookmarks: true,
            fonts: FontConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SynthesisConfig {
    pub fn from_json(json: &str) -> Result<Self, TocError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TocError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            TocError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config from '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), TocError> {
        self.layout.validate()?;
        if let ZoomHint::Fixed(zoom) = self.zoom {
            if !zoom.is_finite() || zoom < 0.0 {
                return Err(TocError::Config(format!("zoom must be a non-negative number, got {}", zoom)));
            }
        }
        if self.fonts.body.trim().is_empty() || self.fonts.heading.trim().is_empty() {
            return Err(TocError::Config("font names must not be empty".to_string()));
        }
        Ok(())
    }
}
