//! Layout settings loaded from TOML.
//!
//! ```toml
//! font = "fonts/NotoSans-Regular.ttf"
//! font_size = 18.0
//! tab_width = 4.0
//! flags = "TRUNCATE | IGNORE_SOFT_BREAKS"
//! x_alignment = "center"
//! y_alignment = "top"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::{BuildParams, LayoutFlags, XAlignment, YAlignment};

/// Defaults for layout builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Font file for callers that load their own face.
    pub font: Option<PathBuf>,
    /// Pixels per em.
    pub font_size: f32,
    /// Tab stop interval, in space widths unless `TAB_WIDTH_PIXELS` is set.
    pub tab_width: f32,
    pub flags: LayoutFlags,
    pub x_alignment: XAlignment,
    pub y_alignment: YAlignment,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 16.0,
            tab_width: 4.0,
            flags: LayoutFlags::empty(),
            x_alignment: XAlignment::Left,
            y_alignment: YAlignment::Top,
        }
    }
}

impl LayoutConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Load `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path.as_ref()).unwrap_or_else(|err| {
            log::debug!("using default layout config ({}): {err}", path.as_ref().display());
            Self::default()
        })
    }

    /// Apply `RICHTEXT_FONT`, `RICHTEXT_FONT_SIZE` and `RICHTEXT_TAB_WIDTH`.
    pub fn merge_with_env(&mut self) {
        if let Ok(font) = std::env::var("RICHTEXT_FONT") {
            self.font = Some(PathBuf::from(font));
        }
        if let Ok(value) = std::env::var("RICHTEXT_FONT_SIZE") {
            match value.parse::<f32>() {
                Ok(size) => self.font_size = size,
                Err(_) => log::warn!("ignoring RICHTEXT_FONT_SIZE={value}"),
            }
        }
        if let Ok(value) = std::env::var("RICHTEXT_TAB_WIDTH") {
            match value.parse::<f32>() {
                Ok(width) => self.tab_width = width,
                Err(_) => log::warn!("ignoring RICHTEXT_TAB_WIDTH={value}"),
            }
        }
    }

    /// Build parameters for a text area of the given size.
    pub fn params<'a>(&self, area_width: f32, area_height: f32) -> BuildParams<'a> {
        BuildParams::new(area_width, area_height)
            .with_flags(self.flags)
            .with_tab_width(self.tab_width)
            .with_alignment(self.x_alignment, self.y_alignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;

    #[test]
    fn parses_partial_config() {
        let config = LayoutConfig::from_toml_str(
            r#"
            tab_width = 8.0
            flags = "RIGHT_TO_LEFT | TRUNCATE"
            x_alignment = "center"
            "#,
        )
        .unwrap();
        assert_eq!(config.tab_width, 8.0);
        assert_eq!(config.flags, LayoutFlags::RIGHT_TO_LEFT | LayoutFlags::TRUNCATE);
        assert_eq!(config.x_alignment, XAlignment::Center);
        assert_eq!(config.y_alignment, YAlignment::Top);
        assert_eq!(config.font_size, 16.0);

        let params = config.params(200.0, 50.0);
        assert_eq!(params.area_width, 200.0);
        assert_eq!(params.tab_width, 8.0);
        assert!(params.flags.contains(LayoutFlags::TRUNCATE));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = LayoutConfig {
            font: Some(PathBuf::from("fonts/test.ttf")),
            flags: LayoutFlags::VERTICAL,
            y_alignment: YAlignment::Bottom,
            ..LayoutConfig::default()
        };
        let source = toml::to_string_pretty(&config).unwrap();
        assert_eq!(LayoutConfig::from_toml_str(&source).unwrap(), config);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = LayoutConfig::from_toml_str("x_alignment = \"diagonal\"").unwrap_err();
        assert!(matches!(err, LayoutError::Config(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = "definitely/not/here/richtext.toml";
        assert!(matches!(LayoutConfig::load(path), Err(LayoutError::Io(_))));
        assert_eq!(LayoutConfig::load_or_default(path), LayoutConfig::default());
    }
}
