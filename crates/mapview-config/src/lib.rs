//! mapview configuration
//!
//! Settings come from `mapview.toml` (or an explicit path), fall back to
//! defaults when the file is missing, and can then be overridden from the
//! environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "mapview.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MapViewConfig {
    pub view: ViewConfig,
    pub text: TextConfig,
    pub animation: AnimationConfig,
}

/// What is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Soft-wrap long lines to the pane width.
    pub wrap_enabled: bool,
    /// Original source shown when the map has several.
    pub active_source_index: usize,
}

/// Text metrics, in pixels except `tab_width`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub font_size: f32,
    pub line_height: f32,
    /// Advance of one monospace cell.
    pub column_width: f32,
    /// Columns between tab stops.
    pub tab_width: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Duration of a scroll-to animation.
    pub scroll_duration_ms: u64,
    /// Caret blink half-period.
    pub caret_blink_ms: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            wrap_enabled: false,
            active_source_index: 0,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            line_height: 18.0,
            column_width: 7.0,
            tab_width: 2,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            scroll_duration_ms: 250,
            caret_blink_ms: 500,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl MapViewConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, or defaults when it does not exist. A file that exists
    /// but fails to read or parse is reported and replaced by defaults.
    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        Self::load_from_file(path).unwrap_or_else(|err| {
            warn!(error = %err, "ignoring config file");
            Self::default()
        })
    }

    /// Load `mapview.toml` from the current directory or use defaults.
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(DEFAULT_CONFIG_FILE)
    }

    /// Apply `MAPVIEW_*` environment overrides. Values that fail to parse
    /// are ignored.
    pub fn merge_with_env(&mut self) {
        self.merge_with_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key/value lookup.
    pub fn merge_with_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("MAPVIEW_WRAP") {
            self.view.wrap_enabled = parse_flag(&val);
        }
        if let Some(index) = lookup("MAPVIEW_SOURCE").and_then(|v| v.parse().ok()) {
            self.view.active_source_index = index;
        }
        if let Some(size) = lookup("MAPVIEW_FONT_SIZE").and_then(|v| v.parse().ok()) {
            self.text.font_size = size;
        }
        if let Some(height) = lookup("MAPVIEW_LINE_HEIGHT").and_then(|v| v.parse().ok()) {
            self.text.line_height = height;
        }
        if let Some(width) = lookup("MAPVIEW_COLUMN_WIDTH").and_then(|v| v.parse().ok()) {
            self.text.column_width = width;
        }
        if let Some(tab) = lookup("MAPVIEW_TAB_WIDTH").and_then(|v| v.parse().ok()) {
            self.text.tab_width = tab;
        }
    }

    /// Defaults or `mapview.toml`, then environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = MapViewConfig::default();
        assert!(!config.view.wrap_enabled);
        assert_eq!(config.text.tab_width, 2);
        assert_eq!(config.animation.scroll_duration_ms, 250);
        assert_eq!(config.animation.caret_blink_ms, 500);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = MapViewConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: MapViewConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: MapViewConfig = toml::from_str("[view]\nwrap_enabled = true\n").unwrap();
        assert!(parsed.view.wrap_enabled);
        assert_eq!(parsed.text.column_width, 7.0);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let config = MapViewConfig::load_or_default_from("does/not/exist/mapview.toml");
        assert_eq!(config, MapViewConfig::default());
    }

    #[test]
    fn test_load_from_file_reports_parse_errors() {
        let path = std::env::temp_dir().join(format!("mapview-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[text]\nfont_size = \"big\"\n").unwrap();
        let err = MapViewConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_merge_with_vars() {
        let vars: HashMap<&str, &str> = [
            ("MAPVIEW_WRAP", "true"),
            ("MAPVIEW_SOURCE", "2"),
            ("MAPVIEW_TAB_WIDTH", "four"),
            ("MAPVIEW_COLUMN_WIDTH", "8.5"),
        ]
        .into_iter()
        .collect();

        let mut config = MapViewConfig::default();
        config.merge_with_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert!(config.view.wrap_enabled);
        assert_eq!(config.view.active_source_index, 2);
        assert_eq!(config.text.column_width, 8.5);
        // Unparseable values leave the previous value in place.
        assert_eq!(config.text.tab_width, 2);
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("MAPVIEW_LINE_HEIGHT", "21");
        }

        let mut config = MapViewConfig::default();
        config.merge_with_env();
        assert_eq!(config.text.line_height, 21.0);

        unsafe {
            std::env::remove_var("MAPVIEW_LINE_HEIGHT");
        }
    }
}
