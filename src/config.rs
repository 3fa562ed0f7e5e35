//! Application configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the config directory (`--config-dir`,
//! default `.`) overrides any subset of keys.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [generation]
//! endpoint = "https://generativelanguage.googleapis.com"
//! model = "gemini-2.5-flash"
//! api_key_env = "GEMINI_API_KEY"   # Environment variable holding the API key
//!
//! [pdf]
//! margins_mm = [5.0, 10.0, 5.0, 10.0]  # top, right, bottom, left
//! scale = 2.0                     # Raster scale factor (rasterizing backends only)
//! image_quality = 0.98            # JPEG quality, 0-1 (rasterizing backends only)
//! settle_ms = 500                 # Wait for math typesetting before capture
//!
//! [plan]
//! day_order = "reorder"           # reorder | trust | strict
//!
//! [theme]
//! accent = "#4f46e5"
//! text = "#0f172a"
//! muted = "#64748b"
//! border = "#cbd5e1"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [plan]
//! day_order = "strict"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::compose::DayOrderPolicy;
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
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Generation service settings.
    pub generation: GenerationConfig,
    /// PDF capture settings.
    pub pdf: PdfConfig,
    /// Plan post-processing settings.
    pub plan: PlanConfig,
    /// Colors for the on-screen view.
    pub theme: ThemeConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("generation.endpoint", &self.generation.endpoint),
            ("generation.model", &self.generation.model),
            ("generation.api_key_env", &self.generation.api_key_env),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{name} must not be empty")));
            }
        }
        if self
            .pdf
            .margins_mm
            .iter()
            .any(|m| !m.is_finite() || *m < 0.0)
        {
            return Err(ConfigError::Validation(
                "pdf.margins_mm values must be non-negative".into(),
            ));
        }
        if !self.pdf.scale.is_finite() || self.pdf.scale <= 0.0 {
            return Err(ConfigError::Validation(
                "pdf.scale must be greater than 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pdf.image_quality) {
            return Err(ConfigError::Validation(
                "pdf.image_quality must be 0-1".into(),
            ));
        }
        Ok(())
    }
}

/// Generation service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Base URL of the Gemini REST API.
    pub endpoint: String,
    /// Model used for `generateContent`.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

/// PDF capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdfConfig {
    /// Page margins in millimetres: `[top, right, bottom, left]`.
    pub margins_mm: [f64; 4],
    /// Raster scale factor for capture backends that rasterize.
    pub scale: f64,
    /// JPEG quality for rasterized page images (0 = worst, 1 = best).
    pub image_quality: f64,
    /// Milliseconds to wait after load so math typesetting can finish.
    pub settle_ms: u64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            margins_mm: [5.0, 10.0, 5.0, 10.0],
            scale: 2.0,
            image_quality: 0.98,
            settle_ms: 500,
        }
    }
}

/// Plan post-processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanConfig {
    /// How generated days are reconciled with the selected days.
    pub day_order: DayOrderPolicy,
}

/// Colors for the on-screen view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Active tab, headings, panel borders.
    pub accent: String,
    /// Body text.
    pub text: String,
    /// Field labels and inactive tabs.
    pub muted: String,
    /// Grid and block borders.
    pub border: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent: "#4f46e5".to_string(),
            text: "#0f172a".to_string(),
            muted: "#64748b".to_string(),
            border: "#cbd5e1".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
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

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let overlay = load_raw_config(dir)?;
    if overlay.is_some() {
        tracing::debug!(dir = %dir.display(), "loading config.toml");
    }
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Lesson Plan Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Plan generation
# ---------------------------------------------------------------------------
[generation]
# Base URL of the Gemini REST API.
endpoint = "https://generativelanguage.googleapis.com"

# Model used for generateContent.
model = "gemini-2.5-flash"

# Environment variable the API key is read from. The key itself never goes
# in this file.
api_key_env = "GEMINI_API_KEY"

# ---------------------------------------------------------------------------
# PDF export
# ---------------------------------------------------------------------------
[pdf]
# Page margins in millimetres: [top, right, bottom, left]. Pages are A4 portrait.
margins_mm = [5.0, 10.0, 5.0, 10.0]

# Raster scale factor. Applies only to rasterizing capture backends;
# the Chrome backend prints vectors and ignores it.
scale = 2.0

# JPEG quality for rasterized page images (0 = worst, 1 = best).
# Applies only to rasterizing capture backends; Chrome ignores it.
image_quality = 0.98

# Milliseconds to wait after the page loads so math can finish typesetting.
settle_ms = 500

# ---------------------------------------------------------------------------
# Generated plan handling
# ---------------------------------------------------------------------------
[plan]
# How generated days are matched against the selected days:
#   "reorder" - sort days into the selected order (unrequested days last)
#   "trust"   - keep whatever order the generator returned
#   "strict"  - fail unless exactly the selected days came back
day_order = "reorder"

# ---------------------------------------------------------------------------
# Theme (on-screen view)
# ---------------------------------------------------------------------------
[theme]
accent = "#4f46e5"   # Active tab, headings
text = "#0f172a"
muted = "#64748b"    # Field labels, inactive tabs
border = "#cbd5e1"
"##
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --color-accent: {accent};
    --color-text: {text};
    --color-muted: {muted};
    --color-border: {border};
}}"#,
        accent = theme.accent,
        text = theme.text,
        muted = theme.muted,
        border = theme.border,
    )
}
