use serde::{Deserialize, Serialize};
use shhhot_core::CensorMode;
use shhhot_ocr::TesseractConfig;
use shhhot_render::{BlockFill, RedactOptions, DEFAULT_EXPAND_MARGIN};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides `export.directory` when set.
pub const EXPORT_DIR_ENV: &str = "SHHHOT_EXPORT_DIR";

pub const DEFAULT_FILE_PREFIX: &str = "Shhhot";
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    // ============ Censoring ============
    /// Global mode a new session starts with
    pub censor_mode: CensorMode,
    /// Pin the global mode onto a word when it is toggled on
    pub capture_mode_on_toggle: bool,
    /// BLOCK colour policy
    pub block_fill: BlockFill,
    /// Pixels added around each word before filling
    pub expand_margin: i32,

    // ============ Export ============
    pub export: ExportConfig,

    // ============ OCR ============
    pub tesseract: TesseractConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            censor_mode: CensorMode::Block,
            capture_mode_on_toggle: true,
            block_fill: BlockFill::DominantTextColor,
            expand_margin: DEFAULT_EXPAND_MARGIN,
            export: ExportConfig::default(),
            tesseract: TesseractConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn redact_options(&self) -> RedactOptions {
        RedactOptions {
            expand_margin: self.expand_margin.max(0),
            block_fill: self.block_fill,
        }
    }

    /// Applies an export directory override; empty values are ignored.
    pub fn with_export_dir_override(mut self, value: Option<OsString>) -> Self {
        if let Some(dir) = value.filter(|v| !v.is_empty()) {
            log::info!("[Config] export directory overridden: {:?}", dir);
            self.export.directory = Some(PathBuf::from(dir));
        }
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Target directory, the user's pictures directory when unset
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ExportConfig {
    pub fn directory_or_default(&self) -> Option<PathBuf> {
        self.directory.clone().or_else(dirs::picture_dir)
    }

    pub fn quality_clamped(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config dir unavailable")]
    NoConfigDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// `<config dir>/shhhot/config.json`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("shhhot").join("config.json"))
}

/// Missing file means defaults. The export directory env override is
/// applied either way.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = if path.exists() {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw)?
    } else {
        AppConfig::default()
    };
    Ok(config.with_export_dir_override(std::env::var_os(EXPORT_DIR_ENV)))
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let raw = serde_json::to_string_pretty(config)?;
    fs::write(path, raw)?;
    log::info!("[Config] saved to {}", path.display());
    Ok(())
}
