//! Export sink
//!
//! Persists a finished bitmap and hands back where it went. Callers only
//! learn success or failure; the concrete cause is logged by the session.

use chrono::Local;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::ExportConfig;

/// Same-second collisions tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Where an exported image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLocation {
    path: PathBuf,
}

impl ExportLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for ExportLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no pictures directory available")]
    NoDirectory,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] image::ImageError),
}

pub trait ExportSink: Send + Sync {
    fn export(&self, bitmap: &RgbaImage) -> Result<ExportLocation, ExportError>;
}

/// Writes `<prefix>_<yyyyMMdd_HHmmss>.jpg` into a pictures directory.
#[derive(Debug, Clone)]
pub struct PicturesSink {
    directory: PathBuf,
    prefix: String,
    quality: u8,
}

impl PicturesSink {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>, quality: u8) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            quality: quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Result<Self, ExportError> {
        let directory = config
            .directory_or_default()
            .ok_or(ExportError::NoDirectory)?;
        Ok(Self::new(
            directory,
            config.file_prefix.clone(),
            config.quality_clamped(),
        ))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Opens a fresh file for `stamp`, appending `_1`, `_2`, ... on collision.
    fn create_unique(&self, stamp: &str) -> Result<(File, PathBuf), ExportError> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.directory.join(file_name(&self.prefix, stamp, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((file, path)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free file name for {}_{}", self.prefix, stamp),
        )
        .into())
    }
}

impl ExportSink for PicturesSink {
    fn export(&self, bitmap: &RgbaImage) -> Result<ExportLocation, ExportError> {
        fs::create_dir_all(&self.directory)?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let (file, path) = self.create_unique(&stamp)?;

        let written = write_jpeg(file, bitmap, self.quality);
        if let Err(e) = written {
            // leave no truncated file behind
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        log::info!("[Export] saved {}", path.display());
        Ok(ExportLocation::new(path))
    }
}

fn file_name(prefix: &str, stamp: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{}_{}.jpg", prefix, stamp)
    } else {
        format!("{}_{}_{}.jpg", prefix, stamp, attempt)
    }
}

fn write_jpeg(file: File, bitmap: &RgbaImage, quality: u8) -> Result<(), ExportError> {
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgba8(bitmap.clone()).to_rgb8();
    let mut writer = BufWriter::new(file);
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))?;
    writer.flush()?;
    Ok(())
}
