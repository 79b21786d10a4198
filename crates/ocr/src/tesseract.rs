//! Tesseract recognizer (CLI wrapper)
//!
//! Runs `tesseract <image> stdout ... tsv` and rebuilds the line/word
//! hierarchy from the TSV rows. Boxes come back in the pixel space of the
//! image that was passed in.

use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::process::Command;
use std::time::Instant;

use crate::engine::TextRecognizer;
use crate::error::OcrError;
use crate::types::{RawBox, RecognizedText, TextBlock, TextElement, TextLine};

/// TSV row levels
const LEVEL_BLOCK: i32 = 2;
const LEVEL_LINE: i32 = 4;
const LEVEL_WORD: i32 = 5;

/// Tesseract settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TesseractConfig {
    /// Executable path, `tesseract` on PATH when unset
    pub binary_path: Option<String>,
    /// tessdata directory
    pub tessdata_path: Option<String>,
    /// Language, e.g. "eng" or "eng+deu"
    pub lang: Option<String>,
    /// Page segmentation mode (0-13)
    pub psm: Option<u8>,
    /// OCR engine mode (0-3)
    pub oem: Option<u8>,
}

impl TesseractConfig {
    pub fn binary_or_default(&self) -> &str {
        self.binary_path.as_deref().unwrap_or("tesseract")
    }

    pub fn lang_or_default(&self) -> &str {
        self.lang.as_deref().unwrap_or("eng")
    }

    /// Fully automatic segmentation suits photos better than a single block.
    pub fn psm_or_default(&self) -> u8 {
        self.psm.unwrap_or(3)
    }

    pub fn oem_or_default(&self) -> u8 {
        self.oem.unwrap_or(1)
    }
}

pub struct TesseractRecognizer {
    config: TesseractConfig,
    version: String,
}

impl TesseractRecognizer {
    /// Checks that the binary runs before accepting the config.
    pub fn new(config: TesseractConfig) -> Result<Self, OcrError> {
        let version = tesseract_version(config.binary_or_default())?;
        log::info!("[Tesseract] ready, version {}", version);
        Ok(Self { config, version })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn run(&self, image_path: &std::path::Path) -> Result<String, OcrError> {
        let mut cmd = Command::new(self.config.binary_or_default());
        cmd.arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(self.config.lang_or_default())
            .arg("--psm")
            .arg(self.config.psm_or_default().to_string())
            .arg("--oem")
            .arg(self.config.oem_or_default().to_string())
            .arg("tsv");

        if let Some(tessdata_path) = &self.config.tessdata_path {
            cmd.env("TESSDATA_PREFIX", tessdata_path);
        }

        log::debug!(
            "[Tesseract] running {} {} -l {} --psm {} --oem {} tsv",
            self.config.binary_or_default(),
            image_path.display(),
            self.config.lang_or_default(),
            self.config.psm_or_default(),
            self.config.oem_or_default()
        );

        let output = cmd.output().map_err(|e| {
            OcrError::EngineUnavailable(format!("failed to run tesseract: {}", e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&mut self, bitmap: &RgbaImage) -> Result<RecognizedText, OcrError> {
        let start = Instant::now();

        let input = tempfile::Builder::new()
            .prefix("shhhot_ocr_")
            .suffix(".png")
            .tempfile()?;
        bitmap
            .save_with_format(input.path(), ImageFormat::Png)
            .map_err(|e| OcrError::ImageProcess(format!("failed to write temp image: {}", e)))?;

        let tsv = self.run(input.path())?;
        let text = parse_tsv(&tsv);

        log::info!(
            "[Tesseract] done in {} ms, {} blocks",
            start.elapsed().as_millis(),
            text.blocks.len()
        );
        Ok(text)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

/// Rebuilds blocks/lines/words from Tesseract TSV output.
///
/// Columns:
/// level page_num block_num par_num line_num word_num left top width height conf text
///
/// Words with empty text or negative confidence are skipped, and lines that
/// end up with no words are not emitted.
pub fn parse_tsv(tsv: &str) -> RecognizedText {
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut line_key: Option<(u32, u32, u32)> = None;

    for row in tsv.lines() {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 11 {
            continue;
        }
        // the header row fails here too
        let Ok(level) = cols[0].trim().parse::<i32>() else {
            continue;
        };
        let num = |i: usize| cols[i].trim().parse::<u32>().unwrap_or(0);
        let coord = |i: usize| cols[i].trim().parse::<i32>().ok();
        let bbox = match (coord(6), coord(7), coord(8), coord(9)) {
            (Some(l), Some(t), Some(w), Some(h)) => Some(RawBox::from_ltwh(l, t, w, h)),
            _ => None,
        };
        let key = (num(2), num(3), num(4));

        match level {
            LEVEL_BLOCK => {
                blocks.push(TextBlock::default());
                line_key = None;
            }
            LEVEL_LINE => {
                if blocks.is_empty() {
                    blocks.push(TextBlock::default());
                }
                if let Some(block) = blocks.last_mut() {
                    block.lines.push(TextLine {
                        bbox,
                        elements: Vec::new(),
                    });
                }
                line_key = Some(key);
            }
            LEVEL_WORD => {
                let text = cols.get(11).map(|t| t.trim()).unwrap_or("");
                let conf: f32 = cols[10].trim().parse().unwrap_or(-1.0);
                if text.is_empty() || conf < 0.0 {
                    continue;
                }

                if blocks.is_empty() {
                    blocks.push(TextBlock::default());
                }
                let Some(block) = blocks.last_mut() else {
                    continue;
                };
                // a word outside its announced line gets a line without geometry
                if line_key != Some(key) || block.lines.is_empty() {
                    block.lines.push(TextLine::default());
                    line_key = Some(key);
                }
                if let Some(line) = block.lines.last_mut() {
                    line.elements.push(TextElement {
                        text: text.to_string(),
                        bbox,
                        confidence: conf / 100.0,
                    });
                }
            }
            _ => {}
        }
    }

    for block in &mut blocks {
        block.lines.retain(|line| !line.elements.is_empty());
    }
    blocks.retain(|block| !block.lines.is_empty());

    RecognizedText { blocks }
}

/// Reads the version from `tesseract --version`.
pub fn tesseract_version(binary_path: &str) -> Result<String, OcrError> {
    let output = Command::new(binary_path)
        .arg("--version")
        .output()
        .map_err(|e| OcrError::EngineUnavailable(format!("cannot run {}: {}", binary_path, e)))?;

    if !output.status.success() {
        return Err(OcrError::EngineUnavailable(
            "tesseract --version failed".to_string(),
        ));
    }

    // older builds print the banner on stderr
    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(parse_version(&combined).unwrap_or_else(|| "unknown".to_string()))
}

fn parse_version(banner: &str) -> Option<String> {
    banner
        .lines()
        .find(|line| line.contains("tesseract"))
        .and_then(|line| line.split_whitespace().nth(1))
        .map(|v| v.trim_start_matches('v').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_parse_tsv_hierarchy() {
        let input = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t",
            "2\t1\t1\t0\t0\t0\t10\t10\t300\t60\t-1\t",
            "3\t1\t1\t1\t0\t0\t10\t10\t300\t60\t-1\t",
            "4\t1\t1\t1\t1\t0\t10\t10\t300\t20\t-1\t",
            "5\t1\t1\t1\t1\t1\t10\t10\t80\t20\t96.5\tAccount",
            "5\t1\t1\t1\t1\t2\t100\t10\t120\t20\t91.0\t12345678",
            "4\t1\t1\t1\t2\t0\t10\t50\t200\t20\t-1\t",
            "5\t1\t1\t1\t2\t1\t10\t50\t200\t20\t88.0\tPIN",
            "2\t1\t2\t0\t0\t0\t10\t200\t100\t20\t-1\t",
            "3\t1\t2\t1\t0\t0\t10\t200\t100\t20\t-1\t",
            "4\t1\t2\t1\t1\t0\t10\t200\t100\t20\t-1\t",
            "5\t1\t2\t1\t1\t1\t10\t200\t100\t20\t95.0\t0000",
        ]);

        let text = parse_tsv(&input);
        assert_eq!(text.blocks.len(), 2);
        assert_eq!(text.blocks[0].lines.len(), 2);
        assert_eq!(text.blocks[1].lines.len(), 1);

        let first = &text.blocks[0].lines[0];
        assert_eq!(first.bbox, Some(RawBox::from_ltwh(10, 10, 300, 20)));
        assert_eq!(first.elements[1].text, "12345678");
        assert_eq!(first.elements[1].bbox, Some(RawBox::from_ltwh(100, 10, 120, 20)));
        assert!((first.elements[0].confidence - 0.965).abs() < 1e-4);

        assert_eq!(text.text(), "Account 12345678\nPIN\n0000");
    }

    #[test]
    fn test_parse_tsv_skips_empty_words() {
        let input = tsv(&[
            "2\t1\t1\t0\t0\t0\t0\t0\t50\t50\t-1\t",
            "4\t1\t1\t1\t1\t0\t0\t0\t50\t10\t-1\t",
            "5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t-1\t ",
            "5\t1\t1\t1\t1\t2\t12\t0\t10\t10\t40.0\t",
        ]);
        let text = parse_tsv(&input);
        assert!(text.blocks.is_empty());
    }

    #[test]
    fn test_parse_tsv_garbage() {
        assert!(parse_tsv("").blocks.is_empty());
        assert!(parse_tsv("not\ta\ttsv").blocks.is_empty());
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("tesseract 5.3.0\n leptonica-1.82.0"),
            Some("5.3.0".to_string())
        );
        assert_eq!(parse_version("tesseract v4.1.1"), Some("4.1.1".to_string()));
        assert_eq!(parse_version("nothing here"), None);
    }

    #[test]
    fn test_config_defaults() {
        let config: TesseractConfig = serde_json::from_str("{\"lang\":\"deu\"}").unwrap();
        assert_eq!(config.lang_or_default(), "deu");
        assert_eq!(config.binary_or_default(), "tesseract");
        assert_eq!(config.psm_or_default(), 3);
    }
}
