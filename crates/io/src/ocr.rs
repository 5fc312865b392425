//! Text extraction from implant screenshots.
//!
//! Extraction never fails from the caller's point of view: any internal
//! problem is logged and yields empty text, which the record builder turns
//! into an all-default record.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use implant_core::{build_record, CharacterRecord};

pub trait TextExtractor {
    /// Raw multi-line OCR text for `image`, or `""` on failure.
    fn extract_text(&self, image: &Path) -> String;
}

/// Runs `tesseract <image> stdout` and captures its output.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    /// Locate `tesseract` on `PATH`.
    pub fn from_path() -> Option<Self> {
        which::which("tesseract").ok().map(Self::new)
    }

    /// Use `configured` when given, else search `PATH`.
    pub fn resolve(configured: Option<&Path>) -> Option<Self> {
        match configured {
            Some(p) => Some(Self::new(p)),
            None => Self::from_path(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl TextExtractor for TesseractCli {
    fn extract_text(&self, image: &Path) -> String {
        let output = match Command::new(&self.binary).arg(image).arg("stdout").output() {
            Ok(output) => output,
            Err(e) => {
                warn!(binary = %self.binary.display(), error = %e, "failed to run tesseract");
                return String::new();
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                image = %image.display(),
                exit = output.status.code().unwrap_or(-1),
                stderr = %stderr.trim(),
                "tesseract failed"
            );
            return String::new();
        }

        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

/// Reads previously extracted text from `<image stem>.txt` beside the image.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarText;

impl SidecarText {
    pub fn sidecar_path(image: &Path) -> PathBuf {
        image.with_extension("txt")
    }
}

impl TextExtractor for SidecarText {
    fn extract_text(&self, image: &Path) -> String {
        let path = Self::sidecar_path(image);
        match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no sidecar text");
                String::new()
            }
        }
    }
}

/// Extract text from `image` and fold it into a record pointing at the image.
pub fn extract_record(extractor: &dyn TextExtractor, image: &Path) -> CharacterRecord {
    let text = extractor.extract_text(image);
    if text.trim().is_empty() {
        warn!(image = %image.display(), "no text extracted");
    }
    let path = image.to_string_lossy();
    build_record(&text, Some(path.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sidecar_reads_text_next_to_image() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("ava.png");
        fs::write(dir.path().join("ava.txt"), "Sample #: 42\nGender: Female\n").unwrap();

        let record = extract_record(&SidecarText, &image);
        assert_eq!(record.sample_number.as_ref().map(|s| s.as_str()), Some("42"));
        assert_eq!(record.gender.as_deref(), Some("Female"));
        assert_eq!(
            record.background_image.as_deref(),
            Some(image.to_string_lossy().as_ref())
        );
    }

    #[test]
    fn missing_sidecar_yields_default_record() {
        let dir = tempdir().unwrap();
        let record = extract_record(&SidecarText, &dir.path().join("none.png"));
        assert_eq!(record.sample_number, None);
        assert_eq!(record.chibi_levels, "N/A");
    }

    #[test]
    fn missing_tesseract_binary_yields_empty_text() {
        let dir = tempdir().unwrap();
        let ocr = TesseractCli::new(dir.path().join("no-such-tesseract"));
        assert_eq!(ocr.extract_text(&dir.path().join("x.png")), "");
    }
}
