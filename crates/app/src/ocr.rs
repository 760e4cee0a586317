//! Tesseract CLI as the text recognition collaborator

use crate::error::RecognitionError;
use crate::pipeline::TextRecognizer;
use capture::RawImage;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Source language passed to Tesseract
pub const SOURCE_LANGUAGE: &str = "eng";

/// Page segmentation mode 6: a single uniform block of text
const PAGE_SEG_MODE: &str = "6";

pub struct TesseractOcr {
    path: String,
}

impl TesseractOcr {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    fn command(&self) -> Command {
        #[allow(unused_mut)]
        let mut cmd = Command::new(&self.path);
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }
        cmd
    }

    fn engine_error(&self, source: std::io::Error) -> RecognitionError {
        RecognitionError::Engine {
            path: self.path.clone(),
            source,
        }
    }

    /// Check the engine can be launched; returns its version banner
    pub fn probe(&self) -> Result<String, RecognitionError> {
        let output = self
            .command()
            .arg("--version")
            .output()
            .map_err(|e| self.engine_error(e))?;

        if !output.status.success() {
            return Err(RecognitionError::Failed(format!(
                "{} --version exited with {}",
                self.path, output.status
            )));
        }

        // Older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        let version = String::from_utf8_lossy(banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        info!(%version, "OCR engine available");
        Ok(version)
    }

    /// Arguments for reading a PNG from stdin and writing text to stdout
    pub fn recognize_args() -> [&'static str; 6] {
        ["stdin", "stdout", "-l", SOURCE_LANGUAGE, "--psm", PAGE_SEG_MODE]
    }
}

impl TextRecognizer for TesseractOcr {
    fn recognize(&mut self, image: &RawImage) -> Result<String, RecognitionError> {
        let png = image.to_png()?;

        let mut child = self
            .command()
            .args(Self::recognize_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.engine_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .map_err(|e| RecognitionError::Failed(format!("writing image to OCR: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| RecognitionError::Failed(format!("waiting for OCR: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::Failed(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = output.stdout.len(), "OCR finished");
        Ok(text)
    }
}
