//! PDF-to-text collaborator
//!
//! The monitor never parses PDFs itself; it hands a file path to a
//! [`PdfTextExtractor`]. The binary uses the `pdftotext` command.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum PdfTextError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("Failed to read PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a PDF file into plain text, pages separated by newlines
#[async_trait]
pub trait PdfTextExtractor: Send + Sync {
    async fn extract_text(&self, path: &Path) -> Result<String, PdfTextError>;
}

/// Shells out to `pdftotext` (poppler-utils)
#[derive(Debug, Clone)]
pub struct PdftotextExtractor {
    program: PathBuf,
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        Self::with_program("pdftotext")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PdfTextExtractor for PdftotextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, PdfTextError> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(path)
            .arg("-")
            .output()
            .await
            .map_err(|source| PdfTextError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PdfTextError::Failed {
                program,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // pdftotext separates pages with form feeds
        Ok(String::from_utf8_lossy(&output.stdout).replace('\u{c}', "\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let extractor = PdftotextExtractor::with_program("/nonexistent/menu-scout-pdftotext");
        let result = extractor.extract_text(Path::new("menu.pdf")).await;
        assert!(matches!(result, Err(PdfTextError::Spawn { .. })));
    }
}
