//! HTML → PDF through an external converter (`<command> [args..] <in.html> <out.pdf>`).

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::AppError;

const CONVERT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct PdfConverter {
    program: String,
    args: Vec<String>,
}

impl PdfConverter {
    /// `command` is split on whitespace; the first word is the program.
    pub fn new(command: &str) -> Self {
        let mut words = command.split_whitespace().map(String::from);
        let program = words.next().unwrap_or_default();
        Self {
            program,
            args: words.collect(),
        }
    }

    pub async fn convert(&self, html: &str) -> Result<Vec<u8>, AppError> {
        if self.program.is_empty() {
            return Err(AppError::Render("PDF_RENDER_COMMAND is empty".to_string()));
        }

        let workdir = tempfile::tempdir()
            .map_err(|e| AppError::Render(format!("Cannot create work directory: {e}")))?;
        let input = workdir.path().join("cv.html");
        let output = workdir.path().join("cv.pdf");
        tokio::fs::write(&input, html)
            .await
            .map_err(|e| AppError::Render(format!("Cannot write HTML input: {e}")))?;

        debug!("Running {} on {}", self.program, input.display());
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&input)
            .arg(&output)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::Render(format!("Cannot start '{}': {e}", self.program)))?;

        let result = tokio::time::timeout(CONVERT_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| {
                AppError::Render(format!(
                    "'{}' timed out after {} seconds",
                    self.program,
                    CONVERT_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| AppError::Render(format!("'{}' failed: {e}", self.program)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(AppError::Render(format!(
                "'{}' exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            )));
        }

        let pdf = tokio::fs::read(&output)
            .await
            .map_err(|e| AppError::Render(format!("Converter produced no output: {e}")))?;
        info!("PDF generated: {} bytes", pdf.len());
        Ok(pdf)
    }
}
