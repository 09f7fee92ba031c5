use async_trait::async_trait;
use tracing::info;

use crate::config::ProcessConfig;
use crate::process::{invoke, InvokeError};

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Downloads the document at `url` and returns its plain text.
    async fn extract(&self, url: &str) -> Result<String, InvokeError>;
}

/// Runs the external extraction engine with the URL as its only payload.
#[derive(Debug, Clone)]
pub struct DocumentTextExtractor {
    config: ProcessConfig,
}

impl DocumentTextExtractor {
    pub fn new(config: ProcessConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    async fn extract(&self, url: &str) -> Result<String, InvokeError> {
        let invocation = invoke(&self.config, url.to_string()).await?;
        let text = parse_extracted_text(invocation.stdout)?;
        info!(
            invocation_id = %invocation.id,
            characters = text.chars().count(),
            "Extracted document text"
        );
        Ok(text)
    }
}

fn parse_extracted_text(stdout: Vec<u8>) -> Result<String, InvokeError> {
    let text = String::from_utf8(stdout)
        .map_err(|e| InvokeError::OutputFormat(format!("extracted text is not UTF-8: {e}")))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InvokeError::OutputFormat(
            "extractor produced no text".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(body: &str) -> (DocumentTextExtractor, tempfile::NamedTempFile) {
        let mut script = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut script, body.as_bytes()).unwrap();
        let config = ProcessConfig::new("sh").with_script(script.path());
        (DocumentTextExtractor::new(config), script)
    }

    #[tokio::test]
    async fn test_extract_passes_url_and_trims_output() {
        let (ex, _script) = extractor("printf '\\n  text from %s  \\n' \"$1\"");
        let text = ex.extract("https://bucket.example/resumes/a.pdf").await.unwrap();
        assert_eq!(text, "text from https://bucket.example/resumes/a.pdf");
    }

    #[tokio::test]
    async fn test_empty_output_is_format_error() {
        let (ex, _script) = extractor("exit 0");
        let err = ex.extract("https://bucket.example/a.pdf").await.unwrap_err();
        assert!(matches!(err, InvokeError::OutputFormat(_)));
    }

    #[tokio::test]
    async fn test_failed_download_is_exit_error() {
        let (ex, _script) = extractor("echo 'HTTPError 403' >&2; exit 1");
        let err = ex.extract("https://bucket.example/a.pdf").await.unwrap_err();
        assert!(matches!(err, InvokeError::Exit { .. }));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = parse_extracted_text(vec![0xff, 0xfe, b'a']).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }
}
