//! Resume indexing: turns an uploaded resume into the plain text the ranking
//! pipeline later reads from `applications.clean_text`.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::applications::ApplicationRepository;
use crate::process::extractor::TextExtractor;
use crate::process::InvokeError;
use crate::ranking::error::StoreError;
use crate::ranking::models::ApplicationId;

pub mod handlers;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),

    #[error("{0}")]
    Validation(String),

    #[error("text extraction failed: {0}")]
    Extraction(#[from] InvokeError),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

pub struct ResumeIndexer {
    applications: Arc<dyn ApplicationRepository>,
    extractor: Arc<dyn TextExtractor>,
}

impl ResumeIndexer {
    pub fn new(applications: Arc<dyn ApplicationRepository>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            applications,
            extractor,
        }
    }

    pub async fn extract(&self, url: &str) -> Result<String, IndexError> {
        let url = validate_url(url)?;
        Ok(self.extractor.extract(url).await?)
    }

    /// Extracts the application's resume and stores the text on it.
    /// Returns the number of characters stored.
    pub async fn index_application(&self, application_id: ApplicationId) -> Result<usize, IndexError> {
        let application = self
            .applications
            .application(application_id)
            .await?
            .ok_or(IndexError::ApplicationNotFound(application_id))?;

        let text = self.extract(&application.resume_link).await?;
        self.applications
            .store_resume_text(application_id, &text)
            .await?;

        let characters = text.chars().count();
        info!(application_id, characters, "Stored extracted resume text");
        Ok(characters)
    }
}

fn validate_url(url: &str) -> Result<&str, IndexError> {
    let url = url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(IndexError::Validation(format!(
            "document URL must be http(s), got '{url}'"
        )));
    }
    Ok(url)
}
