use std::{path::Path, sync::Arc};

use tracing::debug;

use crate::{
    error::AgentError,
    extract::{TextExtractor, join_pages},
    generator::Generate,
};

/// Extracts one PDF and forwards its text to the generator.
pub struct Processor<E, G> {
    extractor: Arc<E>,
    generator: G,
}

impl<E, G> Processor<E, G>
where
    E: TextExtractor + 'static,
    G: Generate,
{
    pub fn new(extractor: E, generator: G) -> Self {
        Self {
            extractor: Arc::new(extractor),
            generator,
        }
    }

    pub async fn process(&self, path: &Path) -> Result<(), AgentError> {
        let text = self.extract(path).await?;
        self.generator.generate(&text).await
    }

    /// Runs the extractor off the async workers; a parser panic surfaces as an
    /// extraction failure for this file only.
    pub async fn extract(&self, path: &Path) -> Result<String, AgentError> {
        let extractor = Arc::clone(&self.extractor);
        let owned = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&owned))
            .await
            .map_err(|e| AgentError::extraction(path, format!("extractor task failed: {e}")))??;

        debug!(path = %path.display(), page_count = pages.len(), "extracted PDF text");
        Ok(join_pages(&pages))
    }
}
