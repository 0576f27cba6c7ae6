use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Failures raised while turning a dropped PDF into generated content.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("failed to extract text from {}: {message}", path.display())]
    Extraction { path: PathBuf, message: String },

    #[error("model provider rejected the credentials: {0}")]
    Authentication(String),

    #[error("model provider request failed: {0}")]
    Provider(String),

    #[error("cannot watch {}: {message}", path.display())]
    WatchSetup { path: PathBuf, message: String },

    #[error("processing worker crashed: {0}")]
    Worker(String),
}

impl AgentError {
    pub(crate) fn extraction(path: &Path, message: impl Display) -> Self {
        Self::Extraction {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub(crate) fn watch_setup(path: &Path, message: impl Display) -> Self {
        Self::WatchSetup {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Fatal errors stop the watch loop; the rest are reported per file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Authentication(_) | Self::WatchSetup { .. } | Self::Worker(_)
        )
    }
}
