//! Local file and stdin source

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument};

use crate::error::{Result, SourceError};
use crate::traits::StateSource;

/// Path meaning "read standard input"
pub const STDIN_PATH: &str = "-";

/// Reads a state document from a file, or stdin for `-`
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Source reading standard input
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(STDIN_PATH)
    }

    /// Check if this source reads standard input
    #[must_use]
    pub fn is_stdin(&self) -> bool {
        self.path.as_os_str() == STDIN_PATH
    }

    fn io_error(&self, source: std::io::Error) -> SourceError {
        SourceError::Io {
            path: self.describe(),
            source,
        }
    }
}

#[async_trait]
impl StateSource for FileSource {
    #[instrument(skip(self), fields(source = %self.describe()))]
    async fn fetch(&self) -> Result<Vec<u8>> {
        let bytes = if self.is_stdin() {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .map_err(|e| self.io_error(e))?;
            buf
        } else {
            tokio::fs::read(&self.path)
                .await
                .map_err(|e| self.io_error(e))?
        };

        debug!(bytes = bytes.len(), "read state document");
        Ok(bytes)
    }

    fn describe(&self) -> String {
        if self.is_stdin() {
            "<stdin>".to_string()
        } else {
            self.path.display().to_string()
        }
    }
}
