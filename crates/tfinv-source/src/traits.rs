//! State source trait

use async_trait::async_trait;

use crate::error::Result;

/// Somewhere a raw state document can be read from
#[async_trait]
pub trait StateSource: Send + Sync {
    /// Fetch the raw state document bytes
    async fn fetch(&self) -> Result<Vec<u8>>;

    /// Human-readable location, for logs and error context
    fn describe(&self) -> String;
}
