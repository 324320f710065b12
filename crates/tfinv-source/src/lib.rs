//! tfinv-source: where state documents come from
//!
//! Provides the [`StateSource`] trait with a local file/stdin implementation
//! and a Consul key/value implementation. Sources only return raw bytes;
//! decoding and conversion happen in `tfinv-core`.
//!
//! # Examples
//!
//! ```no_run
//! use tfinv_source::{FileSource, StateSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = FileSource::new("terraform.tfstate");
//! let bytes = source.fetch().await?;
//! println!("read {} bytes from {}", bytes.len(), source.describe());
//! # Ok(())
//! # }
//! ```

pub mod consul;
pub mod error;
pub mod file;
pub mod traits;

pub use consul::{ConsulSource, DEFAULT_CONSUL_ADDRESS};
pub use error::{Result, SourceError};
pub use file::FileSource;
pub use traits::StateSource;
