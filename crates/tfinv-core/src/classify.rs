//! Host resource classification

use serde::{Deserialize, Serialize};

/// Resource name prefix recognized when no prefixes are configured
pub const DEFAULT_HOST_PREFIX: &str = "vsphere_virtual_machine.host";

/// Decides which resources are manageable hosts
///
/// A resource is a host when its name starts with any of the configured
/// prefixes. Everything else is skipped by the conversion without error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceClassifier {
    prefixes: Vec<String>,
}

impl ResourceClassifier {
    /// Create a classifier for the given prefixes, tested in order
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if `resource_name` names a host
    #[must_use]
    pub fn is_host(&self, resource_name: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| resource_name.starts_with(prefix.as_str()))
    }

    /// Configured prefixes
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for ResourceClassifier {
    fn default() -> Self {
        Self::new([DEFAULT_HOST_PREFIX])
    }
}
