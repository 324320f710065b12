//! Conversion options

use serde::{Deserialize, Serialize};

use crate::address::AddressExtractor;
use crate::classify::ResourceClassifier;

/// Options controlling a state-to-inventory conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Project name exposed as the `project` variable of `all`
    pub project: Option<String>,
    /// Which resources count as hosts
    pub classifier: ResourceClassifier,
    /// Which attributes hold the address and display name
    pub extractor: AddressExtractor,
}

impl ConvertOptions {
    /// Set the project name
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Replace the host resource prefixes
    #[must_use]
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classifier = ResourceClassifier::new(prefixes);
        self
    }

    /// Replace the address extractor
    #[must_use]
    pub fn with_extractor(mut self, extractor: AddressExtractor) -> Self {
        self.extractor = extractor;
        self
    }
}
