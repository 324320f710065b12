//! Error types for tfinv-core

use thiserror::Error;

use crate::state::ModulePath;

/// Errors that abort a state-to-inventory conversion
///
/// Conversion is all-or-nothing: the first failure is returned unchanged and
/// no partial inventory is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// The state holds no modules
    #[error("state has no modules")]
    EmptyModules,

    /// A module has an empty path
    #[error("module #{index} has an empty path")]
    EmptyPath {
        /// Position of the module in the state
        index: usize,
    },

    /// Neither the module nor any ancestor declares a `meta` output
    #[error("no meta output resolved for module {module}")]
    MissingMetaInModule {
        /// Offending module
        module: ModulePath,
    },

    /// A resolved output map has no `meta` entry
    ///
    /// Only returned by [`extract_group_meta`](crate::extract_group_meta)
    /// called directly. [`InventoryBuilder`](crate::InventoryBuilder) reports
    /// `MissingMetaInModule` instead.
    #[error("outputs of module {module} have no meta entry")]
    MissingMetaOutput {
        /// Module whose outputs were inspected
        module: ModulePath,
    },

    /// The `meta` output is present but carries no value
    #[error("meta output has no value in module {module}")]
    NilMetaValue {
        /// Module whose outputs were inspected
        module: ModulePath,
    },

    /// The `meta` output value is not a map
    #[error("meta output value is not a map in module {module} (found {found})")]
    MetaValueNotMap {
        /// Module whose outputs were inspected
        module: ModulePath,
        /// JSON kind of the value that was found
        found: &'static str,
    },

    /// The `meta` map has no usable `group` entry
    #[error("meta output has no group name in module {module}: {reason}")]
    MissingGroupName {
        /// Module whose outputs were inspected
        module: ModulePath,
        /// What was wrong with the `group` entry
        reason: String,
    },

    /// The module declares no resources at all
    #[error("module {module} has no resources")]
    EmptyResources {
        /// Offending module
        module: ModulePath,
    },

    /// A host resource has no primary instance
    #[error("resource {resource} ({group}) in module {module} has no primary instance")]
    MissingPrimary {
        /// Module holding the resource
        module: ModulePath,
        /// Resource name
        resource: String,
        /// Group the resource was classified into
        group: String,
    },

    /// A host resource's primary instance has no attributes
    #[error("resource {resource} ({group}) in module {module} has no attributes")]
    MissingAttributes {
        /// Module holding the resource
        module: ModulePath,
        /// Resource name
        resource: String,
        /// Group the resource was classified into
        group: String,
    },

    /// No connection address could be extracted
    #[error("resource {resource} ({group}) has neither {list_key} nor {default_key} attributes")]
    MissingAddress {
        /// Resource name
        resource: String,
        /// Group the resource was classified into
        group: String,
        /// Preferred list-style attribute key
        list_key: String,
        /// Fallback single-address attribute key
        default_key: String,
    },

    /// The host has no display name
    #[error("resource {resource} ({group}) has no {name_key} attribute")]
    MissingName {
        /// Resource name
        resource: String,
        /// Group the resource was classified into
        group: String,
        /// Name attribute key
        name_key: String,
    },

    /// The state document could not be decoded
    #[error("failed to decode state: {0}")]
    Decode(String),
}

impl ConvertError {
    /// Module path the error refers to, if any
    #[must_use]
    pub fn module_path(&self) -> Option<&ModulePath> {
        match self {
            ConvertError::MissingMetaInModule { module }
            | ConvertError::MissingMetaOutput { module }
            | ConvertError::NilMetaValue { module }
            | ConvertError::MetaValueNotMap { module, .. }
            | ConvertError::MissingGroupName { module, .. }
            | ConvertError::EmptyResources { module }
            | ConvertError::MissingPrimary { module, .. }
            | ConvertError::MissingAttributes { module, .. } => Some(module),
            _ => None,
        }
    }

    /// Check if the error points at a specific resource
    #[must_use]
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            ConvertError::MissingPrimary { .. }
                | ConvertError::MissingAttributes { .. }
                | ConvertError::MissingAddress { .. }
                | ConvertError::MissingName { .. }
        )
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::Decode(err.to_string())
    }
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
