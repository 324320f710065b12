//! Infrastructure state document types
//!
//! Mirrors the module-tree layout of a version 3 Terraform state file. Only
//! the fields the conversion needs are modelled; everything else is ignored
//! during deserialization.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;

// ============================================================================
// Module paths
// ============================================================================

/// Ordered path segments from the root module (`["root", "net"]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    /// Create a path from its segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Number of segments
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the path has no segments
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if this is the top-level root path
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Path segments
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Path of the enclosing module, `None` for the root or an empty path
    #[must_use]
    pub fn parent(&self) -> Option<&[String]> {
        match self.0.len() {
            0 | 1 => None,
            n => Some(&self.0[..n - 1]),
        }
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<empty>");
        }
        write!(f, "{}", self.0.join("."))
    }
}

impl<const N: usize> From<[&str; N]> for ModulePath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl From<Vec<String>> for ModulePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

/// Deserialize an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// State document
// ============================================================================

/// Root of a state document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// State format version
    #[serde(default)]
    pub version: Option<u64>,
    /// Monotonic serial of this snapshot
    #[serde(default)]
    pub serial: Option<u64>,
    /// Lineage identifier shared by snapshots of one state
    #[serde(default)]
    pub lineage: Option<String>,
    /// Modules in document order
    #[serde(default, deserialize_with = "null_as_default")]
    pub modules: Vec<ModuleState>,
}

impl State {
    /// Decode a state document from JSON bytes
    ///
    /// # Errors
    /// Returns `ConvertError::Decode` if the bytes are not a valid state document.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Create a state from a list of modules
    #[must_use]
    pub fn with_modules(modules: Vec<ModuleState>) -> Self {
        Self {
            modules,
            ..Self::default()
        }
    }
}

/// A node in the module tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleState {
    /// Path from the root module
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: ModulePath,
    /// Outputs declared by this module
    #[serde(default, deserialize_with = "null_as_default")]
    pub outputs: BTreeMap<String, OutputState>,
    /// Resources keyed by their type-prefixed name
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: BTreeMap<String, ResourceState>,
}

impl ModuleState {
    /// Create an empty module at `path`
    pub fn new(path: impl Into<ModulePath>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add an output
    #[must_use]
    pub fn with_output(mut self, key: impl Into<String>, output: OutputState) -> Self {
        self.outputs.insert(key.into(), output);
        self
    }

    /// Add a resource
    #[must_use]
    pub fn with_resource(mut self, name: impl Into<String>, resource: ResourceState) -> Self {
        self.resources.insert(name.into(), resource);
        self
    }
}

/// A module output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputState {
    /// Output value; `None` when the document holds `null`
    #[serde(default)]
    pub value: Option<Value>,
    /// Declared output type (`string`, `map`, `list`)
    #[serde(default, rename = "type")]
    pub output_type: Option<String>,
    /// Whether the value is marked sensitive
    #[serde(default)]
    pub sensitive: bool,
}

impl OutputState {
    /// Create an output holding `value`
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value: Some(value),
            output_type: None,
            sensitive: false,
        }
    }
}

/// A provisioned resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceState {
    /// Resource type (`vsphere_virtual_machine`)
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    /// Primary instance
    #[serde(default)]
    pub primary: Option<InstanceState>,
}

impl ResourceState {
    /// Create a resource whose primary instance has the given attributes
    pub fn with_attributes<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            resource_type: None,
            primary: Some(InstanceState {
                id: None,
                attributes: Some(
                    attributes
                        .into_iter()
                        .map(|(k, v)| (k.into(), v.into()))
                        .collect(),
                ),
            }),
        }
    }
}

/// Primary instance of a resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceState {
    /// Provider-assigned identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Flattened attribute map (`guest_ip_addresses.0` style keys)
    #[serde(default)]
    pub attributes: Option<BTreeMap<String, String>>,
}
