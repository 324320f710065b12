//! Resolved inventory model and its output representations
//!
//! The builder fills one [`Inventory`]; the flat and tree documents are both
//! rendered from it, so the choice between them never affects how hosts are
//! grouped.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::address::HostEntry;

/// Name of the umbrella group holding every discovered group
pub const ALL_GROUP: &str = "all";

/// Reserved top-level key of the flat representation
pub const META_KEY: &str = "_meta";

// ============================================================================
// Internal model
// ============================================================================

/// A named collection of hosts sharing variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    /// Hosts in the order they were recorded
    pub hosts: Vec<HostEntry>,
    /// Group variables
    pub vars: Map<String, Value>,
}

/// Fully resolved inventory
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    all: Group,
    groups: BTreeMap<String, Group>,
    group_order: Vec<String>,
    hostvars: BTreeMap<String, String>,
}

impl Inventory {
    /// Create an empty inventory
    ///
    /// When `project` is set the umbrella group carries it as the `project` variable.
    #[must_use]
    pub fn new(project: Option<&str>) -> Self {
        let mut all = Group::default();
        if let Some(project) = project {
            all.vars
                .insert("project".to_string(), Value::String(project.to_string()));
        }

        Self {
            all,
            groups: BTreeMap::new(),
            group_order: Vec::new(),
            hostvars: BTreeMap::new(),
        }
    }

    /// Create `name` with `vars` unless it already exists
    ///
    /// Returns `true` if the group was created. Variables of an existing group
    /// are never replaced. The umbrella group only gains keys it lacks.
    pub(crate) fn ensure_group(&mut self, name: &str, vars: Map<String, Value>) -> bool {
        if name == ALL_GROUP {
            for (key, value) in vars {
                self.all.vars.entry(key).or_insert(value);
            }
            return false;
        }

        if self.groups.contains_key(name) {
            return false;
        }

        self.groups.insert(
            name.to_string(),
            Group {
                hosts: Vec::new(),
                vars,
            },
        );
        self.group_order.push(name.to_string());
        true
    }

    /// Record `host` as a member of `group`
    pub(crate) fn add_host(&mut self, group: &str, host: HostEntry) {
        self.hostvars
            .insert(host.address.clone(), host.hostname.clone());

        let target = if group == ALL_GROUP {
            &mut self.all
        } else {
            self.groups.entry(group.to_string()).or_default()
        };
        target.hosts.push(host);
    }

    /// The umbrella group
    #[must_use]
    pub fn all(&self) -> &Group {
        &self.all
    }

    /// Look up a discovered group
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        if name == ALL_GROUP {
            return Some(&self.all);
        }
        self.groups.get(name)
    }

    /// Discovered group names in discovery order
    #[must_use]
    pub fn group_names(&self) -> &[String] {
        &self.group_order
    }

    /// Number of distinct host addresses
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.hostvars.len()
    }

    /// Display name recorded for `address`
    #[must_use]
    pub fn hostname(&self, address: &str) -> Option<&str> {
        self.hostvars.get(address).map(String::as_str)
    }

    /// Render the flat group registry
    #[must_use]
    pub fn to_flat(&self) -> FlatInventory {
        let mut groups = BTreeMap::new();

        groups.insert(
            ALL_GROUP.to_string(),
            FlatGroup {
                hosts: addresses(&self.all),
                children: self.group_order.clone(),
                vars: self.all.vars.clone(),
            },
        );

        for (name, group) in &self.groups {
            groups.insert(
                name.clone(),
                FlatGroup {
                    hosts: addresses(group),
                    children: Vec::new(),
                    vars: group.vars.clone(),
                },
            );
        }

        let hostvars = self
            .hostvars
            .iter()
            .map(|(address, hostname)| {
                (
                    address.clone(),
                    HostVars {
                        hostname: hostname.clone(),
                    },
                )
            })
            .collect();

        FlatInventory {
            meta: FlatMeta { hostvars },
            groups,
        }
    }

    /// Render the nested children tree
    ///
    /// Every group appears exactly once, under the children of `all`. Hosts of
    /// a group are merged by address, the last recorded name winning.
    #[must_use]
    pub fn to_tree(&self) -> TreeInventory {
        let children = self
            .groups
            .iter()
            .map(|(name, group)| (name.clone(), tree_group(group, BTreeMap::new())))
            .collect();

        let mut groups = BTreeMap::new();
        groups.insert(ALL_GROUP.to_string(), tree_group(&self.all, children));

        TreeInventory { groups }
    }

    /// Serialize the selected representation as JSON
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self, format: OutputFormat, pretty: bool) -> serde_json::Result<String> {
        match (format, pretty) {
            (OutputFormat::Flat, true) => serde_json::to_string_pretty(&self.to_flat()),
            (OutputFormat::Flat, false) => serde_json::to_string(&self.to_flat()),
            (OutputFormat::Tree, true) => serde_json::to_string_pretty(&self.to_tree()),
            (OutputFormat::Tree, false) => serde_json::to_string(&self.to_tree()),
        }
    }
}

fn addresses(group: &Group) -> Vec<String> {
    group.hosts.iter().map(|h| h.address.clone()).collect()
}

fn tree_group(group: &Group, children: BTreeMap<String, TreeGroup>) -> TreeGroup {
    let hosts = group
        .hosts
        .iter()
        .map(|h| {
            (
                h.address.clone(),
                HostVars {
                    hostname: h.hostname.clone(),
                },
            )
        })
        .collect();

    TreeGroup {
        hosts,
        children,
        vars: group.vars.clone(),
    }
}

// ============================================================================
// Output representations
// ============================================================================

/// Per-host variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostVars {
    /// Display name
    pub hostname: String,
}

/// Flat representation: group registry plus `_meta.hostvars`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatInventory {
    /// Host variables keyed by address
    #[serde(rename = "_meta")]
    pub meta: FlatMeta,
    /// Groups keyed by name, `all` included
    #[serde(flatten)]
    pub groups: BTreeMap<String, FlatGroup>,
}

/// The `_meta` entry of the flat representation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatMeta {
    /// Host variables keyed by address
    pub hostvars: BTreeMap<String, HostVars>,
}

/// A group in the flat representation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatGroup {
    /// Member addresses
    pub hosts: Vec<String>,
    /// Child group names
    pub children: Vec<String>,
    /// Group variables
    pub vars: Map<String, Value>,
}

/// Tree representation: `all` with every group nested under its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeInventory {
    /// Top-level groups
    pub groups: BTreeMap<String, TreeGroup>,
}

/// A group in the tree representation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeGroup {
    /// Hosts keyed by address
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hosts: BTreeMap<String, HostVars>,
    /// Nested child groups
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, TreeGroup>,
    /// Group variables
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub vars: Map<String, Value>,
}

/// Which representation to emit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Group registry with `_meta.hostvars`
    #[default]
    Flat,
    /// Nested children tree
    Tree,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Flat => write!(f, "flat"),
            OutputFormat::Tree => write!(f, "tree"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flat" => Ok(OutputFormat::Flat),
            "tree" => Ok(OutputFormat::Tree),
            other => Err(format!("unknown output format: {other} (expected flat or tree)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn host(address: &str, hostname: &str) -> HostEntry {
        HostEntry {
            address: address.to_string(),
            hostname: hostname.to_string(),
        }
    }

    fn vars(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_group_created_once() {
        let mut inventory = Inventory::new(None);
        assert!(inventory.ensure_group("web", vars(json!({"env": "prod"}))));
        assert!(!inventory.ensure_group("web", vars(json!({"env": "dev"}))));

        assert_eq!(inventory.group_names(), ["web".to_string()]);
        assert_eq!(inventory.group("web").unwrap().vars["env"], "prod");
    }

    #[test]
    fn test_all_group_gains_missing_vars_only() {
        let mut inventory = Inventory::new(Some("demo"));
        inventory.ensure_group(ALL_GROUP, vars(json!({"project": "other", "dc": "infra1"})));
        inventory.add_host(ALL_GROUP, host("10.0.0.1", "lone"));

        let all = inventory.all();
        assert_eq!(all.vars["project"], "demo");
        assert_eq!(all.vars["dc"], "infra1");
        assert_eq!(all.hosts.len(), 1);
        assert!(inventory.group_names().is_empty());
    }

    #[test]
    fn test_flat_shape() {
        let mut inventory = Inventory::new(None);
        inventory.ensure_group("web", vars(json!({"env": "prod"})));
        inventory.add_host("web", host("10.0.0.5", "web1"));

        let value = serde_json::to_value(inventory.to_flat()).unwrap();
        assert_eq!(
            value,
            json!({
                "_meta": {"hostvars": {"10.0.0.5": {"hostname": "web1"}}},
                "all": {"hosts": [], "children": ["web"], "vars": {}},
                "web": {"hosts": ["10.0.0.5"], "children": [], "vars": {"env": "prod"}}
            })
        );
    }

    #[test]
    fn test_flat_hostvars_refreshed() {
        let mut inventory = Inventory::new(None);
        inventory.ensure_group("web", Map::new());
        inventory.add_host("web", host("10.0.0.5", "old"));
        inventory.add_host("web", host("10.0.0.5", "new"));

        let flat = inventory.to_flat();
        assert_eq!(flat.meta.hostvars["10.0.0.5"].hostname, "new");
        assert_eq!(flat.groups["web"].hosts, vec!["10.0.0.5", "10.0.0.5"]);
        assert_eq!(inventory.host_count(), 1);
    }

    #[test]
    fn test_tree_nested_only() {
        let mut inventory = Inventory::new(None);
        inventory.ensure_group("web", vars(json!({"env": "prod"})));
        inventory.add_host("web", host("10.0.0.5", "web1"));
        inventory.add_host("web", host("10.0.0.6", "web2"));

        let value = serde_json::to_value(inventory.to_tree()).unwrap();
        assert_eq!(
            value,
            json!({
                "all": {
                    "children": {
                        "web": {
                            "hosts": {
                                "10.0.0.5": {"hostname": "web1"},
                                "10.0.0.6": {"hostname": "web2"}
                            },
                            "vars": {"env": "prod"}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("flat".parse::<OutputFormat>(), Ok(OutputFormat::Flat));
        assert_eq!("TREE".parse::<OutputFormat>(), Ok(OutputFormat::Tree));
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Tree.to_string(), "tree");
    }
}
