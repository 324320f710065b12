//! tfinv-core: infrastructure state to dynamic inventory conversion
//!
//! Resolves inherited module outputs, classifies host resources and assembles
//! an inventory that renders either as a flat group registry with
//! `_meta.hostvars` or as a nested children tree. Performs no I/O.
//!
//! ```
//! use serde_json::json;
//! use tfinv_core::{ConvertOptions, ModuleState, OutputState, ResourceState, State, convert};
//!
//! let state = State::with_modules(vec![
//!     ModuleState::new(["root"])
//!         .with_output("meta", OutputState::new(json!({"group": "web", "env": "prod"}))),
//!     ModuleState::new(["root", "net"]).with_resource(
//!         "vsphere_virtual_machine.host.0",
//!         ResourceState::with_attributes([("name", "web1"), ("default_ip_address", "10.0.0.5")]),
//!     ),
//! ]);
//!
//! let inventory = convert(&state, &ConvertOptions::default())?;
//! assert_eq!(inventory.group_names(), ["web".to_string()]);
//! # Ok::<(), tfinv_core::ConvertError>(())
//! ```

pub mod address;
pub mod builder;
pub mod classify;
pub mod error;
pub mod inventory;
pub mod meta;
pub mod options;
pub mod resolve;
pub mod state;

pub use address::{AddressExtractor, HostEntry};
pub use builder::{InventoryBuilder, convert};
pub use classify::{DEFAULT_HOST_PREFIX, ResourceClassifier};
pub use error::{ConvertError, Result};
pub use inventory::{
    ALL_GROUP, FlatGroup, FlatInventory, FlatMeta, Group, HostVars, Inventory, META_KEY,
    OutputFormat, TreeGroup, TreeInventory,
};
pub use meta::{GroupMeta, extract_group_meta};
pub use options::ConvertOptions;
pub use resolve::OutputResolver;
pub use state::{InstanceState, ModulePath, ModuleState, OutputState, ResourceState, State};
