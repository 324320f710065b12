//! Group metadata carried by the `meta` output

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{ConvertError, Result};
use crate::inventory::META_KEY;
use crate::state::{ModulePath, OutputState};

/// Output key holding group metadata
pub const META_OUTPUT: &str = "meta";

/// Key inside the `meta` map naming the group
pub const GROUP_KEY: &str = "group";

/// Group name and variables unwrapped from a `meta` output
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMeta {
    /// Group name
    pub name: String,
    /// Group variables, the `meta` map without its `group` key
    pub vars: Map<String, Value>,
}

/// Unwrap the `meta` output of a resolved output map
///
/// The returned vars are a fresh copy; `outputs` is never modified, so the
/// same inherited map can be extracted for any number of modules.
///
/// # Errors
/// Returns `MissingMetaOutput`, `NilMetaValue`, `MetaValueNotMap` or
/// `MissingGroupName` depending on which part of the metadata is absent or
/// malformed. `module` is attached to the error.
pub fn extract_group_meta(
    outputs: &BTreeMap<String, OutputState>,
    module: &ModulePath,
) -> Result<GroupMeta> {
    let meta = outputs
        .get(META_OUTPUT)
        .ok_or_else(|| ConvertError::MissingMetaOutput {
            module: module.clone(),
        })?;

    let value = match &meta.value {
        None | Some(Value::Null) => {
            return Err(ConvertError::NilMetaValue {
                module: module.clone(),
            });
        }
        Some(value) => value,
    };

    let map = value
        .as_object()
        .ok_or_else(|| ConvertError::MetaValueNotMap {
            module: module.clone(),
            found: json_kind(value),
        })?;

    let name = match map.get(GROUP_KEY) {
        Some(Value::String(s)) if s == META_KEY => {
            return Err(missing_group(
                module,
                &format!("group name {META_KEY} is reserved"),
            ));
        }
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::String(_)) => return Err(missing_group(module, "group is empty")),
        Some(other) => {
            return Err(missing_group(
                module,
                &format!("group is a {}, expected a string", json_kind(other)),
            ));
        }
        None => return Err(missing_group(module, "group key is absent")),
    };

    let mut vars = map.clone();
    vars.remove(GROUP_KEY);

    Ok(GroupMeta { name, vars })
}

fn missing_group(module: &ModulePath, reason: &str) -> ConvertError {
    ConvertError::MissingGroupName {
        module: module.clone(),
        reason: reason.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
