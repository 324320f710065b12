//! Output inheritance along the module tree

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::state::{ModuleState, OutputState};

/// Resolves the effective outputs of a module
///
/// A module that declares no outputs inherits those of its nearest ancestor
/// that does. The resolver indexes every module by path once, so each lookup
/// costs one hash lookup per ancestor level.
#[derive(Debug)]
pub struct OutputResolver<'a> {
    by_path: HashMap<&'a [String], &'a ModuleState>,
    single_module: bool,
}

impl<'a> OutputResolver<'a> {
    /// Index `modules` by path
    ///
    /// When several modules share a path the last one wins.
    #[must_use]
    pub fn new(modules: &'a [ModuleState]) -> Self {
        let by_path = modules
            .iter()
            .map(|m| (m.path.segments(), m))
            .collect();

        Self {
            by_path,
            single_module: modules.len() == 1,
        }
    }

    /// Effective outputs for `module`
    ///
    /// Returns the outputs of the nearest module, starting with `module`
    /// itself, that declares any. A root that is the only module resolves to
    /// its own outputs even when they are empty. `None` means no ancestor
    /// declares outputs.
    #[must_use]
    pub fn resolve(&self, module: &'a ModuleState) -> Option<&'a BTreeMap<String, OutputState>> {
        if self.single_module && module.path.is_root() {
            return Some(&module.outputs);
        }

        let mut current = module;
        loop {
            if !current.outputs.is_empty() {
                return Some(&current.outputs);
            }

            let parent = current.path.parent()?;
            trace!(module = %current.path, parent = ?parent, "inheriting outputs from parent");

            current = match self.by_path.get(parent).copied() {
                Some(m) => m,
                None => {
                    trace!(parent = ?parent, "parent module not found");
                    return None;
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::ModulePath;

    fn meta(group: &str) -> OutputState {
        OutputState::new(json!({ "group": group }))
    }

    #[test]
    fn test_own_outputs_win() {
        let modules = vec![
            ModuleState::new(["root"]).with_output("meta", meta("parent")),
            ModuleState::new(["root", "a"]).with_output("meta", meta("child")),
        ];
        let resolver = OutputResolver::new(&modules);

        let outputs = resolver.resolve(&modules[1]).unwrap();
        assert_eq!(outputs["meta"].value, Some(json!({"group": "child"})));
    }

    #[test]
    fn test_inherits_across_levels() {
        let modules = vec![
            ModuleState::new(["root"]),
            ModuleState::new(["root", "a"]).with_output("meta", meta("a")),
            ModuleState::new(["root", "a", "b"]),
            ModuleState::new(["root", "a", "b", "c"]),
        ];
        let resolver = OutputResolver::new(&modules);

        let outputs = resolver.resolve(&modules[3]).unwrap();
        assert_eq!(outputs["meta"].value, Some(json!({"group": "a"})));
    }

    #[test]
    fn test_missing_parent_yields_none() {
        let modules = vec![
            ModuleState::new(["root"]),
            ModuleState::new(["root", "x", "y"]),
        ];
        let resolver = OutputResolver::new(&modules);
        assert!(resolver.resolve(&modules[1]).is_none());
    }

    #[test]
    fn test_empty_root_chain_yields_none() {
        let modules = vec![ModuleState::new(["root"]), ModuleState::new(["root", "a"])];
        let resolver = OutputResolver::new(&modules);
        assert!(resolver.resolve(&modules[1]).is_none());
    }

    #[test]
    fn test_single_root_uses_own_outputs() {
        let modules = vec![ModuleState::new(["root"])];
        let resolver = OutputResolver::new(&modules);
        let outputs = resolver.resolve(&modules[0]).unwrap();
        assert!(outputs.is_empty());
    }

    #[test]
    fn test_duplicate_path_last_wins() {
        let modules = vec![
            ModuleState::new(["root"]).with_output("meta", meta("first")),
            ModuleState::new(["root"]).with_output("meta", meta("second")),
            ModuleState::new(["root", "a"]),
        ];
        let resolver = OutputResolver::new(&modules);
        let outputs = resolver.resolve(&modules[2]).unwrap();
        assert_eq!(outputs["meta"].value, Some(json!({"group": "second"})));
    }

    #[test]
    fn test_lookup_is_structural() {
        // same joined text, different segments
        let modules = vec![
            ModuleState::new(ModulePath::new(["root.a"])).with_output("meta", meta("wrong")),
            ModuleState::new(["root", "a", "b"]),
        ];
        let resolver = OutputResolver::new(&modules);
        assert!(resolver.resolve(&modules[1]).is_none());
    }
}
