//! Inventory assembly

use tracing::{debug, info, instrument, trace};

use crate::error::{ConvertError, Result};
use crate::inventory::Inventory;
use crate::meta::{GroupMeta, META_OUTPUT, extract_group_meta};
use crate::options::ConvertOptions;
use crate::resolve::OutputResolver;
use crate::state::{ModuleState, State};

/// Builds an [`Inventory`] from a state document
///
/// One pass over the modules in document order. Every validation failure
/// aborts the whole conversion; only resources the classifier rejects are
/// skipped.
#[derive(Debug, Clone, Default)]
pub struct InventoryBuilder {
    options: ConvertOptions,
}

impl InventoryBuilder {
    /// Create a builder with the given options
    #[must_use]
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Options in use
    #[must_use]
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `state` into an inventory
    ///
    /// # Errors
    /// Returns the first validation failure encountered; see [`ConvertError`].
    #[instrument(skip_all, fields(modules = state.modules.len()))]
    pub fn build(&self, state: &State) -> Result<Inventory> {
        if state.modules.is_empty() {
            return Err(ConvertError::EmptyModules);
        }

        let resolver = OutputResolver::new(&state.modules);
        let multi_module = state.modules.len() > 1;
        let mut inventory = Inventory::new(self.options.project.as_deref());

        for (index, module) in state.modules.iter().enumerate() {
            if module.path.is_empty() {
                return Err(ConvertError::EmptyPath { index });
            }

            if multi_module && module.path.is_root() {
                trace!(module = %module.path, "skipping root module");
                continue;
            }

            let outputs = resolver
                .resolve(module)
                .filter(|outputs| outputs.contains_key(META_OUTPUT))
                .ok_or_else(|| ConvertError::MissingMetaInModule {
                    module: module.path.clone(),
                })?;

            let meta = extract_group_meta(outputs, &module.path)?;

            if module.resources.is_empty() {
                return Err(ConvertError::EmptyResources {
                    module: module.path.clone(),
                });
            }

            self.scan_module(&mut inventory, module, meta)?;
        }

        info!(
            groups = inventory.group_names().len(),
            hosts = inventory.host_count(),
            "inventory assembled"
        );

        Ok(inventory)
    }

    fn scan_module(
        &self,
        inventory: &mut Inventory,
        module: &ModuleState,
        meta: GroupMeta,
    ) -> Result<()> {
        let GroupMeta { name: group, vars } = meta;
        let mut vars = Some(vars);

        for (resource_name, resource) in &module.resources {
            if !self.options.classifier.is_host(resource_name) {
                trace!(resource = %resource_name, "not a host, skipping");
                continue;
            }

            debug!(module = %module.path, resource = %resource_name, group = %group, "scanning resource");

            if let Some(vars) = vars.take()
                && inventory.ensure_group(&group, vars)
            {
                debug!(group = %group, "created group");
            }

            let primary = resource
                .primary
                .as_ref()
                .ok_or_else(|| ConvertError::MissingPrimary {
                    module: module.path.clone(),
                    resource: resource_name.clone(),
                    group: group.clone(),
                })?;

            let attributes =
                primary
                    .attributes
                    .as_ref()
                    .ok_or_else(|| ConvertError::MissingAttributes {
                        module: module.path.clone(),
                        resource: resource_name.clone(),
                        group: group.clone(),
                    })?;

            let host = self
                .options
                .extractor
                .extract(attributes, resource_name, &group)?;

            inventory.add_host(&group, host);
        }

        Ok(())
    }
}

/// Convert `state` with `options`
///
/// # Errors
/// Returns the first validation failure encountered; see [`ConvertError`].
pub fn convert(state: &State, options: &ConvertOptions) -> Result<Inventory> {
    InventoryBuilder::new(options.clone()).build(state)
}
