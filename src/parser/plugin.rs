use super::dependencies::NodeDependencies;
use super::error::{ParserError, Result};
use super::node::NodeRef;
use super::path::NodePath;
use super::storage::SharedStorage;
use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

/// A step of the parser walk.
///
/// Callbacks receive the run's [`SharedStorage`] explicitly. Everything
/// but [`Plugin::name`] and the order accessors has a no-op default, so a
/// plugin only implements the hooks it cares about.
pub trait Plugin {
    /// Unique, stable name used in configuration and ordering contracts.
    fn name(&self) -> &'static str;

    fn order(&self) -> i32;

    fn set_order(&mut self, order: i32);

    fn configuration(&self) -> Option<Value> {
        None
    }

    /// Applies a configuration object. Plugins without settings accept
    /// only `null`.
    fn set_configuration(&mut self, configuration: Value) -> Result<()> {
        if configuration.is_null() {
            Ok(())
        } else {
            Err(ParserError::Config(format!(
                "plugin `{}` takes no configuration",
                self.name()
            )))
        }
    }

    /// Plugins that must come earlier in the composite, when present.
    fn run_after(&self) -> &'static [&'static str] {
        &[]
    }

    /// Plugins that must come later in the composite, when present.
    fn run_before(&self) -> &'static [&'static str] {
        &[]
    }

    /// May swap a dependency node before a path is built for it.
    fn resolve(
        &mut self,
        node: NodeRef,
        _parent: &NodePath,
        _storage: &mut SharedStorage,
    ) -> Result<NodeRef> {
        Ok(node)
    }

    /// Adds the dependencies of `dependencies.node()`.
    fn scan(
        &mut self,
        dependencies: NodeDependencies,
        _storage: &mut SharedStorage,
    ) -> Result<NodeDependencies> {
        Ok(dependencies)
    }

    fn enter(&mut self, _path: &NodePath, _storage: &mut SharedStorage) -> Result<()> {
        Ok(())
    }

    fn exit(&mut self, _path: &NodePath, _storage: &mut SharedStorage) -> Result<()> {
        Ok(())
    }
}

/// Runs a list of plugins as one.
///
/// `enter`, `scan` and `resolve` go through the list in order, `exit` in
/// reverse, so a later plugin sees what earlier ones built on the way in
/// and gets the last word before they finalize on the way out.
pub struct CompositePlugin {
    plugins: Vec<Box<dyn Plugin>>,
    order: i32,
}

impl CompositePlugin {
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Result<Self> {
        verify_plugins_order(&plugins)?;
        Ok(Self { plugins, order: 0 })
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn plugin(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Checks every `run_after` / `run_before` contract against list order.
/// Plugins named in a contract but absent from the list are ignored.
pub fn verify_plugins_order(plugins: &[Box<dyn Plugin>]) -> Result<()> {
    let positions: HashMap<&str, usize> = plugins
        .iter()
        .enumerate()
        .map(|(index, plugin)| (plugin.name(), index))
        .collect();

    for (index, plugin) in plugins.iter().enumerate() {
        for other in plugin.run_after() {
            if positions.get(other).is_some_and(|&position| position > index) {
                return Err(ParserError::PluginOrder {
                    plugin: plugin.name().to_string(),
                    other: other.to_string(),
                    relation: "after",
                });
            }
        }
        for other in plugin.run_before() {
            if positions.get(other).is_some_and(|&position| position < index) {
                return Err(ParserError::PluginOrder {
                    plugin: plugin.name().to_string(),
                    other: other.to_string(),
                    relation: "before",
                });
            }
        }
    }
    Ok(())
}

impl Plugin for CompositePlugin {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn resolve(
        &mut self,
        node: NodeRef,
        parent: &NodePath,
        storage: &mut SharedStorage,
    ) -> Result<NodeRef> {
        let mut node = node;
        for plugin in &mut self.plugins {
            node = plugin.resolve(node, parent, storage)?;
        }
        Ok(node)
    }

    fn scan(
        &mut self,
        dependencies: NodeDependencies,
        storage: &mut SharedStorage,
    ) -> Result<NodeDependencies> {
        let mut dependencies = dependencies;
        for plugin in &mut self.plugins {
            dependencies = plugin.scan(dependencies, storage)?;
        }
        Ok(dependencies)
    }

    fn enter(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        for plugin in &mut self.plugins {
            trace!(plugin = plugin.name(), node = %path.source(), "enter");
            plugin.enter(path, storage)?;
        }
        Ok(())
    }

    fn exit(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        for plugin in self.plugins.iter_mut().rev() {
            trace!(plugin = plugin.name(), node = %path.source(), "exit");
            plugin.exit(path, storage)?;
        }
        Ok(())
    }
}
