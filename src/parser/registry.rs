use super::error::{ParserError, Result};
use super::plugin::{CompositePlugin, Plugin};
use super::plugins::{
    self, EndpointExposedPlugin, EndpointPlugin, EntityPlugin, MethodParameterPlugin,
    MethodPlugin, NonnullPlugin, PropertyPlugin, TransferTypesPlugin, TypeSignaturePlugin,
    TypeVariablePlugin, ValidationConstraintsPlugin,
};
use crate::config::ParserConfig;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::debug;

pub type PluginFactory = fn() -> Box<dyn Plugin>;

/// Named plugin factories plus the list of plugins enabled by default.
///
/// Plugins are never loaded dynamically: applications register their
/// own factories next to the backbone ones and select them by name in
/// [`ParserConfig::plugins`].
#[derive(Clone, Default)]
pub struct PluginRegistry {
    factories: BTreeMap<&'static str, PluginFactory>,
    defaults: Vec<&'static str>,
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with every backbone plugin enabled by default.
    pub fn with_backbone() -> Self {
        let mut registry = Self::new();
        let backbone: [PluginFactory; 11] = [
            || Box::new(TypeVariablePlugin::default()),
            || Box::new(EndpointPlugin::default()),
            || Box::new(EndpointExposedPlugin::default()),
            || Box::new(TransferTypesPlugin::default()),
            || Box::new(MethodPlugin::default()),
            || Box::new(MethodParameterPlugin::default()),
            || Box::new(TypeSignaturePlugin::default()),
            || Box::new(EntityPlugin::default()),
            || Box::new(PropertyPlugin::default()),
            || Box::new(NonnullPlugin::default()),
            || Box::new(ValidationConstraintsPlugin::default()),
        ];
        for factory in backbone {
            registry.register_default(factory);
        }
        registry
    }

    /// Makes a plugin available under its own name. Returns the name.
    pub fn register(&mut self, factory: PluginFactory) -> &'static str {
        let name = factory().name();
        self.factories.insert(name, factory);
        name
    }

    /// Registers a plugin and enables it unless configuration disables it.
    pub fn register_default(&mut self, factory: PluginFactory) -> &'static str {
        let name = self.register(factory);
        if !self.defaults.contains(&name) {
            self.defaults.push(name);
        }
        name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    fn factory(&self, name: &str) -> Result<PluginFactory> {
        self.factories
            .get(name)
            .copied()
            .ok_or_else(|| ParserError::Config(format!("unknown plugin `{name}`")))
    }

    /// Instantiates the plugins selected by `config`, sorted by order.
    ///
    /// Defaults come first (minus `disable`, or none with
    /// `disableAllDefaults`), then `use` entries add plugins or override
    /// order and configuration. The top-level `nonnullAnnotations` and
    /// `transferTypes` settings configure their plugins unless a `use`
    /// entry already did.
    pub fn build(&self, config: &ParserConfig) -> Result<CompositePlugin> {
        let settings = &config.plugins;
        for name in &settings.disable {
            self.factory(name)?;
        }

        let mut selected: Vec<Box<dyn Plugin>> = Vec::new();
        if !settings.disable_all_defaults {
            for name in &self.defaults {
                if !settings.disable.iter().any(|d| d == name) {
                    selected.push((self.factory(name)?)());
                }
            }
        }

        let mut configured = Vec::new();
        for entry in &settings.use_plugins {
            let factory = self.factory(&entry.name)?;
            let index = match selected.iter().position(|p| p.name() == entry.name) {
                Some(index) => index,
                None => {
                    selected.push(factory());
                    selected.len() - 1
                }
            };
            let plugin = &mut selected[index];
            if let Some(order) = entry.order {
                plugin.set_order(order);
            }
            if let Some(configuration) = &entry.configuration {
                plugin.set_configuration(configuration.clone())?;
                configured.push(plugin.name());
            }
        }

        for plugin in &mut selected {
            if configured.contains(&plugin.name()) {
                continue;
            }
            match plugin.name() {
                plugins::nonnull::NAME => {
                    if let Some(annotations) = &config.nonnull_annotations {
                        plugin.set_configuration(json!({ "annotations": annotations }))?;
                    }
                }
                plugins::transfer_types::NAME if !config.transfer_types.is_empty() => {
                    plugin.set_configuration(json!({ "mappings": config.transfer_types }))?;
                }
                _ => {}
            }
        }

        selected.sort_by_key(|plugin| plugin.order());
        let composite = CompositePlugin::new(selected)?;
        debug!(plugins = ?composite.plugin_names(), "plugins selected");
        Ok(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PluginUse, PluginsConfig};
    use serde_json::Value;

    fn config(plugins: PluginsConfig) -> ParserConfig {
        ParserConfig::new("Endpoint", "EndpointExposed").with_plugins(plugins)
    }

    #[test]
    fn test_backbone_is_sorted_by_order() {
        let composite = PluginRegistry::with_backbone()
            .build(&config(PluginsConfig::default()))
            .unwrap();
        assert_eq!(
            composite.plugin_names(),
            vec![
                "type-variable",
                "endpoint",
                "endpoint-exposed",
                "transfer-types",
                "method",
                "method-parameter",
                "type-signature",
                "entity",
                "property",
                "nonnull",
                "validation-constraints",
            ]
        );
    }

    #[test]
    fn test_disable_and_unknown_plugins() {
        let registry = PluginRegistry::with_backbone();
        let composite = registry
            .build(&config(PluginsConfig {
                disable: vec!["validation-constraints".into(), "nonnull".into()],
                ..PluginsConfig::default()
            }))
            .unwrap();
        assert_eq!(composite.len(), 9);

        let unknown = registry.build(&config(PluginsConfig {
            disable: vec!["no-such-plugin".into()],
            ..PluginsConfig::default()
        }));
        assert!(matches!(unknown, Err(ParserError::Config(_))));
    }

    #[test]
    fn test_reordering_can_break_contracts() {
        let registry = PluginRegistry::with_backbone();
        let result = registry.build(&config(PluginsConfig {
            use_plugins: vec![PluginUse {
                name: "nonnull".into(),
                order: Some(40),
                configuration: None,
            }],
            ..PluginsConfig::default()
        }));
        assert!(matches!(
            result,
            Err(ParserError::PluginOrder { ref plugin, ref other, .. })
                if plugin == "nonnull" && other == "type-signature"
        ));
    }

    #[test]
    fn test_top_level_settings_configure_plugins() {
        let mut settings = config(PluginsConfig::default());
        settings.nonnull_annotations = Some(vec!["Required".into()]);
        settings
            .transfer_types
            .insert("com.example.Money".into(), "java.math.BigDecimal".into());
        let composite = PluginRegistry::with_backbone().build(&settings).unwrap();
        assert_eq!(composite.len(), 11);

        let nonnull = composite.plugin("nonnull").unwrap();
        assert_eq!(
            nonnull.configuration().unwrap()["annotations"],
            Value::from(vec!["Required"])
        );
        let transfer = composite.plugin("transfer-types").unwrap();
        assert_eq!(
            transfer.configuration().unwrap()["mappings"]["com.example.Money"],
            "java.math.BigDecimal"
        );
    }

    #[test]
    fn test_bad_configuration_is_rejected() {
        let registry = PluginRegistry::with_backbone();
        let result = registry.build(&config(PluginsConfig {
            use_plugins: vec![PluginUse {
                name: "method".into(),
                order: None,
                configuration: Some(json!({ "anything": true })),
            }],
            ..PluginsConfig::default()
        }));
        assert!(matches!(result, Err(ParserError::Config(_))));
    }
}
