use crate::parser::node::{Node, NodeRef, NodeSource};
use crate::parser::{ClassMappers, NodePath, ParserError, Plugin, Result, SharedStorage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const NAME: &str = "transfer-types";

/// Classes that travel as another type on the wire.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    ("java.util.UUID", "java.lang.String"),
    ("java.net.URI", "java.lang.String"),
    ("java.net.URL", "java.lang.String"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferTypesConfiguration {
    #[serde(default)]
    pub mappings: BTreeMap<String, String>,
}

impl TransferTypesConfiguration {
    /// The built-in mappings followed by the configured ones, which win.
    pub fn class_mappers(&self) -> ClassMappers {
        let mut mappers = ClassMappers::default();
        for (from, to) in DEFAULT_MAPPINGS {
            mappers.add(*from, *to);
        }
        for (from, to) in &self.mappings {
            mappers.add(from.as_str(), to.as_str());
        }
        mappers
    }
}

/// Installs class mappers for the run and rewrites class references to
/// their transfer type before they are scanned.
pub struct TransferTypesPlugin {
    order: i32,
    configuration: TransferTypesConfiguration,
}

impl Default for TransferTypesPlugin {
    fn default() -> Self {
        Self {
            order: 15,
            configuration: TransferTypesConfiguration::default(),
        }
    }
}

impl Plugin for TransferTypesPlugin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn configuration(&self) -> Option<Value> {
        serde_json::to_value(&self.configuration).ok()
    }

    fn set_configuration(&mut self, configuration: Value) -> Result<()> {
        if configuration.is_null() {
            self.configuration = TransferTypesConfiguration::default();
            return Ok(());
        }
        self.configuration = serde_json::from_value(configuration)
            .map_err(|e| ParserError::Config(format!("plugin `{NAME}`: {e}")))?;
        Ok(())
    }

    fn run_after(&self) -> &'static [&'static str] {
        &[super::exposed::NAME]
    }

    fn enter(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        if !matches!(path.source(), NodeSource::Root(_)) {
            return Ok(());
        }
        for (from, to) in self.configuration.class_mappers().iter() {
            storage.class_mappers.add(from, to);
        }
        Ok(())
    }

    fn resolve(
        &mut self,
        node: NodeRef,
        _parent: &NodePath,
        storage: &mut SharedStorage,
    ) -> Result<NodeRef> {
        let NodeSource::TypeSignature(signature) = node.source() else {
            return Ok(node);
        };
        let Some(target) = signature
            .class_name()
            .and_then(|name| storage.class_mappers.map(name))
        else {
            return Ok(node);
        };
        Ok(Node::new(NodeSource::TypeSignature(
            signature.with_class_name(target),
        )))
    }
}
