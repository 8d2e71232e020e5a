use crate::model::AnnotationInfoModel;
use crate::parser::node::NodeSource;
use crate::parser::{NodePath, ParserError, Plugin, Result, SharedStorage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NAME: &str = "nonnull";

const DEFAULT_ANNOTATIONS: &[&str] = &["Nonnull", "NonNull", "NotNull"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonnullConfiguration {
    pub annotations: Vec<String>,
}

impl Default for NonnullConfiguration {
    fn default() -> Self {
        Self {
            annotations: DEFAULT_ANNOTATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Clears `nullable` on schemas whose signature, or the declaration that
/// owns it, carries a not-null annotation. Optionals stay nullable.
///
/// Works on exit so that the schema a child signature substituted (type
/// variables, type arguments) is the one being marked.
pub struct NonnullPlugin {
    order: i32,
    configuration: NonnullConfiguration,
}

impl Default for NonnullPlugin {
    fn default() -> Self {
        Self {
            order: 100,
            configuration: NonnullConfiguration::default(),
        }
    }
}

impl NonnullPlugin {
    fn is_marker(&self, annotation: &AnnotationInfoModel) -> bool {
        self.configuration
            .annotations
            .iter()
            .any(|name| annotation.matches(name))
    }
}

impl Plugin for NonnullPlugin {
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
            self.configuration = NonnullConfiguration::default();
            return Ok(());
        }
        self.configuration = serde_json::from_value(configuration)
            .map_err(|e| ParserError::Config(format!("plugin `{NAME}`: {e}")))?;
        Ok(())
    }

    fn run_after(&self) -> &'static [&'static str] {
        &[super::signature::NAME]
    }

    fn exit(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::TypeSignature(signature) = path.source() else {
            return Ok(());
        };
        if signature.is_optional() || !path.is_attachable() {
            return Ok(());
        }
        let owner_annotations = path
            .parent()
            .map(|parent| match parent.source() {
                NodeSource::Method(method) => method.annotations(),
                NodeSource::MethodParameter(parameter) => parameter.annotations(),
                NodeSource::Property(property) => property.annotations(),
                _ => &[],
            })
            .unwrap_or_default();

        let marked = signature
            .annotations()
            .iter()
            .chain(owner_annotations)
            .any(|annotation| self.is_marker(annotation));
        if marked {
            path.node().with_schema_mut(|schema| schema.nullable = None);
        }
        Ok(())
    }
}
