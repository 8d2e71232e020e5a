use crate::model::AnnotationInfoModel;
use crate::openapi::{Schema, SchemaType, X_VALIDATION_CONSTRAINTS};
use crate::parser::node::NodeSource;
use crate::parser::{NodePath, Plugin, Result, SharedStorage};
use serde_json::{json, Map, Number, Value};

pub const NAME: &str = "validation-constraints";

/// Bean-validation annotations this plugin understands, by simple name.
const CONSTRAINTS: &[&str] = &[
    "Min",
    "Max",
    "DecimalMin",
    "DecimalMax",
    "Size",
    "NotBlank",
    "NotEmpty",
    "NotNull",
    "Pattern",
    "Email",
    "Positive",
    "PositiveOrZero",
    "Negative",
    "NegativeOrZero",
];

/// Maps constraint annotations on properties and parameters onto JSON
/// Schema keywords, and lists them under `x-validation-constraints`.
///
/// `Positive` and `Negative` need exclusive bounds, which OpenAPI 3.0
/// spells differently from JSON Schema; they are only recorded in the
/// extension and turned into bounds by the runtime validator.
pub struct ValidationConstraintsPlugin {
    order: i32,
}

impl Default for ValidationConstraintsPlugin {
    fn default() -> Self {
        Self { order: 110 }
    }
}

impl Plugin for ValidationConstraintsPlugin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn run_after(&self) -> &'static [&'static str] {
        &[super::signature::NAME]
    }

    fn exit(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::TypeSignature(signature) = path.source() else {
            return Ok(());
        };
        if !path.is_attachable() {
            return Ok(());
        }
        let owner_annotations = match path.parent().map(NodePath::source) {
            Some(NodeSource::Property(property)) => property.annotations(),
            Some(NodeSource::MethodParameter(parameter)) => parameter.annotations(),
            _ => return Ok(()),
        };

        let annotations: Vec<&AnnotationInfoModel> = owner_annotations
            .iter()
            .chain(signature.annotations())
            .filter(|a| CONSTRAINTS.contains(&a.simple_name()))
            .collect();
        if annotations.is_empty() {
            return Ok(());
        }
        path.node().with_schema_mut(|schema| {
            for annotation in annotations {
                apply(schema, annotation);
            }
        });
        Ok(())
    }
}

fn apply(schema: &mut Schema, annotation: &AnnotationInfoModel) {
    let is_array = schema.schema_type == Some(SchemaType::Array);
    match annotation.simple_name() {
        "Min" | "DecimalMin" => schema.minimum = annotation.value("value").and_then(number),
        "Max" | "DecimalMax" => schema.maximum = annotation.value("value").and_then(number),
        "PositiveOrZero" => schema.minimum = Some(Number::from(0)),
        "NegativeOrZero" => schema.maximum = Some(Number::from(0)),
        "Size" => {
            let min = annotation.value("min").and_then(Value::as_u64);
            let max = annotation.value("max").and_then(Value::as_u64);
            if is_array {
                schema.min_items = min.or(schema.min_items);
                schema.max_items = max.or(schema.max_items);
            } else if schema.schema_type == Some(SchemaType::String) {
                schema.min_length = min.or(schema.min_length);
                schema.max_length = max.or(schema.max_length);
            }
        }
        "NotBlank" => {
            schema.min_length = Some(1);
            schema.pattern = Some(r"\S".to_string());
        }
        "NotEmpty" => {
            if is_array {
                schema.min_items = Some(1);
            } else {
                schema.min_length = Some(1);
            }
        }
        "Pattern" => {
            if let Some(regexp) = annotation.string_value("regexp") {
                schema.pattern = Some(regexp.to_string());
            }
        }
        "Email" => schema.format = Some("email".to_string()),
        _ => {}
    }

    let attributes: Map<String, Value> = annotation
        .values()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    schema.push_extension_item(
        X_VALIDATION_CONSTRAINTS,
        json!({
            "simpleName": annotation.simple_name(),
            "attributes": attributes,
        }),
    );
}

/// Annotation bounds come as numbers or as decimal strings.
fn number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(number) => Some(number.clone()),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map(Number::from)
            .ok()
            .or_else(|| text.trim().parse::<f64>().ok().and_then(Number::from_f64)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_all(mut schema: Schema, annotations: &[AnnotationInfoModel]) -> Value {
        for annotation in annotations {
            apply(&mut schema, annotation);
        }
        serde_json::to_value(schema).unwrap()
    }

    #[test]
    fn test_string_constraints() {
        let value = apply_all(
            Schema::of_type(SchemaType::String),
            &[
                AnnotationInfoModel::new("Size")
                    .with_value("min", json!(2))
                    .with_value("max", json!(8)),
                AnnotationInfoModel::new("jakarta.validation.constraints.Pattern")
                    .with_value("regexp", json!("^[a-z]+$")),
            ],
        );
        assert_eq!(value["minLength"], 2);
        assert_eq!(value["maxLength"], 8);
        assert_eq!(value["pattern"], "^[a-z]+$");
        assert_eq!(value[X_VALIDATION_CONSTRAINTS][1]["simpleName"], "Pattern");
        assert_eq!(
            value[X_VALIDATION_CONSTRAINTS][0]["attributes"],
            json!({"max": 8, "min": 2})
        );
    }

    #[test]
    fn test_numeric_and_collection_constraints() {
        let number = apply_all(
            Schema::of_type(SchemaType::Number),
            &[
                AnnotationInfoModel::new("DecimalMin").with_value("value", json!("0.5")),
                AnnotationInfoModel::new("Max").with_value("value", json!(10)),
                AnnotationInfoModel::new("Positive"),
            ],
        );
        assert_eq!(number["minimum"], 0.5);
        assert_eq!(number["maximum"], 10);
        assert!(number.get("exclusiveMinimum").is_none());
        assert_eq!(number[X_VALIDATION_CONSTRAINTS][2]["simpleName"], "Positive");

        let list = apply_all(
            Schema::of_type(SchemaType::Array),
            &[AnnotationInfoModel::new("NotEmpty")],
        );
        assert_eq!(list["minItems"], 1);
        assert!(list.get("minLength").is_none());
    }
}
