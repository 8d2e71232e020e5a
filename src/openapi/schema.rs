use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

pub const COMPONENTS_SCHEMAS_PREFIX: &str = "#/components/schemas/";

/// Extension listing the use-site type arguments of a generic entity ref.
pub const X_TYPE_ARGUMENTS: &str = "x-type-arguments";
/// Extension naming an unbound class type variable.
pub const X_TYPE_VARIABLE: &str = "x-type-variable";
/// Extension recording the constraint annotations a schema came from.
pub const X_VALIDATION_CONSTRAINTS: &str = "x-validation-constraints";
/// Extension carrying the source class of a component schema.
pub const X_CLASS_NAME: &str = "x-class-name";
/// Extension carrying the effective access rule of an operation.
pub const X_ACCESS: &str = "x-access";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// An OpenAPI 3.0 schema object, limited to the keywords the generator
/// emits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Schema {
    pub fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// The schema for values of unknown shape.
    pub fn any() -> Self {
        Self::of_type(SchemaType::Object)
    }

    pub fn reference_to(class_name: &str) -> Self {
        Self {
            reference: Some(format!("{COMPONENTS_SCHEMAS_PREFIX}{class_name}")),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable == Some(true)
    }

    /// Component name a `$ref` points at.
    pub fn referenced_component(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(COMPONENTS_SCHEMAS_PREFIX))
    }

    pub fn push_extension_item(&mut self, key: &str, item: Value) {
        match self.extensions.get_mut(key) {
            Some(Value::Array(items)) => items.push(item),
            _ => {
                self.extensions
                    .insert(key.to_string(), Value::Array(vec![item]));
            }
        }
    }

    /// Moves a `$ref` that carries siblings into an `anyOf` wrapper, since
    /// OpenAPI 3.0 ignores keywords next to `$ref`. Applied recursively.
    pub fn normalize(&mut self) {
        for child in self
            .items
            .iter_mut()
            .map(|b| b.as_mut())
            .chain(self.additional_properties.iter_mut().map(|b| b.as_mut()))
            .chain(self.properties.values_mut())
            .chain(self.all_of.iter_mut())
            .chain(self.any_of.iter_mut())
        {
            child.normalize();
        }
        if let Some(Value::Object(arguments)) = self.extensions.get_mut(X_TYPE_ARGUMENTS) {
            if let Some(Value::Array(all_of)) = arguments.get_mut("allOf") {
                for argument in all_of.iter_mut() {
                    if let Ok(mut schema) = serde_json::from_value::<Schema>(argument.clone()) {
                        schema.normalize();
                        if let Ok(value) = serde_json::to_value(&schema) {
                            *argument = value;
                        }
                    }
                }
            }
        }

        let has_siblings = self.nullable.is_some() || !self.extensions.is_empty();
        if self.reference.is_some() && has_siblings {
            let reference = Schema {
                reference: self.reference.take(),
                ..Schema::default()
            };
            self.any_of.insert(0, reference);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialization_skips_empty_keywords() {
        let schema = Schema::of_type(SchemaType::Integer).with_format("int64");
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": "integer", "format": "int64"})
        );
    }

    #[test]
    fn test_nullable_ref_is_wrapped() {
        let mut schema = Schema::reference_to("com.example.Foo");
        schema.nullable = Some(true);
        schema.normalize();
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "nullable": true,
                "anyOf": [{"$ref": "#/components/schemas/com.example.Foo"}]
            })
        );
    }

    #[test]
    fn test_plain_ref_is_untouched() {
        let mut schema = Schema::reference_to("com.example.Foo");
        schema.normalize();
        assert_eq!(schema.referenced_component(), Some("com.example.Foo"));
        assert!(schema.any_of.is_empty());
    }

    #[test]
    fn test_extensions_round_trip() {
        let value = json!({"type": "object", "x-type-variable": "T"});
        let schema: Schema = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(schema.extensions.get(X_TYPE_VARIABLE), Some(&json!("T")));
        assert_eq!(serde_json::to_value(&schema).unwrap(), value);
    }
}
