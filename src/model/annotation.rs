use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// An annotation attached to a class, member, parameter or type use.
///
/// Descriptors may spell an annotation either as a bare name
/// (`"Nonnull"`, `"jakarta.annotation.security.DenyAll"`) or as an object
/// carrying attribute values:
///
/// ```yaml
/// - name: RolesAllowed
///   values:
///     value: [admin, auditor]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "AnnotationRepr")]
pub struct AnnotationInfoModel {
    name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    values: BTreeMap<String, ValueKey>,
}

/// Attribute value wrapper so annotations can be hashed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueKey(pub Value);

impl Eq for ValueKey {}

impl std::hash::Hash for ValueKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_string().hash(state);
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnnotationRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        values: BTreeMap<String, Value>,
    },
}

impl From<AnnotationRepr> for AnnotationInfoModel {
    fn from(repr: AnnotationRepr) -> Self {
        match repr {
            AnnotationRepr::Name(name) => AnnotationInfoModel::new(name),
            AnnotationRepr::Full { name, values } => {
                let mut annotation = AnnotationInfoModel::new(name);
                for (key, value) in values {
                    annotation = annotation.with_value(key, value);
                }
                annotation
            }
        }
    }
}

impl AnnotationInfoModel {
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: name.trim_start_matches('@').to_string(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), ValueKey(value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Matches by fully-qualified name, or by simple name when either side
    /// is written without a package.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim_start_matches('@');
        if self.name == name {
            return true;
        }
        let unqualified = !self.name.contains('.') || !name.contains('.');
        unqualified && self.simple_name() == simple_name(name)
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key).map(|v| &v.0)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), &v.0))
    }

    /// String attribute; empty strings count as absent.
    pub fn string_value(&self, key: &str) -> Option<&str> {
        self.value(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Attribute that may be a single string or an array of strings.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.value(key) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn bool_value(&self, key: &str) -> Option<bool> {
        self.value(key).and_then(Value::as_bool)
    }
}

/// Finds the first annotation matching `name`.
pub fn find_annotation<'a>(
    annotations: &'a [AnnotationInfoModel],
    name: &str,
) -> Option<&'a AnnotationInfoModel> {
    annotations.iter().find(|a| a.matches(name))
}

pub fn has_annotation(annotations: &[AnnotationInfoModel], name: &str) -> bool {
    find_annotation(annotations, name).is_some()
}

/// Last dotted (or `$`-nested) segment of a class or annotation name.
pub fn simple_name(name: &str) -> &str {
    let tail = name.rsplit('.').next().unwrap_or(name);
    tail.rsplit('$').next().unwrap_or(tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matches_simple_and_qualified() {
        let a = AnnotationInfoModel::new("jakarta.annotation.security.DenyAll");
        assert!(a.matches("DenyAll"));
        assert!(a.matches("jakarta.annotation.security.DenyAll"));
        assert!(!a.matches("javax.annotation.security.DenyAll"));

        let b = AnnotationInfoModel::new("@Nonnull");
        assert_eq!(b.name(), "Nonnull");
        assert!(b.matches("javax.annotation.Nonnull"));
    }

    #[test]
    fn test_deserialize_both_forms() {
        let parsed: Vec<AnnotationInfoModel> = serde_json::from_value(json!([
            "Nonnull",
            { "name": "RolesAllowed", "values": { "value": ["admin", "auditor"] } }
        ]))
        .unwrap();
        assert_eq!(parsed[0].name(), "Nonnull");
        assert_eq!(parsed[1].string_list("value"), vec!["admin", "auditor"]);
    }

    #[test]
    fn test_simple_name_of_nested_class() {
        assert_eq!(simple_name("com.example.Outer$Inner"), "Inner");
        assert_eq!(simple_name("Plain"), "Plain");
    }
}
