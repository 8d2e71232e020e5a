//! Serialized-property introspection.
//!
//! Follows the inclusion rules of the JSON mapper used by the services
//! being described: any non-static, non-transient field, public `getX()` /
//! `isX()` accessors, and record components. Mapper annotations
//! (`JsonIgnore`, `JsonProperty`, `JsonIgnoreProperties`,
//! `JsonIncludeProperties`, `JsonIgnoreType`) adjust the result.

use super::annotation::{self, AnnotationInfoModel};
use super::class::ClassInfoModel;
use super::descriptor::BaseType;
use super::member::{FieldInfoModel, MethodInfoModel};
use super::signature::{SignatureKind, SignatureModel};
use super::world::ClassWorld;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub const JSON_IGNORE: &str = "JsonIgnore";
pub const JSON_PROPERTY: &str = "JsonProperty";
pub const JSON_IGNORE_PROPERTIES: &str = "JsonIgnoreProperties";
pub const JSON_INCLUDE_PROPERTIES: &str = "JsonIncludeProperties";
pub const JSON_IGNORE_TYPE: &str = "JsonIgnoreType";

/// A serialized property of an entity class.
#[derive(Clone)]
pub struct PropertyModel(Arc<PropertyInner>);

struct PropertyInner {
    owner: String,
    name: String,
    signature: SignatureModel,
    annotations: Vec<AnnotationInfoModel>,
    field: Option<FieldInfoModel>,
    getter: Option<MethodInfoModel>,
    type_ignored: bool,
}

impl PropertyModel {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn owner(&self) -> &str {
        &self.0.owner
    }

    /// The accessor's result type when there is a getter, else the field's.
    pub fn signature(&self) -> &SignatureModel {
        &self.0.signature
    }

    /// Getter annotations followed by field annotations.
    pub fn annotations(&self) -> &[AnnotationInfoModel] {
        &self.0.annotations
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        annotation::has_annotation(&self.0.annotations, name)
    }

    pub fn field(&self) -> Option<&FieldInfoModel> {
        self.0.field.as_ref()
    }

    pub fn getter(&self) -> Option<&MethodInfoModel> {
        self.0.getter.as_ref()
    }

    /// The property's class is marked as never serialized.
    pub fn is_type_ignored(&self) -> bool {
        self.0.type_ignored
    }
}

impl PartialEq for PropertyModel {
    fn eq(&self, other: &Self) -> bool {
        self.0.owner == other.0.owner && self.0.name == other.0.name
    }
}

impl Eq for PropertyModel {}

impl Hash for PropertyModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.owner.hash(state);
        self.0.name.hash(state);
    }
}

impl fmt::Debug for PropertyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyModel({}.{})", self.owner(), self.name())
    }
}

struct Candidate {
    implicit_name: String,
    field: Option<FieldInfoModel>,
    getter: Option<MethodInfoModel>,
    has_setter: bool,
}

impl Candidate {
    fn annotations(&self) -> Vec<AnnotationInfoModel> {
        self.getter
            .iter()
            .flat_map(|g| g.annotations().iter().cloned())
            .chain(self.field.iter().flat_map(|f| f.annotations().iter().cloned()))
            .collect()
    }
}

/// Collects the properties declared by `class` itself, in declaration
/// order. Properties inherited from a described superclass are left out.
pub fn collect_properties(class: &ClassInfoModel, world: &ClassWorld) -> Vec<PropertyModel> {
    if class.is_enum() {
        return Vec::new();
    }

    let inherited = inherited_property_names(class, world);
    let ignored_names: BTreeSet<String> = class
        .find_annotation(JSON_IGNORE_PROPERTIES)
        .map(|a| a.string_list("value").into_iter().collect())
        .unwrap_or_default();
    let included_names: Option<BTreeSet<String>> = class
        .find_annotation(JSON_INCLUDE_PROPERTIES)
        .map(|a| a.string_list("value").into_iter().collect());

    let mut properties = Vec::new();
    for candidate in candidates(class) {
        let annotations = candidate.annotations();
        if annotation::has_annotation(&annotations, JSON_IGNORE) {
            continue;
        }
        if candidate.field.is_none() && !candidate.has_setter && !class.is_record() {
            continue;
        }
        let name = annotation::find_annotation(&annotations, JSON_PROPERTY)
            .and_then(|a| a.string_value("value"))
            .unwrap_or(candidate.implicit_name.as_str())
            .to_string();
        if inherited.contains(&name) || inherited.contains(&candidate.implicit_name) {
            continue;
        }
        if ignored_names.contains(&name) {
            continue;
        }
        if let Some(included) = &included_names {
            if !included.contains(&name) {
                continue;
            }
        }

        let signature = match (&candidate.getter, &candidate.field) {
            (Some(getter), _) => getter.result().clone(),
            (None, Some(field)) => field.signature().clone(),
            (None, None) => continue,
        };
        let type_ignored = signature
            .class_name()
            .and_then(|n| world.get(n))
            .is_some_and(|c| c.has_annotation(JSON_IGNORE_TYPE));

        properties.push(PropertyModel(Arc::new(PropertyInner {
            owner: class.name().to_string(),
            name,
            signature,
            annotations,
            field: candidate.field,
            getter: candidate.getter,
            type_ignored,
        })));
    }
    properties
}

fn candidates(class: &ClassInfoModel) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = class
        .fields()
        .iter()
        .filter(|f| !f.is_static() && !f.is_transient())
        .map(|f| Candidate {
            implicit_name: f.name().to_string(),
            field: Some(f.clone()),
            getter: None,
            has_setter: false,
        })
        .collect();

    let setters: HashSet<String> = class
        .methods()
        .iter()
        .filter(|m| m.is_public() && !m.is_static() && m.parameters().len() == 1)
        .filter_map(|m| accessor_name(m.name(), "set"))
        .collect();

    for method in class.methods() {
        let Some(name) = getter_property_name(method) else {
            continue;
        };
        match candidates.iter_mut().find(|c| c.implicit_name == name) {
            Some(existing) => existing.getter = Some(method.clone()),
            None => candidates.push(Candidate {
                implicit_name: name,
                field: None,
                getter: Some(method.clone()),
                has_setter: false,
            }),
        }
    }

    for candidate in &mut candidates {
        candidate.has_setter = setters.contains(&candidate.implicit_name);
    }
    candidates
}

fn getter_property_name(method: &MethodInfoModel) -> Option<String> {
    if !method.is_public()
        || method.is_static()
        || !method.parameters().is_empty()
        || method.result().is_void()
    {
        return None;
    }
    if let Some(name) = accessor_name(method.name(), "get") {
        return Some(name);
    }
    let is_boolean = matches!(
        method.result().kind(),
        SignatureKind::Base {
            base: BaseType::Boolean,
            ..
        }
    );
    if is_boolean {
        return accessor_name(method.name(), "is");
    }
    None
}

/// `getURLValue` -> `urlvalue`, `getName` -> `name`: leading upper-case
/// letters are lowered.
fn accessor_name(method: &str, prefix: &str) -> Option<String> {
    let rest = method.strip_prefix(prefix)?;
    if !rest.chars().next().is_some_and(char::is_uppercase) {
        return None;
    }
    let mut name = String::with_capacity(rest.len());
    let mut leading = true;
    for c in rest.chars() {
        if leading && c.is_uppercase() {
            name.extend(c.to_lowercase());
        } else {
            leading = false;
            name.push(c);
        }
    }
    Some(name)
}

fn inherited_property_names(class: &ClassInfoModel, world: &ClassWorld) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut seen = HashSet::new();
    let mut current = world.superclass_of(class);
    while let Some(superclass) = current {
        if !seen.insert(superclass.name().to_string()) {
            break;
        }
        for candidate in candidates(superclass) {
            names.insert(candidate.implicit_name);
        }
        current = world.superclass_of(superclass);
    }
    names
}
