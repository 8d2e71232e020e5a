use super::annotation::AnnotationInfoModel;
use super::class::ClassInfoModel;
use super::descriptor::{BaseType, TypeDescriptor, TypeParameterDescriptor, Wildcard};
use super::jdk;
use super::world::ClassWorld;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type use inside a class model.
///
/// Signatures have identity semantics: two signatures are equal only when
/// they are the same model instance. Class models build their signatures
/// once, so walking the same member twice yields equal signatures.
#[derive(Clone)]
pub struct SignatureModel(Arc<SignatureKind>);

#[derive(Debug)]
pub enum SignatureKind {
    Base {
        base: BaseType,
        annotations: Vec<AnnotationInfoModel>,
    },
    Array {
        component: SignatureModel,
        annotations: Vec<AnnotationInfoModel>,
    },
    ClassRef {
        name: String,
        /// Always [`SignatureKind::TypeArgument`] signatures.
        type_arguments: Vec<SignatureModel>,
        annotations: Vec<AnnotationInfoModel>,
    },
    TypeArgument {
        wildcard: Wildcard,
        bound: Option<SignatureModel>,
        index: usize,
    },
    TypeVariable {
        name: String,
        annotations: Vec<AnnotationInfoModel>,
        resolved: Option<TypeParameterModel>,
    },
    TypeParameter(TypeParameterModel),
}

/// What a signature means for schema generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureClass {
    Void,
    Boolean,
    String,
    Integer { int64: bool },
    Number { double: bool },
    Date(DateFormat),
    Array,
    Iterable,
    Map,
    Optional,
    Entity,
    TypeVariable,
    TypeParameter,
    TypeArgument,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    DateTime,
    Date,
    Time,
}

impl DateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFormat::DateTime => "date-time",
            DateFormat::Date => "date",
            DateFormat::Time => "time",
        }
    }
}

impl SignatureModel {
    pub fn new(kind: SignatureKind) -> Self {
        Self(Arc::new(kind))
    }

    pub fn from_descriptor(descriptor: &TypeDescriptor) -> Self {
        match descriptor {
            TypeDescriptor::Base { base, annotations } => Self::new(SignatureKind::Base {
                base: *base,
                annotations: annotations.clone(),
            }),
            TypeDescriptor::Array {
                component,
                annotations,
            } => Self::new(SignatureKind::Array {
                component: Self::from_descriptor(component),
                annotations: annotations.clone(),
            }),
            TypeDescriptor::Class {
                name,
                type_arguments,
                annotations,
            } => Self::new(SignatureKind::ClassRef {
                name: name.clone(),
                type_arguments: type_arguments
                    .iter()
                    .enumerate()
                    .map(|(index, argument)| {
                        Self::new(SignatureKind::TypeArgument {
                            wildcard: argument.wildcard,
                            bound: argument.bound.as_ref().map(Self::from_descriptor),
                            index,
                        })
                    })
                    .collect(),
                annotations: annotations.clone(),
            }),
            TypeDescriptor::TypeVariable { name, annotations } => {
                Self::new(SignatureKind::TypeVariable {
                    name: name.clone(),
                    annotations: annotations.clone(),
                    resolved: None,
                })
            }
        }
    }

    pub fn kind(&self) -> &SignatureKind {
        &self.0
    }

    pub fn annotations(&self) -> &[AnnotationInfoModel] {
        match self.kind() {
            SignatureKind::Base { annotations, .. }
            | SignatureKind::Array { annotations, .. }
            | SignatureKind::ClassRef { annotations, .. }
            | SignatureKind::TypeVariable { annotations, .. } => annotations,
            SignatureKind::TypeArgument { .. } | SignatureKind::TypeParameter(_) => &[],
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(
            self.kind(),
            SignatureKind::Base {
                base: BaseType::Void,
                ..
            }
        )
    }

    /// Primitive values can never be null.
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind(), SignatureKind::Base { base, .. } if *base != BaseType::Void)
    }

    pub fn class_name(&self) -> Option<&str> {
        match self.kind() {
            SignatureKind::ClassRef { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn type_arguments(&self) -> &[SignatureModel] {
        match self.kind() {
            SignatureKind::ClassRef { type_arguments, .. } => type_arguments,
            _ => &[],
        }
    }

    /// Name of an unresolved or resolved type variable.
    pub fn type_variable_name(&self) -> Option<&str> {
        match self.kind() {
            SignatureKind::TypeVariable { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn resolved_parameter(&self) -> Option<&TypeParameterModel> {
        match self.kind() {
            SignatureKind::TypeVariable { resolved, .. } => resolved.as_ref(),
            _ => None,
        }
    }

    /// Looks the type variable up among the parameters of `class` only.
    /// Method-level parameters and inherited generics are not seen; the
    /// parser resolves through the node path instead.
    pub fn default_resolution(&self, class: &ClassInfoModel) -> Option<TypeParameterModel> {
        let name = self.type_variable_name()?;
        class
            .type_parameters()
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    /// `Optional`, `OptionalInt` and friends.
    pub fn is_optional(&self) -> bool {
        self.class_name().is_some_and(|name| {
            name == jdk::OPTIONAL_CLASS || jdk::contains(jdk::OPTIONAL_PRIMITIVE_CLASSES, name)
        })
    }

    /// A copy of this type variable bound to its declaring parameter.
    pub fn with_resolution(&self, parameter: TypeParameterModel) -> Self {
        match self.kind() {
            SignatureKind::TypeVariable {
                name, annotations, ..
            } => Self::new(SignatureKind::TypeVariable {
                name: name.clone(),
                annotations: annotations.clone(),
                resolved: Some(parameter),
            }),
            _ => self.clone(),
        }
    }

    /// A copy of this class reference pointing at another class. Type
    /// arguments are dropped since mapped classes are plain transfer types.
    pub fn with_class_name(&self, target: &str) -> Self {
        match self.kind() {
            SignatureKind::ClassRef { annotations, .. } => Self::new(SignatureKind::ClassRef {
                name: target.to_string(),
                type_arguments: Vec::new(),
                annotations: annotations.clone(),
            }),
            _ => self.clone(),
        }
    }

    /// Copies `annotations` onto the front of this signature's own.
    pub fn with_extra_annotations(&self, extra: &[AnnotationInfoModel]) -> Self {
        if extra.is_empty() {
            return self.clone();
        }
        let merge = |own: &[AnnotationInfoModel]| {
            let mut merged = extra.to_vec();
            merged.extend(own.iter().cloned());
            merged
        };
        match self.kind() {
            SignatureKind::Base { base, annotations } => Self::new(SignatureKind::Base {
                base: *base,
                annotations: merge(annotations),
            }),
            SignatureKind::Array {
                component,
                annotations,
            } => Self::new(SignatureKind::Array {
                component: component.clone(),
                annotations: merge(annotations),
            }),
            SignatureKind::ClassRef {
                name,
                type_arguments,
                annotations,
            } => Self::new(SignatureKind::ClassRef {
                name: name.clone(),
                type_arguments: type_arguments.clone(),
                annotations: merge(annotations),
            }),
            SignatureKind::TypeVariable {
                name,
                annotations,
                resolved,
            } => Self::new(SignatureKind::TypeVariable {
                name: name.clone(),
                annotations: merge(annotations),
                resolved: resolved.clone(),
            }),
            SignatureKind::TypeArgument { .. } | SignatureKind::TypeParameter(_) => self.clone(),
        }
    }

    pub fn classify(&self, world: &ClassWorld) -> SignatureClass {
        match self.kind() {
            SignatureKind::Base { base, .. } => match base {
                BaseType::Void => SignatureClass::Void,
                BaseType::Boolean => SignatureClass::Boolean,
                BaseType::Char => SignatureClass::String,
                BaseType::Byte | BaseType::Short | BaseType::Int => {
                    SignatureClass::Integer { int64: false }
                }
                BaseType::Long => SignatureClass::Integer { int64: true },
                BaseType::Float => SignatureClass::Number { double: false },
                BaseType::Double => SignatureClass::Number { double: true },
            },
            SignatureKind::Array { .. } => SignatureClass::Array,
            SignatureKind::ClassRef { name, .. } => classify_class(name, world),
            SignatureKind::TypeArgument { .. } => SignatureClass::TypeArgument,
            SignatureKind::TypeVariable { .. } => SignatureClass::TypeVariable,
            SignatureKind::TypeParameter(_) => SignatureClass::TypeParameter,
        }
    }
}

fn classify_class(name: &str, world: &ClassWorld) -> SignatureClass {
    use jdk::contains;

    if contains(jdk::STRING_CLASSES, name) {
        SignatureClass::String
    } else if contains(jdk::BOOLEAN_CLASSES, name) {
        SignatureClass::Boolean
    } else if contains(jdk::INT32_CLASSES, name) {
        SignatureClass::Integer { int64: false }
    } else if contains(jdk::INT64_CLASSES, name) {
        SignatureClass::Integer { int64: true }
    } else if contains(jdk::FLOAT_CLASSES, name) {
        SignatureClass::Number { double: false }
    } else if contains(jdk::DOUBLE_CLASSES, name) {
        SignatureClass::Number { double: true }
    } else if contains(jdk::DATE_TIME_CLASSES, name) {
        SignatureClass::Date(DateFormat::DateTime)
    } else if contains(jdk::DATE_CLASSES, name) {
        SignatureClass::Date(DateFormat::Date)
    } else if contains(jdk::TIME_CLASSES, name) {
        SignatureClass::Date(DateFormat::Time)
    } else if name == jdk::OPTIONAL_CLASS {
        SignatureClass::Optional
    } else if contains(jdk::MAP_CLASSES, name) || world.is_assignable_to_any(name, jdk::MAP_CLASSES)
    {
        SignatureClass::Map
    } else if contains(jdk::ITERABLE_CLASSES, name)
        || world.is_assignable_to_any(name, jdk::ITERABLE_CLASSES)
    {
        SignatureClass::Iterable
    } else if name == "java.lang.Void" {
        SignatureClass::Void
    } else if !jdk::is_jdk_class(name) && world.get(name).is_some() {
        SignatureClass::Entity
    } else {
        SignatureClass::Any
    }
}

impl PartialEq for SignatureModel {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SignatureModel {}

impl Hash for SignatureModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Display for SignatureModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for annotation in self.annotations() {
            write!(f, "@{} ", annotation.simple_name())?;
        }
        match self.kind() {
            SignatureKind::Base { base, .. } => write!(f, "{base}"),
            SignatureKind::Array { component, .. } => write!(f, "{component}[]"),
            SignatureKind::ClassRef {
                name,
                type_arguments,
                ..
            } => {
                f.write_str(name)?;
                if !type_arguments.is_empty() {
                    f.write_str("<")?;
                    for (i, argument) in type_arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{argument}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            SignatureKind::TypeArgument {
                wildcard, bound, ..
            } => match (wildcard, bound) {
                (Wildcard::Any, _) | (_, None) => f.write_str("?"),
                (Wildcard::None, Some(bound)) => write!(f, "{bound}"),
                (Wildcard::Extends, Some(bound)) => write!(f, "? extends {bound}"),
                (Wildcard::Super, Some(bound)) => write!(f, "? super {bound}"),
            },
            SignatureKind::TypeVariable { name, .. } => f.write_str(name),
            SignatureKind::TypeParameter(parameter) => f.write_str(parameter.name()),
        }
    }
}

impl fmt::Debug for SignatureModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureModel({self})")
    }
}

/// Where a type parameter is declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeParameterOwner {
    Class(String),
    Method {
        class: String,
        method: String,
        index: usize,
    },
}

/// A declared type parameter with its bounds.
#[derive(Clone)]
pub struct TypeParameterModel(Arc<TypeParameterInner>);

struct TypeParameterInner {
    name: String,
    index: usize,
    owner: TypeParameterOwner,
    bounds: Vec<SignatureModel>,
}

impl TypeParameterModel {
    pub fn new(owner: TypeParameterOwner, index: usize, descriptor: &TypeParameterDescriptor) -> Self {
        Self(Arc::new(TypeParameterInner {
            name: descriptor.name.clone(),
            index,
            owner,
            bounds: descriptor
                .bounds
                .iter()
                .map(SignatureModel::from_descriptor)
                .collect(),
        }))
    }

    pub(crate) fn list(
        owner: TypeParameterOwner,
        descriptors: &[TypeParameterDescriptor],
    ) -> Vec<Self> {
        descriptors
            .iter()
            .enumerate()
            .map(|(index, descriptor)| Self::new(owner.clone(), index, descriptor))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Position among the owner's type parameters.
    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn owner(&self) -> &TypeParameterOwner {
        &self.0.owner
    }

    pub fn bounds(&self) -> &[SignatureModel] {
        &self.0.bounds
    }

    /// The first bound, unless it is the implicit `Object`.
    pub fn effective_bound(&self) -> Option<&SignatureModel> {
        self.0
            .bounds
            .first()
            .filter(|b| b.class_name() != Some("java.lang.Object"))
    }

    pub fn as_signature(&self) -> SignatureModel {
        SignatureModel::new(SignatureKind::TypeParameter(self.clone()))
    }
}

impl PartialEq for TypeParameterModel {
    fn eq(&self, other: &Self) -> bool {
        self.0.owner == other.0.owner && self.0.index == other.0.index
    }
}

impl Eq for TypeParameterModel {}

impl Hash for TypeParameterModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.owner.hash(state);
        self.0.index.hash(state);
    }
}

impl fmt::Debug for TypeParameterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeParameterModel")
            .field("name", &self.0.name)
            .field("owner", &self.0.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::type_text::parse_type;

    fn sig(text: &str) -> SignatureModel {
        SignatureModel::from_descriptor(&parse_type(text).unwrap())
    }

    #[test]
    fn test_identity_equality() {
        let a = sig("String");
        let b = sig("String");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_classify_platform_types() {
        let world = ClassWorld::default();
        assert_eq!(sig("int").classify(&world), SignatureClass::Integer { int64: false });
        assert_eq!(sig("Long").classify(&world), SignatureClass::Integer { int64: true });
        assert_eq!(sig("float").classify(&world), SignatureClass::Number { double: false });
        assert_eq!(sig("BigDecimal").classify(&world), SignatureClass::Number { double: true });
        assert_eq!(sig("char").classify(&world), SignatureClass::String);
        assert_eq!(
            sig("LocalDate").classify(&world),
            SignatureClass::Date(DateFormat::Date)
        );
        assert_eq!(sig("List<String>").classify(&world), SignatureClass::Iterable);
        assert_eq!(sig("HashMap<String, Long>").classify(&world), SignatureClass::Map);
        assert_eq!(sig("Optional<String>").classify(&world), SignatureClass::Optional);
        assert_eq!(sig("T").classify(&world), SignatureClass::TypeVariable);
        assert_eq!(sig("java.net.Socket").classify(&world), SignatureClass::Any);
        assert_eq!(sig("com.example.Missing").classify(&world), SignatureClass::Any);
    }

    #[test]
    fn test_type_arguments_carry_position() {
        let map = sig("Map<String, Integer>");
        let positions: Vec<_> = map
            .type_arguments()
            .iter()
            .map(|a| match a.kind() {
                SignatureKind::TypeArgument { index, .. } => *index,
                _ => usize::MAX,
            })
            .collect();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(map.to_string(), "java.util.Map<java.lang.String, java.lang.Integer>");
    }

    #[test]
    fn test_default_resolution_misses_method_parameters() {
        use crate::model::descriptor::{parse_descriptors, DescriptorFormat};
        let class = ClassInfoModel::new(
            parse_descriptors(
                r#"
name: com.example.Box
typeParameters: [T]
methods:
  - name: convert
    typeParameters: [R]
    parameters: [{ name: input, type: T }]
    result: R
"#,
                DescriptorFormat::Yaml,
            )
            .unwrap()
            .remove(0),
        );
        let method = &class.methods()[0];
        let input = method.parameters()[0].signature();
        assert_eq!(input.default_resolution(&class).unwrap().name(), "T");
        assert!(method.result().default_resolution(&class).is_none());
    }

    #[test]
    fn test_optional_primitive_is_optional() {
        let world = ClassWorld::default();
        let optional = sig("OptionalInt");
        assert!(optional.is_optional());
        assert_eq!(optional.classify(&world), SignatureClass::Integer { int64: false });
    }
}
