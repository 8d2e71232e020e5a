//! Serialized class descriptors.
//!
//! A class path is a set of descriptor files (YAML, JSON or TOML) that
//! describe the compiled classes of a service: their kind, type
//! parameters, supertypes, annotations, fields and methods. Types may be
//! written structurally or in the compact text form parsed by
//! [`super::type_text`].

use super::annotation::AnnotationInfoModel;
use super::error::DescriptorError;
use super::type_text;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

/// Primitive types, plus `void` for method results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl BaseType {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => BaseType::Boolean,
            "byte" => BaseType::Byte,
            "char" => BaseType::Char,
            "short" => BaseType::Short,
            "int" => BaseType::Int,
            "long" => BaseType::Long,
            "float" => BaseType::Float,
            "double" => BaseType::Double,
            "void" => BaseType::Void,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Boolean => "boolean",
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Short => "short",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Float => "float",
            BaseType::Double => "double",
            BaseType::Void => "void",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wildcard {
    /// A plain type argument, `List<Foo>`.
    #[default]
    None,
    /// `?`
    Any,
    /// `? extends Foo`
    Extends,
    /// `? super Foo`
    Super,
}

/// A type use as written in a descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "TypeRepr")]
pub enum TypeDescriptor {
    Base {
        base: BaseType,
        annotations: Vec<AnnotationInfoModel>,
    },
    Array {
        component: Box<TypeDescriptor>,
        annotations: Vec<AnnotationInfoModel>,
    },
    Class {
        name: String,
        type_arguments: Vec<TypeArgumentDescriptor>,
        annotations: Vec<AnnotationInfoModel>,
    },
    TypeVariable {
        name: String,
        annotations: Vec<AnnotationInfoModel>,
    },
}

impl TypeDescriptor {
    pub fn void() -> Self {
        TypeDescriptor::Base {
            base: BaseType::Void,
            annotations: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        TypeDescriptor::Class {
            name: name.into(),
            type_arguments: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn annotations(&self) -> &[AnnotationInfoModel] {
        match self {
            TypeDescriptor::Base { annotations, .. }
            | TypeDescriptor::Array { annotations, .. }
            | TypeDescriptor::Class { annotations, .. }
            | TypeDescriptor::TypeVariable { annotations, .. } => annotations,
        }
    }

    pub(crate) fn annotations_mut(&mut self) -> &mut Vec<AnnotationInfoModel> {
        match self {
            TypeDescriptor::Base { annotations, .. }
            | TypeDescriptor::Array { annotations, .. }
            | TypeDescriptor::Class { annotations, .. }
            | TypeDescriptor::TypeVariable { annotations, .. } => annotations,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Base {
                base: BaseType::Void,
                ..
            }
        )
    }
}

impl std::str::FromStr for TypeDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        type_text::parse_type(s)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeRepr {
    Text(String),
    Structured(StructuredType),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum StructuredType {
    Base {
        name: BaseType,
        #[serde(default)]
        annotations: Vec<AnnotationInfoModel>,
    },
    Array {
        component: TypeDescriptor,
        #[serde(default)]
        annotations: Vec<AnnotationInfoModel>,
    },
    Class {
        name: String,
        #[serde(default, rename = "typeArguments")]
        type_arguments: Vec<TypeArgumentDescriptor>,
        #[serde(default)]
        annotations: Vec<AnnotationInfoModel>,
    },
    TypeVariable {
        name: String,
        #[serde(default)]
        annotations: Vec<AnnotationInfoModel>,
    },
}

impl TryFrom<TypeRepr> for TypeDescriptor {
    type Error = DescriptorError;

    fn try_from(repr: TypeRepr) -> Result<Self, Self::Error> {
        Ok(match repr {
            TypeRepr::Text(text) => type_text::parse_type(&text)?,
            TypeRepr::Structured(StructuredType::Base { name, annotations }) => {
                TypeDescriptor::Base {
                    base: name,
                    annotations,
                }
            }
            TypeRepr::Structured(StructuredType::Array {
                component,
                annotations,
            }) => TypeDescriptor::Array {
                component: Box::new(component),
                annotations,
            },
            TypeRepr::Structured(StructuredType::Class {
                name,
                type_arguments,
                annotations,
            }) => TypeDescriptor::Class {
                name,
                type_arguments,
                annotations,
            },
            TypeRepr::Structured(StructuredType::TypeVariable { name, annotations }) => {
                TypeDescriptor::TypeVariable { name, annotations }
            }
        })
    }
}

/// One argument of a parameterized class use.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "TypeArgumentRepr")]
pub struct TypeArgumentDescriptor {
    pub wildcard: Wildcard,
    pub bound: Option<TypeDescriptor>,
}

impl TypeArgumentDescriptor {
    pub fn exact(ty: TypeDescriptor) -> Self {
        Self {
            wildcard: Wildcard::None,
            bound: Some(ty),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeArgumentRepr {
    Text(String),
    Structured {
        #[serde(default)]
        wildcard: Wildcard,
        #[serde(default, rename = "type")]
        bound: Option<TypeDescriptor>,
    },
}

impl TryFrom<TypeArgumentRepr> for TypeArgumentDescriptor {
    type Error = DescriptorError;

    fn try_from(repr: TypeArgumentRepr) -> Result<Self, Self::Error> {
        match repr {
            TypeArgumentRepr::Text(text) => type_text::parse_type_argument(&text),
            TypeArgumentRepr::Structured { wildcard, bound } => {
                if wildcard != Wildcard::Any && bound.is_none() {
                    return Err(DescriptorError::TypeSyntax {
                        input: format!("{wildcard:?}"),
                        message: "type argument without a type".to_string(),
                    });
                }
                Ok(Self { wildcard, bound })
            }
        }
    }
}

/// A declared type parameter, `T` or `T extends Number & Comparable<T>`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "TypeParameterRepr")]
pub struct TypeParameterDescriptor {
    pub name: String,
    pub bounds: Vec<TypeDescriptor>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeParameterRepr {
    Text(String),
    Structured {
        name: String,
        #[serde(default)]
        bounds: Vec<TypeDescriptor>,
    },
}

impl TryFrom<TypeParameterRepr> for TypeParameterDescriptor {
    type Error = DescriptorError;

    fn try_from(repr: TypeParameterRepr) -> Result<Self, Self::Error> {
        match repr {
            TypeParameterRepr::Text(text) => type_text::parse_type_parameter(&text),
            TypeParameterRepr::Structured { name, bounds } => Ok(Self { name, bounds }),
        }
    }
}

fn default_field_visibility() -> Visibility {
    Visibility::Private
}

fn default_member_visibility() -> Visibility {
    Visibility::Public
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default = "default_field_visibility")]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "transient")]
    pub is_transient: bool,
    #[serde(default)]
    pub annotations: Vec<AnnotationInfoModel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub annotations: Vec<AnnotationInfoModel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default = "default_member_visibility")]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterDescriptor>,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(default = "TypeDescriptor::void")]
    pub result: TypeDescriptor,
    #[serde(default)]
    pub annotations: Vec<AnnotationInfoModel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDescriptor {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default = "default_member_visibility")]
    pub visibility: Visibility,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterDescriptor>,
    #[serde(default)]
    pub superclass: Option<TypeDescriptor>,
    #[serde(default)]
    pub interfaces: Vec<TypeDescriptor>,
    #[serde(default)]
    pub annotations: Vec<AnnotationInfoModel>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub enum_constants: Vec<String>,
}

/// Top-level shape of a descriptor file: one class, a list, or a
/// `classes:` table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DescriptorFile {
    Table { classes: Vec<ClassDescriptor> },
    Many(Vec<ClassDescriptor>),
    One(Box<ClassDescriptor>),
}

impl DescriptorFile {
    pub fn into_classes(self) -> Vec<ClassDescriptor> {
        match self {
            DescriptorFile::Table { classes } | DescriptorFile::Many(classes) => classes,
            DescriptorFile::One(class) => vec![*class],
        }
    }
}

/// Text format of a descriptor file, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Yaml,
    Json,
    Toml,
}

impl DescriptorFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(DescriptorFormat::Yaml),
            "json" => Some(DescriptorFormat::Json),
            "toml" => Some(DescriptorFormat::Toml),
            _ => None,
        }
    }
}

/// Parses descriptor text in the given format.
pub fn parse_descriptors(
    text: &str,
    format: DescriptorFormat,
) -> Result<Vec<ClassDescriptor>, DescriptorError> {
    let file: DescriptorFile = match format {
        DescriptorFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|e| DescriptorError::Format(e.to_string()))?,
        DescriptorFormat::Json => serde_json::from_str(text)
            .map_err(|e| DescriptorError::Format(e.to_string()))?,
        DescriptorFormat::Toml => {
            toml::from_str(text).map_err(|e| DescriptorError::Format(e.to_string()))?
        }
    };
    Ok(file.into_classes())
}
