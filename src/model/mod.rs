//! # Model Layer
//!
//! Read-only models over the classes described on the class path. Models
//! are cheap to clone (`Arc` inside) and compare by the element they wrap:
//! classes by qualified name, members by owner and position, signatures by
//! instance.
//!
//! Raw descriptors ([`descriptor`]) are parsed from YAML, JSON or TOML and
//! turned into models once per scan; every other layer works on models.

mod annotation;
mod class;
pub mod descriptor;
mod error;
pub mod jdk;
mod member;
mod property;
mod signature;
pub mod type_text;
mod world;

pub use annotation::{find_annotation, has_annotation, simple_name, AnnotationInfoModel};
pub use class::ClassInfoModel;
pub use descriptor::{
    parse_descriptors, BaseType, ClassDescriptor, ClassKind, DescriptorFormat, TypeDescriptor,
    Visibility, Wildcard,
};
pub use error::DescriptorError;
pub use member::{FieldInfoModel, MethodInfoModel, MethodParameterInfoModel};
pub use property::{collect_properties, PropertyModel, JSON_IGNORE_TYPE};
pub use signature::{
    DateFormat, SignatureClass, SignatureKind, SignatureModel, TypeParameterModel,
    TypeParameterOwner,
};
pub use world::ClassWorld;
