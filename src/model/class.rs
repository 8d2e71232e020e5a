use super::annotation::{self, AnnotationInfoModel};
use super::descriptor::{ClassDescriptor, ClassKind, Visibility};
use super::jdk;
use super::member::{FieldInfoModel, MethodInfoModel};
use super::signature::{SignatureModel, TypeParameterModel, TypeParameterOwner};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A class of the closed world, with its members materialized once.
///
/// Equality, ordering and hashing go by the fully-qualified name.
#[derive(Clone)]
pub struct ClassInfoModel(Arc<ClassInner>);

struct ClassInner {
    name: Arc<str>,
    kind: ClassKind,
    visibility: Visibility,
    annotations: Vec<AnnotationInfoModel>,
    type_parameters: Vec<TypeParameterModel>,
    superclass: Option<SignatureModel>,
    interfaces: Vec<SignatureModel>,
    fields: Vec<FieldInfoModel>,
    methods: Vec<MethodInfoModel>,
    enum_constants: Vec<String>,
}

impl ClassInfoModel {
    pub fn new(descriptor: ClassDescriptor) -> Self {
        let name: Arc<str> = Arc::from(descriptor.name.as_str());
        let type_parameters = TypeParameterModel::list(
            TypeParameterOwner::Class(descriptor.name.clone()),
            &descriptor.type_parameters,
        );
        let superclass = descriptor
            .superclass
            .as_ref()
            .filter(|s| !is_object(s))
            .map(SignatureModel::from_descriptor);
        let interfaces = descriptor
            .interfaces
            .iter()
            .map(SignatureModel::from_descriptor)
            .collect();
        let fields = descriptor
            .fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| FieldInfoModel::new(Arc::clone(&name), index, field))
            .collect();
        let methods = descriptor
            .methods
            .into_iter()
            .enumerate()
            .map(|(index, method)| MethodInfoModel::new(Arc::clone(&name), index, method))
            .collect();

        Self(Arc::new(ClassInner {
            name,
            kind: descriptor.kind,
            visibility: descriptor.visibility,
            annotations: descriptor.annotations,
            type_parameters,
            superclass,
            interfaces,
            fields,
            methods,
            enum_constants: descriptor.enum_constants,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn simple_name(&self) -> &str {
        annotation::simple_name(&self.0.name)
    }

    pub fn kind(&self) -> ClassKind {
        self.0.kind
    }

    pub fn is_enum(&self) -> bool {
        self.0.kind == ClassKind::Enum
    }

    pub fn is_record(&self) -> bool {
        self.0.kind == ClassKind::Record
    }

    pub fn is_interface(&self) -> bool {
        self.0.kind == ClassKind::Interface
    }

    pub fn is_public(&self) -> bool {
        self.0.visibility == Visibility::Public
    }

    pub fn is_jdk_class(&self) -> bool {
        jdk::is_jdk_class(&self.0.name)
    }

    pub fn annotations(&self) -> &[AnnotationInfoModel] {
        &self.0.annotations
    }

    pub fn find_annotation(&self, name: &str) -> Option<&AnnotationInfoModel> {
        annotation::find_annotation(&self.0.annotations, name)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.find_annotation(name).is_some()
    }

    pub fn type_parameters(&self) -> &[TypeParameterModel] {
        &self.0.type_parameters
    }

    /// The declared superclass, unless it is `Object`.
    pub fn superclass(&self) -> Option<&SignatureModel> {
        self.0.superclass.as_ref()
    }

    pub fn interfaces(&self) -> &[SignatureModel] {
        &self.0.interfaces
    }

    pub fn fields(&self) -> &[FieldInfoModel] {
        &self.0.fields
    }

    pub fn methods(&self) -> &[MethodInfoModel] {
        &self.0.methods
    }

    pub fn enum_constants(&self) -> &[String] {
        &self.0.enum_constants
    }
}

fn is_object(ty: &super::descriptor::TypeDescriptor) -> bool {
    matches!(ty, super::descriptor::TypeDescriptor::Class { name, .. } if name == "java.lang.Object")
}

impl PartialEq for ClassInfoModel {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for ClassInfoModel {}

impl Hash for ClassInfoModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl PartialOrd for ClassInfoModel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassInfoModel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.name.cmp(&other.0.name)
    }
}

impl fmt::Debug for ClassInfoModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassInfoModel({})", self.name())
    }
}
