use super::annotation::{self, AnnotationInfoModel};
use super::descriptor::{FieldDescriptor, MethodDescriptor, ParameterDescriptor, Visibility};
use super::signature::{SignatureModel, TypeParameterModel, TypeParameterOwner};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A field of a class.
#[derive(Clone)]
pub struct FieldInfoModel(Arc<FieldInner>);

struct FieldInner {
    owner: Arc<str>,
    index: usize,
    descriptor: FieldDescriptor,
    signature: SignatureModel,
}

impl FieldInfoModel {
    pub(crate) fn new(owner: Arc<str>, index: usize, descriptor: FieldDescriptor) -> Self {
        let signature = SignatureModel::from_descriptor(&descriptor.ty);
        Self(Arc::new(FieldInner {
            owner,
            index,
            descriptor,
            signature,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.descriptor.name
    }

    pub fn owner(&self) -> &str {
        &self.0.owner
    }

    pub fn signature(&self) -> &SignatureModel {
        &self.0.signature
    }

    pub fn visibility(&self) -> Visibility {
        self.0.descriptor.visibility
    }

    pub fn is_static(&self) -> bool {
        self.0.descriptor.is_static
    }

    pub fn is_transient(&self) -> bool {
        self.0.descriptor.is_transient
    }

    pub fn annotations(&self) -> &[AnnotationInfoModel] {
        &self.0.descriptor.annotations
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        annotation::has_annotation(self.annotations(), name)
    }
}

impl PartialEq for FieldInfoModel {
    fn eq(&self, other: &Self) -> bool {
        self.0.owner == other.0.owner && self.0.index == other.0.index
    }
}

impl Eq for FieldInfoModel {}

impl Hash for FieldInfoModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.owner.hash(state);
        self.0.index.hash(state);
    }
}

impl fmt::Debug for FieldInfoModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldInfoModel({}.{})", self.owner(), self.name())
    }
}

/// A method of a class, with its parameters and result signature.
#[derive(Clone)]
pub struct MethodInfoModel(Arc<MethodInner>);

struct MethodInner {
    owner: Arc<str>,
    index: usize,
    descriptor: MethodDescriptor,
    parameters: Vec<MethodParameterInfoModel>,
    result: SignatureModel,
    type_parameters: Vec<TypeParameterModel>,
}

impl MethodInfoModel {
    pub(crate) fn new(owner: Arc<str>, index: usize, descriptor: MethodDescriptor) -> Self {
        let parameters = descriptor
            .parameters
            .iter()
            .enumerate()
            .map(|(position, parameter)| {
                MethodParameterInfoModel::new(
                    Arc::clone(&owner),
                    index,
                    &descriptor.name,
                    position,
                    parameter.clone(),
                )
            })
            .collect();
        let type_parameters = TypeParameterModel::list(
            TypeParameterOwner::Method {
                class: owner.to_string(),
                method: descriptor.name.clone(),
                index,
            },
            &descriptor.type_parameters,
        );
        let result = SignatureModel::from_descriptor(&descriptor.result);
        Self(Arc::new(MethodInner {
            owner,
            index,
            descriptor,
            parameters,
            result,
            type_parameters,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.descriptor.name
    }

    /// Name of the declaring class.
    pub fn owner(&self) -> &str {
        &self.0.owner
    }

    pub fn is_public(&self) -> bool {
        self.0.descriptor.visibility == Visibility::Public
    }

    pub fn is_static(&self) -> bool {
        self.0.descriptor.is_static
    }

    pub fn parameters(&self) -> &[MethodParameterInfoModel] {
        &self.0.parameters
    }

    pub fn result(&self) -> &SignatureModel {
        &self.0.result
    }

    pub fn type_parameters(&self) -> &[TypeParameterModel] {
        &self.0.type_parameters
    }

    pub fn annotations(&self) -> &[AnnotationInfoModel] {
        &self.0.descriptor.annotations
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        annotation::has_annotation(self.annotations(), name)
    }
}

impl PartialEq for MethodInfoModel {
    fn eq(&self, other: &Self) -> bool {
        self.0.owner == other.0.owner && self.0.index == other.0.index
    }
}

impl Eq for MethodInfoModel {}

impl Hash for MethodInfoModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.owner.hash(state);
        self.0.index.hash(state);
    }
}

impl fmt::Debug for MethodInfoModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodInfoModel({}.{})", self.owner(), self.name())
    }
}

#[derive(Clone)]
pub struct MethodParameterInfoModel(Arc<ParameterInner>);

struct ParameterInner {
    owner: Arc<str>,
    method: String,
    method_index: usize,
    index: usize,
    descriptor: ParameterDescriptor,
    signature: SignatureModel,
}

impl MethodParameterInfoModel {
    fn new(
        owner: Arc<str>,
        method_index: usize,
        method: &str,
        index: usize,
        descriptor: ParameterDescriptor,
    ) -> Self {
        let signature = SignatureModel::from_descriptor(&descriptor.ty);
        Self(Arc::new(ParameterInner {
            owner,
            method: method.to_string(),
            method_index,
            index,
            descriptor,
            signature,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.descriptor.name
    }

    pub fn method_name(&self) -> &str {
        &self.0.method
    }

    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn signature(&self) -> &SignatureModel {
        &self.0.signature
    }

    pub fn annotations(&self) -> &[AnnotationInfoModel] {
        &self.0.descriptor.annotations
    }
}

impl PartialEq for MethodParameterInfoModel {
    fn eq(&self, other: &Self) -> bool {
        self.0.owner == other.0.owner
            && self.0.method_index == other.0.method_index
            && self.0.index == other.0.index
    }
}

impl Eq for MethodParameterInfoModel {}

impl Hash for MethodParameterInfoModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.owner.hash(state);
        self.0.method_index.hash(state);
        self.0.index.hash(state);
    }
}

impl fmt::Debug for MethodParameterInfoModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MethodParameterInfoModel({}.{}#{})",
            self.0.owner,
            self.0.method,
            self.name()
        )
    }
}
