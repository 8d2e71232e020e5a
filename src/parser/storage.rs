use super::dependency::DependencyController;
use crate::config::ParserConfig;
use crate::model::{
    ClassInfoModel, ClassWorld, MethodInfoModel, MethodParameterInfoModel, PropertyModel,
    SignatureModel,
};
use crate::openapi::OpenApiDocument;
use crate::scan::ScanResult;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Links document locations (JSON pointers) to the models that produced
/// them, in both directions.
#[derive(Debug, Default, Clone)]
pub struct AssociationMap {
    entities: BTreeMap<String, ClassInfoModel>,
    properties: BTreeMap<String, PropertyModel>,
    methods: BTreeMap<String, MethodInfoModel>,
    parameters: BTreeMap<String, MethodParameterInfoModel>,
    signatures: BTreeMap<String, SignatureModel>,
    entity_pointers: HashMap<ClassInfoModel, String>,
    property_pointers: HashMap<PropertyModel, String>,
    method_pointers: HashMap<MethodInfoModel, String>,
    parameter_pointers: HashMap<MethodParameterInfoModel, String>,
}

impl AssociationMap {
    pub fn add_entity(&mut self, pointer: String, class: ClassInfoModel) {
        self.entity_pointers.insert(class.clone(), pointer.clone());
        self.entities.insert(pointer, class);
    }

    pub fn add_property(&mut self, pointer: String, property: PropertyModel) {
        self.property_pointers
            .insert(property.clone(), pointer.clone());
        self.properties.insert(pointer, property);
    }

    pub fn add_method(&mut self, pointer: String, method: MethodInfoModel) {
        self.method_pointers.insert(method.clone(), pointer.clone());
        self.methods.insert(pointer, method);
    }

    pub fn add_parameter(&mut self, pointer: String, parameter: MethodParameterInfoModel) {
        self.parameter_pointers
            .insert(parameter.clone(), pointer.clone());
        self.parameters.insert(pointer, parameter);
    }

    pub fn add_signature(&mut self, pointer: String, signature: SignatureModel) {
        self.signatures.insert(pointer, signature);
    }

    pub fn entity(&self, pointer: &str) -> Option<&ClassInfoModel> {
        self.entities.get(pointer)
    }

    pub fn property(&self, pointer: &str) -> Option<&PropertyModel> {
        self.properties.get(pointer)
    }

    pub fn method(&self, pointer: &str) -> Option<&MethodInfoModel> {
        self.methods.get(pointer)
    }

    pub fn parameter(&self, pointer: &str) -> Option<&MethodParameterInfoModel> {
        self.parameters.get(pointer)
    }

    pub fn signature(&self, pointer: &str) -> Option<&SignatureModel> {
        self.signatures.get(pointer)
    }

    pub fn entity_pointer(&self, class: &ClassInfoModel) -> Option<&str> {
        self.entity_pointers.get(class).map(String::as_str)
    }

    pub fn property_pointer(&self, property: &PropertyModel) -> Option<&str> {
        self.property_pointers.get(property).map(String::as_str)
    }

    pub fn method_pointer(&self, method: &MethodInfoModel) -> Option<&str> {
        self.method_pointers.get(method).map(String::as_str)
    }

    pub fn parameter_pointer(&self, parameter: &MethodParameterInfoModel) -> Option<&str> {
        self.parameter_pointers.get(parameter).map(String::as_str)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&str, &ClassInfoModel)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn methods(&self) -> impl Iterator<Item = (&str, &MethodInfoModel)> {
        self.methods.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn parameters(&self) -> impl Iterator<Item = (&str, &MethodParameterInfoModel)> {
        self.parameters.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Class substitutions applied to signatures before they are converted.
#[derive(Debug, Default, Clone)]
pub struct ClassMappers {
    mappings: BTreeMap<String, String>,
}

impl ClassMappers {
    pub fn add(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.mappings.insert(from.into(), to.into());
    }

    pub fn map(&self, class_name: &str) -> Option<&str> {
        self.mappings.get(class_name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mappings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Per-plugin scratch values, one per type.
#[derive(Default)]
pub struct PluginStorage {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl PluginStorage {
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<T>())
    }

    #[allow(clippy::expect_used)]
    pub fn get_or_default<T: Any + Default>(&mut self) -> &mut T {
        self.entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::<T>::default())
            .downcast_mut::<T>()
            .expect("entries are keyed by their own TypeId")
    }
}

/// Context of one parser run, handed to every plugin callback.
pub struct SharedStorage {
    config: ParserConfig,
    scan: Arc<ScanResult>,
    pub associations: AssociationMap,
    pub class_mappers: ClassMappers,
    pub dependencies: DependencyController,
    pub plugin_storage: PluginStorage,
    pub document: OpenApiDocument,
}

impl SharedStorage {
    pub fn new(config: ParserConfig, scan: Arc<ScanResult>, document: OpenApiDocument) -> Self {
        Self {
            config,
            scan,
            associations: AssociationMap::default(),
            class_mappers: ClassMappers::default(),
            dependencies: DependencyController::new(),
            plugin_storage: PluginStorage::default(),
            document,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn scan(&self) -> &Arc<ScanResult> {
        &self.scan
    }

    pub fn world(&self) -> &ClassWorld {
        self.scan.world()
    }

    /// Published name of an endpoint class.
    pub fn endpoint_name(&self, class: &ClassInfoModel) -> Option<&str> {
        self.scan.endpoint_name_of(class)
    }

    pub fn into_output(self) -> (OpenApiDocument, AssociationMap) {
        (self.document, self.associations)
    }
}
