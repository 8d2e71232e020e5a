use super::ScanResult;
use crate::access::AccessRule;
use crate::model::{
    collect_properties, ClassInfoModel, ClassWorld, SignatureClass, SignatureKind, SignatureModel,
    Wildcard,
};
use crate::parser::plugins::entity::entity_superclass;
use crate::parser::plugins::method::published_methods;
use crate::parser::ClassMappers;
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::trace;

/// Role a class is scanned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanKind {
    Endpoint,
    Exposed,
    NonExposed,
    Entity,
}

/// One unit of work of the flat scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanItem {
    pub class: ClassInfoModel,
    pub kind: ScanKind,
    /// The endpoint a holder class is reached through.
    pub endpoint: Option<ClassInfoModel>,
}

impl ScanItem {
    pub fn new(class: ClassInfoModel, kind: ScanKind) -> Self {
        Self {
            class,
            kind,
            endpoint: None,
        }
    }

    fn through(mut self, endpoint: Option<ClassInfoModel>) -> Self {
        self.endpoint = endpoint;
        self
    }
}

/// The item being scanned plus what is still queued.
#[derive(Debug, Default)]
pub struct ScanLocation {
    current: Option<ScanItem>,
    pending: VecDeque<ScanItem>,
}

impl ScanLocation {
    pub fn new(items: impl IntoIterator<Item = ScanItem>) -> Self {
        Self {
            current: None,
            pending: items.into_iter().collect(),
        }
    }

    pub fn current(&self) -> Option<&ScanItem> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn push(&mut self, item: ScanItem) {
        self.pending.push_back(item);
    }

    /// Moves to the next queued item.
    pub fn advance(&mut self) -> Option<&ScanItem> {
        self.current = self.pending.pop_front();
        self.current.as_ref()
    }
}

/// Entity classes the walk would emit as component schemas, sorted by
/// name, computed without plugins.
///
/// Methods denied to everyone and properties of ignored types are left
/// out like the walk does; overridden methods are not, so the result may
/// be a superset of the walk's.
pub fn reachable_classes(scan: &ScanResult, mappers: &ClassMappers) -> Vec<ClassInfoModel> {
    let world = scan.world();
    let mut location = ScanLocation::new(scan.endpoints().iter().map(|endpoint| {
        ScanItem::new(endpoint.class.clone(), ScanKind::Endpoint)
            .through(Some(endpoint.class.clone()))
    }));
    let mut seen: HashSet<(ClassInfoModel, ScanKind)> = HashSet::new();
    let mut entities = BTreeSet::new();

    while let Some(item) = location.advance().cloned() {
        if !seen.insert((item.class.clone(), item.kind)) {
            continue;
        }
        trace!(class = item.class.name(), kind = ?item.kind, "flat scan");

        let mut signatures = Vec::new();
        match item.kind {
            ScanKind::Endpoint | ScanKind::Exposed | ScanKind::NonExposed => {
                if let Some(superclass) = holder_superclass(&item.class, world) {
                    let kind = if scan.is_exposed(superclass) {
                        ScanKind::Exposed
                    } else {
                        ScanKind::NonExposed
                    };
                    location.push(
                        ScanItem::new(superclass.clone(), kind).through(item.endpoint.clone()),
                    );
                }
                if let Some(signature) = item.class.superclass() {
                    signatures.extend(signature.type_arguments().iter().cloned());
                }
                if item.kind != ScanKind::NonExposed {
                    for method in published_methods(&item.class) {
                        let rule = AccessRule::effective(
                            method,
                            Some(&item.class),
                            item.endpoint.as_ref(),
                        );
                        if rule.is_denied() {
                            continue;
                        }
                        signatures.push(method.result().clone());
                        signatures.extend(method.parameters().iter().map(|p| p.signature().clone()));
                        signatures.extend(
                            method
                                .type_parameters()
                                .iter()
                                .filter_map(|p| p.effective_bound().cloned()),
                        );
                    }
                }
            }
            ScanKind::Entity => {
                if let Some(superclass) = entity_superclass(&item.class, world) {
                    location.push(ScanItem::new(superclass.clone(), ScanKind::Entity));
                }
                if let Some(signature) = item.class.superclass() {
                    signatures.push(signature.clone());
                }
                for property in collect_properties(&item.class, world) {
                    if !property.is_type_ignored() {
                        signatures.push(property.signature().clone());
                    }
                }
            }
        }

        let mut found = Vec::new();
        for signature in &signatures {
            signature_entities(signature, world, mappers, &mut found);
        }
        for class in found {
            if entities.insert(class.clone()) {
                location.push(ScanItem::new(class, ScanKind::Entity));
            }
        }
    }

    entities.into_iter().collect()
}

fn holder_superclass<'w>(class: &ClassInfoModel, world: &'w ClassWorld) -> Option<&'w ClassInfoModel> {
    world
        .superclass_of(class)
        .filter(|superclass| !superclass.is_jdk_class())
}

/// Entity classes a signature refers to, following the same nesting the
/// schema conversion uses.
fn signature_entities(
    signature: &SignatureModel,
    world: &ClassWorld,
    mappers: &ClassMappers,
    out: &mut Vec<ClassInfoModel>,
) {
    match signature.kind() {
        SignatureKind::Base { .. } | SignatureKind::TypeVariable { .. } => {}
        SignatureKind::Array { component, .. } => {
            signature_entities(component, world, mappers, out);
        }
        SignatureKind::TypeArgument {
            wildcard: Wildcard::None | Wildcard::Extends,
            bound: Some(bound),
            ..
        } => signature_entities(bound, world, mappers, out),
        SignatureKind::TypeArgument { .. } => {}
        SignatureKind::TypeParameter(parameter) => {
            if let Some(bound) = parameter.effective_bound() {
                signature_entities(bound, world, mappers, out);
            }
        }
        SignatureKind::ClassRef { name, .. } => {
            let mapped;
            let signature = match mappers.map(name) {
                Some(target) => {
                    mapped = signature.with_class_name(target);
                    &mapped
                }
                None => signature,
            };
            let arguments = signature.type_arguments();
            let nested: &[SignatureModel] = match signature.classify(world) {
                SignatureClass::Entity => {
                    out.extend(
                        signature
                            .class_name()
                            .and_then(|name| world.get(name))
                            .filter(|class| !class.is_jdk_class())
                            .cloned(),
                    );
                    arguments
                }
                SignatureClass::Iterable | SignatureClass::Optional => {
                    arguments.get(..1).unwrap_or_default()
                }
                SignatureClass::Map => arguments.get(1..2).unwrap_or_default(),
                _ => &[],
            };
            for argument in nested {
                signature_entities(argument, world, mappers, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::model::{parse_descriptors, DescriptorFormat};

    fn scan(yaml: &str) -> ScanResult {
        let config = ParserConfig::new("Endpoint", "EndpointExposed");
        ScanResult::from_descriptors(
            parse_descriptors(yaml, DescriptorFormat::Yaml).unwrap(),
            &config,
        )
        .unwrap()
    }

    fn names(classes: &[ClassInfoModel]) -> Vec<&str> {
        classes.iter().map(ClassInfoModel::name).collect()
    }

    #[test]
    fn test_reachable_through_collections_and_superclasses() {
        let result = scan(
            r#"
- name: com.example.Shop
  annotations: [Endpoint]
  methods:
    - name: stock
      result: "Map<String, List<com.example.Item>>"
    - name: secret
      annotations: [DenyAll]
      result: com.example.Hidden
- name: com.example.Item
  superclass: com.example.Base
  fields:
    - { name: tags, type: "Set<com.example.Tag>" }
- name: com.example.Base
- name: com.example.Tag
  fields:
    - { name: parent, type: com.example.Tag }
- name: com.example.Hidden
- name: com.example.Unused
"#,
        );
        let classes = reachable_classes(&result, &ClassMappers::default());
        assert_eq!(
            names(&classes),
            vec!["com.example.Base", "com.example.Item", "com.example.Tag"]
        );
    }

    #[test]
    fn test_exposed_superclass_and_mappers() {
        let result = scan(
            r#"
- name: com.example.Prices
  annotations: [Endpoint]
  superclass: "com.example.CrudService<com.example.Price>"
  methods:
    - name: total
      result: com.example.Money
- name: com.example.CrudService
  annotations: [EndpointExposed]
  typeParameters: [T]
  methods:
    - name: get
      result: T
- name: com.example.Price
- name: com.example.Money
"#,
        );
        let mut mappers = ClassMappers::default();
        mappers.add("com.example.Money", "java.math.BigDecimal");
        let classes = reachable_classes(&result, &mappers);
        assert_eq!(names(&classes), vec!["com.example.Price"]);
    }

    #[test]
    fn test_location_advances_in_order() {
        let result = scan("- name: com.example.A\n- name: com.example.B\n");
        let a = result.world().get("com.example.A").unwrap().clone();
        let b = result.world().get("com.example.B").unwrap().clone();
        let mut location = ScanLocation::new([ScanItem::new(a.clone(), ScanKind::Entity)]);
        location.push(ScanItem::new(b.clone(), ScanKind::Entity));
        assert!(location.current().is_none());
        assert_eq!(location.advance().map(|i| i.class.clone()), Some(a));
        assert_eq!(location.pending(), 1);
        assert_eq!(location.advance().map(|i| i.class.clone()), Some(b));
        assert!(location.advance().is_none());
    }
}
