use super::class::ClassInfoModel;
use super::error::DescriptorError;
use std::collections::{BTreeMap, HashSet};

/// The closed world of described classes, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct ClassWorld {
    classes: BTreeMap<String, ClassInfoModel>,
}

impl ClassWorld {
    pub fn new(classes: impl IntoIterator<Item = ClassInfoModel>) -> Result<Self, DescriptorError> {
        let mut world = Self::default();
        for class in classes {
            world.insert(class)?;
        }
        Ok(world)
    }

    pub fn insert(&mut self, class: ClassInfoModel) -> Result<(), DescriptorError> {
        if self.classes.contains_key(class.name()) {
            return Err(DescriptorError::DuplicateClass(class.name().to_string()));
        }
        self.classes.insert(class.name().to_string(), class);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ClassInfoModel> {
        self.classes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassInfoModel> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Whether `name` is, extends or implements any of `targets`, following
    /// described supertypes only.
    pub fn is_assignable_to_any(&self, name: &str, targets: &[&str]) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![name.to_string()];
        while let Some(current) = pending.pop() {
            if targets.contains(&current.as_str()) {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(class) = self.classes.get(&current) {
                pending.extend(
                    class
                        .superclass()
                        .into_iter()
                        .chain(class.interfaces())
                        .filter_map(|s| s.class_name().map(str::to_string)),
                );
            }
        }
        false
    }

    /// The described superclass of `class`, if any.
    pub fn superclass_of(&self, class: &ClassInfoModel) -> Option<&ClassInfoModel> {
        class
            .superclass()
            .and_then(|s| s.class_name())
            .and_then(|name| self.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::{parse_descriptors, DescriptorFormat};

    fn world(yaml: &str) -> ClassWorld {
        let classes = parse_descriptors(yaml, DescriptorFormat::Yaml).unwrap();
        ClassWorld::new(classes.into_iter().map(ClassInfoModel::new)).unwrap()
    }

    #[test]
    fn test_assignability_through_supertypes() {
        let world = world(
            r#"
- name: com.example.Tags
  superclass: "java.util.ArrayList<String>"
- name: com.example.SpecialTags
  superclass: com.example.Tags
- name: com.example.Plain
"#,
        );
        assert!(world.is_assignable_to_any("com.example.SpecialTags", &["java.util.ArrayList"]));
        assert!(!world.is_assignable_to_any("com.example.Plain", &["java.util.ArrayList"]));
    }

    #[test]
    fn test_duplicate_classes_are_rejected() {
        let classes = parse_descriptors(
            "- name: com.example.A\n- name: com.example.A\n",
            DescriptorFormat::Yaml,
        )
        .unwrap();
        let err = ClassWorld::new(classes.into_iter().map(ClassInfoModel::new)).unwrap_err();
        assert_eq!(err, DescriptorError::DuplicateClass("com.example.A".into()));
    }

    #[test]
    fn test_cyclic_supertypes_terminate() {
        let world = world(
            r#"
- name: com.example.A
  superclass: com.example.B
- name: com.example.B
  superclass: com.example.A
"#,
        );
        assert!(!world.is_assignable_to_any("com.example.A", &["java.util.Map"]));
    }
}
