use crate::model::ClassInfoModel;
use std::collections::HashSet;

/// Run-wide set of entity classes already scheduled.
///
/// Every code path that introduces an entity dependency goes through
/// [`DependencyController::register_if_new`], so a class reachable from
/// many fields, parameters and superclass links is walked exactly once.
#[derive(Debug, Default, Clone)]
pub struct DependencyController {
    visited: HashSet<ClassInfoModel>,
}

impl DependencyController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visited(&self, class: &ClassInfoModel) -> bool {
        self.visited.contains(class)
    }

    pub fn register(&mut self, class: &ClassInfoModel) {
        self.visited.insert(class.clone());
    }

    /// Registers `class` and reports whether it was new.
    pub fn register_if_new(&mut self, class: &ClassInfoModel) -> bool {
        if self.is_visited(class) {
            return false;
        }
        self.register(class);
        true
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}
