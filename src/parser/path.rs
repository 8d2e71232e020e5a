use super::node::{NodeRef, NodeSource};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Pending instruction a plugin left on a path during `enter`.
#[derive(Debug, Clone, Default)]
pub enum PathCommand {
    #[default]
    None,
    /// Drop the node and its subtree; its target is not attached.
    Remove,
    /// Enter these nodes under the path's parent instead.
    Replace(Vec<NodeRef>),
    /// Keep the node's target but visit none of its dependencies.
    Skip,
}

/// A node together with the chain of ancestors it was reached through.
///
/// Cloning is cheap. Two paths are equal when their nodes are equal and
/// their parents are equal, so the same class reached through different
/// endpoints gives different paths.
#[derive(Clone)]
pub struct NodePath(Rc<PathInner>);

struct PathInner {
    node: NodeRef,
    parent: Option<NodePath>,
    command: RefCell<PathCommand>,
}

impl NodePath {
    pub fn root(node: NodeRef) -> Self {
        Self(Rc::new(PathInner {
            node,
            parent: None,
            command: RefCell::new(PathCommand::None),
        }))
    }

    pub fn child(&self, node: NodeRef) -> Self {
        Self(Rc::new(PathInner {
            node,
            parent: Some(self.clone()),
            command: RefCell::new(PathCommand::None),
        }))
    }

    pub fn node(&self) -> &NodeRef {
        &self.0.node
    }

    pub fn source(&self) -> &NodeSource {
        self.0.node.source()
    }

    pub fn parent(&self) -> Option<&NodePath> {
        self.0.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// The topmost path of the chain.
    pub fn root_path(&self) -> &NodePath {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Ancestors from the parent upward.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: self.parent(),
        }
    }

    /// This path followed by its ancestors.
    pub fn self_and_ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Nearest ancestor (or self) whose node matches.
    pub fn find_ancestor(&self, mut predicate: impl FnMut(&NodeSource) -> bool) -> Option<&NodePath> {
        self.self_and_ancestors().find(|p| predicate(p.source()))
    }

    /// Paths hanging directly off the root that are not endpoints: graph
    /// edges scheduled through the dependency controller.
    pub fn is_dependency(&self) -> bool {
        self.parent().is_some_and(NodePath::is_root)
            && !matches!(self.source(), NodeSource::Endpoint(_))
    }

    pub fn remove(&self) {
        *self.0.command.borrow_mut() = PathCommand::Remove;
    }

    pub fn replace(&self, nodes: Vec<NodeRef>) {
        *self.0.command.borrow_mut() = PathCommand::Replace(nodes);
    }

    pub fn skip(&self) {
        *self.0.command.borrow_mut() = PathCommand::Skip;
    }

    pub fn command(&self) -> PathCommand {
        self.0.command.borrow().clone()
    }

    pub fn is_removed(&self) -> bool {
        matches!(*self.0.command.borrow(), PathCommand::Remove)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(*self.0.command.borrow(), PathCommand::Skip)
    }

    /// Whether the node's target should be attached to its parent on exit.
    pub fn is_attachable(&self) -> bool {
        matches!(
            *self.0.command.borrow(),
            PathCommand::None | PathCommand::Skip
        )
    }
}

pub struct Ancestors<'a> {
    next: Option<&'a NodePath>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a NodePath;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

impl PartialEq for NodePath {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
            || (self.0.node == other.0.node && self.0.parent == other.0.parent)
    }
}

impl Eq for NodePath {}

impl Hash for NodePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for path in self.self_and_ancestors() {
            path.0.node.hash(state);
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chain: Vec<_> = self.self_and_ancestors().collect();
        chain.reverse();
        for (i, path) in chain.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{}", path.source())?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({self})")
    }
}
