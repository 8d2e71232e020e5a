use super::node::NodeRef;

/// The dependencies plugins found for one node.
///
/// `child_nodes` are structural descendants, entered below the node.
/// `related_nodes` are graph edges (an entity a signature refers to),
/// entered below the root once the node is done.
#[derive(Debug)]
pub struct NodeDependencies {
    node: NodeRef,
    child_nodes: Vec<NodeRef>,
    related_nodes: Vec<NodeRef>,
}

impl NodeDependencies {
    pub fn new(node: NodeRef) -> Self {
        Self {
            node,
            child_nodes: Vec::new(),
            related_nodes: Vec::new(),
        }
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn child_nodes(&self) -> &[NodeRef] {
        &self.child_nodes
    }

    pub fn related_nodes(&self) -> &[NodeRef] {
        &self.related_nodes
    }

    pub fn with_child_nodes(mut self, nodes: impl IntoIterator<Item = NodeRef>) -> Self {
        self.child_nodes.extend(nodes);
        self
    }

    pub fn with_related_nodes(mut self, nodes: impl IntoIterator<Item = NodeRef>) -> Self {
        self.related_nodes.extend(nodes);
        self
    }

    pub fn into_parts(self) -> (Vec<NodeRef>, Vec<NodeRef>) {
        (self.child_nodes, self.related_nodes)
    }
}
