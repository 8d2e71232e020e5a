use super::dependencies::NodeDependencies;
use super::error::Result;
use super::node::NodeRef;
use super::path::{NodePath, PathCommand};
use super::plugin::Plugin;
use super::storage::SharedStorage;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use tracing::{debug, error};

enum Task {
    Enter(NodePath),
    Exit(NodePath),
}

/// Walks the node graph from a root path, driving one plugin.
///
/// Work lives in a single deque. Entering a path pushes, at the front and
/// in this order, its children, its own exit, then its related
/// dependencies. Children are therefore fully entered and exited before
/// their parent exits, and related entities are walked afterwards as
/// children of the root.
pub struct PluginExecutor<'a> {
    plugin: &'a mut dyn Plugin,
    root: NodePath,
}

impl<'a> PluginExecutor<'a> {
    pub fn new(plugin: &'a mut dyn Plugin, root: NodePath) -> Self {
        Self { plugin, root }
    }

    pub fn execute(self, storage: &mut SharedStorage) -> Result<()> {
        let Self { plugin, root } = self;
        let mut queue = VecDeque::new();
        let mut enqueued = HashSet::new();
        enqueued.insert(root.clone());
        queue.push_back(Task::Enter(root.clone()));

        let mut entered = 0usize;
        let mut exited = 0usize;
        while let Some(task) = queue.pop_front() {
            match task {
                Task::Enter(path) => {
                    entered += 1;
                    let batch = enter(plugin, &root, &path, storage, &mut enqueued)
                        .inspect_err(|e| error!(path = %path, error = %e, "enter failed"))?;
                    for task in batch.into_iter().rev() {
                        queue.push_front(task);
                    }
                }
                Task::Exit(path) => {
                    exited += 1;
                    plugin
                        .exit(&path, storage)
                        .inspect_err(|e| error!(path = %path, error = %e, "exit failed"))?;
                }
            }
        }

        debug!(entered, exited, plugin = plugin.name(), "plugin walk finished");
        Ok(())
    }
}

fn enter(
    plugin: &mut dyn Plugin,
    root: &NodePath,
    path: &NodePath,
    storage: &mut SharedStorage,
    enqueued: &mut HashSet<NodePath>,
) -> Result<Vec<Task>> {
    let dependencies = plugin.scan(NodeDependencies::new(Rc::clone(path.node())), storage)?;
    plugin.enter(path, storage)?;

    let mut batch = Vec::new();
    match path.command() {
        PathCommand::Remove | PathCommand::Skip => {
            batch.push(Task::Exit(path.clone()));
        }
        PathCommand::Replace(nodes) => {
            batch.push(Task::Exit(path.clone()));
            let parent = path.parent().unwrap_or(root).clone();
            push_paths(plugin, &parent, nodes, storage, enqueued, &mut batch)?;
        }
        PathCommand::None => {
            let (children, related) = dependencies.into_parts();
            push_paths(plugin, path, children, storage, enqueued, &mut batch)?;
            batch.push(Task::Exit(path.clone()));
            push_paths(plugin, root, related, storage, enqueued, &mut batch)?;
        }
    }
    Ok(batch)
}

fn push_paths(
    plugin: &mut dyn Plugin,
    parent: &NodePath,
    nodes: Vec<NodeRef>,
    storage: &mut SharedStorage,
    enqueued: &mut HashSet<NodePath>,
    batch: &mut Vec<Task>,
) -> Result<()> {
    for node in nodes {
        let node = plugin.resolve(node, parent, storage)?;
        let path = parent.child(node);
        if enqueued.insert(path.clone()) {
            batch.push(Task::Enter(path));
        }
    }
    Ok(())
}
