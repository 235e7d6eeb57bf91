use hashlink::LinkedHashMap;
use snafu::{OptionExt, ensure};

use super::error::{
    AlreadyExistsSnafu, InvalidNameSnafu, NamespaceError, NotADirectorySnafu, TargetNotFoundSnafu,
};
use super::node::{Node, NodeId, NodeKind};

/// Arena holding every node of one namespace.
///
/// Nodes refer to each other only through [`NodeId`] handles: a directory maps
/// child names to handles and every node keeps the handle of its parent. The
/// root occupies the first slot and is never removed. Slots of removed nodes
/// are recycled by later insertions.
#[derive(Debug, Clone)]
pub struct NodeTree {
    slots: Vec<Option<Node>>,
    vacant: Vec<usize>,
    root: NodeId,
}

/// Checks that `name` can be used as a single path component.
pub fn validate_name(name: &str) -> Result<(), NamespaceError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    ensure!(valid, InvalidNameSnafu { name });
    Ok(())
}

impl NodeTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = Node {
            name: root_name.into(),
            parent: None,
            kind: NodeKind::directory(),
        };
        NodeTree {
            slots: vec![Some(root)],
            vacant: Vec::new(),
            root: NodeId::new(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.index()), Some(Some(_)))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        match self.slots.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("stale node handle {id}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.slots.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("stale node handle {id}"),
        }
    }

    fn children_mut(&mut self, dir: NodeId) -> Option<&mut LinkedHashMap<String, NodeId>> {
        match &mut self.node_mut(dir).kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    /// Looks up a direct child of `dir`. Files have no children.
    pub fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.node(dir)
            .children()
            .and_then(|children| children.get(name).copied())
    }

    pub fn child_names(&self, dir: NodeId) -> Vec<String> {
        self.node(dir)
            .children()
            .map(|children| children.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Creates a node under `parent` and links it as the last child.
    pub fn insert(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
    ) -> Result<NodeId, NamespaceError> {
        validate_name(name)?;
        let parent_node = self.node(parent);
        let children = parent_node.children().context(NotADirectorySnafu {
            name: parent_node.name(),
        })?;
        ensure!(!children.contains_key(name), AlreadyExistsSnafu { name });

        let node = Node {
            name: name.to_string(),
            parent: Some(parent),
            kind,
        };
        let id = match self.vacant.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId::new(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId::new(self.slots.len() - 1)
            }
        };

        if let Some(children) = self.children_mut(parent) {
            children.insert(name.to_string(), id);
        }
        Ok(id)
    }

    /// Relinks `id` under `new_parent`, keeping its name and its subtree.
    ///
    /// Nothing changes when the call fails.
    pub fn move_node(&mut self, id: NodeId, new_parent: NodeId) -> Result<(), NamespaceError> {
        let name = self.node(id).name.clone();
        let parent_node = self.node(new_parent);
        let children = parent_node.children().context(NotADirectorySnafu {
            name: parent_node.name(),
        })?;
        ensure!(!children.contains_key(&name), AlreadyExistsSnafu { name });
        ensure!(
            id != self.root && !self.is_ancestor(id, new_parent),
            TargetNotFoundSnafu {
                path: self.node(new_parent).name()
            }
        );

        self.unlink(id);
        self.node_mut(id).parent = Some(new_parent);
        if let Some(children) = self.children_mut(new_parent) {
            children.insert(name, id);
        }
        Ok(())
    }

    /// Removes `id` and everything below it, returning how many nodes went away.
    /// The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> usize {
        if id == self.root {
            return 0;
        }
        self.unlink(id);

        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in &doomed {
            self.slots[node.index()] = None;
            self.vacant.push(node.index());
        }
        doomed.len()
    }

    fn unlink(&mut self, id: NodeId) {
        let node = self.node(id);
        let name = node.name.clone();
        if let Some(parent) = node.parent {
            if let Some(children) = self.children_mut(parent) {
                children.remove(&name);
            }
        }
    }

    /// True when `ancestor` is `node` itself or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Every node below `id` in pre-order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if current != id {
                result.push(current);
            }
            if let Some(children) = self.node(current).children() {
                stack.extend(children.values().rev().copied());
            }
        }
        result
    }

    /// Names from just below the root down to `id`. Empty for the root itself.
    pub fn path_names(&self, id: NodeId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            names.push(self.node(current).name());
            current = parent;
        }
        names.reverse();
        names
    }

    /// Follows a sequence of child names from the root.
    pub fn find<S: AsRef<str>>(&self, names: &[S]) -> Option<NodeId> {
        names
            .iter()
            .try_fold(self.root, |current, name| self.child(current, name.as_ref()))
    }
}
