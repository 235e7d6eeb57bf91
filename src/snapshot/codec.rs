use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu, ensure};

use crate::filesystem::{Namespace, NamespaceError, NodeId, NodeKind, NodeTree, validate_name};

/// Plain, acyclic form of a node tree. Parent links are implied by nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SnapshotNode {
    Directory {
        name: String,
        #[serde(default)]
        children: LinkedHashMap<String, SnapshotNode>,
    },
    File {
        name: String,
        #[serde(default)]
        content: String,
    },
}

impl SnapshotNode {
    pub fn name(&self) -> &str {
        match self {
            SnapshotNode::Directory { name, .. } | SnapshotNode::File { name, .. } => name,
        }
    }

    /// Captures `id` and everything below it.
    pub fn capture(tree: &NodeTree, id: NodeId) -> Self {
        let node = tree.node(id);
        match node.kind() {
            NodeKind::Directory { children } => SnapshotNode::Directory {
                name: node.name().to_string(),
                children: children
                    .iter()
                    .map(|(name, child)| (name.clone(), Self::capture(tree, *child)))
                    .collect(),
            },
            NodeKind::File { content } => SnapshotNode::File {
                name: node.name().to_string(),
                content: content.clone(),
            },
        }
    }

    fn rebuild_children(
        children: &LinkedHashMap<String, SnapshotNode>,
        tree: &mut NodeTree,
        parent: NodeId,
    ) -> Result<(), SnapshotError> {
        for (key, child) in children {
            ensure!(
                key == child.name(),
                NameMismatchSnafu {
                    key: key.clone(),
                    name: child.name()
                }
            );
            validate_name(key).context(InvalidEntrySnafu)?;

            match child {
                SnapshotNode::Directory { children, .. } => {
                    let id = tree
                        .insert(parent, key, NodeKind::directory())
                        .context(InvalidEntrySnafu)?;
                    Self::rebuild_children(children, tree, id)?;
                }
                SnapshotNode::File { content, .. } => {
                    tree.insert(parent, key, NodeKind::file(content.as_str()))
                        .context(InvalidEntrySnafu)?;
                }
            }
        }
        Ok(())
    }
}

impl TryFrom<&SnapshotNode> for NodeTree {
    type Error = SnapshotError;

    fn try_from(snapshot: &SnapshotNode) -> Result<Self, Self::Error> {
        let SnapshotNode::Directory { name, children } = snapshot else {
            return Err(SnapshotError::RootNotDirectory {
                name: snapshot.name().to_string(),
            });
        };

        let mut tree = NodeTree::new(name.as_str());
        let root = tree.root();
        SnapshotNode::rebuild_children(children, &mut tree, root)?;
        Ok(tree)
    }
}

impl Namespace {
    pub fn export_snapshot(&self) -> SnapshotNode {
        SnapshotNode::capture(self.tree(), self.tree().root())
    }

    /// Replaces the whole tree with `snapshot` and mirrors it onto disk.
    /// The cursor returns to root.
    pub fn restore_snapshot(&mut self, snapshot: &SnapshotNode) -> Result<(), SnapshotError> {
        let tree = NodeTree::try_from(snapshot)?;
        self.install_tree(tree).context(MaterializeSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum SnapshotError {
    #[snafu(display("Snapshot root '{}' must be a directory", name))]
    RootNotDirectory { name: String },
    #[snafu(display("Snapshot entry '{}' is stored under the key '{}'", name, key))]
    NameMismatch { key: String, name: String },
    #[snafu(display("Snapshot contains an invalid entry"))]
    InvalidEntry { source: NamespaceError },
    #[snafu(display("Failed to mirror the snapshot onto disk"))]
    Materialize { source: NamespaceError },
}
