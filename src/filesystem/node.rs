use derive_more::Display;
use hashlink::LinkedHashMap;

/// Handle to a node stored in a [`NodeTree`](super::NodeTree).
///
/// Handles are plain indices. A handle to a removed node is stale and must not
/// be used again; the tree panics when it sees one, since that is a bug in the
/// caller rather than a runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("#{_0}")]
pub struct NodeId(usize);

impl NodeId {
    pub(super) fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node is, together with the data only that variant carries.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Directory {
        children: LinkedHashMap<String, NodeId>,
    },
    File {
        content: String,
    },
}

impl NodeKind {
    pub fn directory() -> Self {
        NodeKind::Directory {
            children: LinkedHashMap::new(),
        }
    }

    pub fn file(content: impl Into<String>) -> Self {
        NodeKind::File {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(super) name: String,
    pub(super) parent: Option<NodeId>,
    pub(super) kind: NodeKind,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    /// Ordered children of a directory, `None` for files.
    pub fn children(&self) -> Option<&LinkedHashMap<String, NodeId>> {
        match &self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Directory { .. } => None,
        }
    }
}
