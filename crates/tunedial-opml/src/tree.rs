//! Arena-backed outline tree, collapse-aware flattening and the
//! per-variant activation protocol.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`],
//! so the favourites list can hold ids of nodes owned elsewhere in the
//! tree without aliasing or double ownership. Nodes are never removed
//! from the arena; dropping a node from favourites only drops the id.

use crate::codec;
use crate::error::ActivateError;
use crate::fetch::{Fetch, Source};
use crate::node::{NodeId, OutlineKind, OutlineNode};

/// One visible row of the flattened tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub id: NodeId,
    pub depth: usize,
}

/// Terminal activation event: an argument list ready to hand to the
/// external player. At most one per activation, always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayCommand(pub Vec<String>);

pub struct Tree {
    nodes: Vec<OutlineNode>,
    root: NodeId,
}

impl Tree {
    /// Create a tree holding only the synthetic root container. The root
    /// is permanently expanded and never appears in the flattened view;
    /// its children are the depth-0 rows.
    pub fn new() -> Self {
        let mut root = OutlineNode::branch(String::new(), Default::default());
        root.kind = OutlineKind::Branch { collapsed: false };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn alloc(&mut self, node: OutlineNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &OutlineNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut OutlineNode {
        &mut self.nodes[id.0]
    }

    pub fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).children.push(child);
    }

    pub fn insert_child_front(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).children.insert(0, child);
    }

    /// Depth-first pre-order walk of the visible rows. Collapsed
    /// branches and leaves contribute themselves but nothing below.
    pub fn flatten(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        for &child in &self.node(self.root).children {
            self.flatten_into(child, 0, &mut rows);
        }
        rows
    }

    fn flatten_into(&self, id: NodeId, depth: usize, rows: &mut Vec<Row>) {
        rows.push(Row { id, depth });
        if self.node(id).collapsed() == Some(false) {
            for &child in &self.node(id).children {
                self.flatten_into(child, depth + 1, rows);
            }
        }
    }

    /// Run the activation protocol for `id`. Progress messages go to
    /// `progress` as they happen, before the next blocking step; the
    /// play command, if any, is the final result.
    ///
    /// On a fetch or parse failure the node's state is left untouched
    /// (a link stays unloaded with no children), so re-activating
    /// retries.
    pub fn activate(
        &mut self,
        id: NodeId,
        fetcher: &dyn Fetch,
        progress: &mut dyn FnMut(&str),
    ) -> Result<Option<PlayCommand>, ActivateError> {
        match self.node(id).kind.clone() {
            OutlineKind::Branch { .. }
            | OutlineKind::Favourites { .. }
            | OutlineKind::Link { loaded: true, .. } => {
                self.node_mut(id).toggle_collapsed();
                Ok(None)
            }
            OutlineKind::Link {
                url, loaded: false, ..
            } => {
                progress(&format!("Loading {url}"));
                let bytes = fetcher.fetch(&Source::Url(url))?;
                let children = codec::parse_document(self, &bytes)?;
                let node = self.node_mut(id);
                node.children = children;
                if let OutlineKind::Link { loaded, .. } = &mut node.kind {
                    *loaded = true;
                }
                progress("Loading... done");
                self.node_mut(id).toggle_collapsed();
                Ok(None)
            }
            OutlineKind::Audio { url, .. } => {
                progress("Fetching playlist");
                let bytes = fetcher.fetch(&Source::Url(url))?;
                let body = String::from_utf8_lossy(&bytes);
                let location = body.lines().next().unwrap_or("").trim().to_string();
                Ok(Some(PlayCommand(vec![location])))
            }
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
