//! Favourites store: a distinguished root node whose children are ids
//! of nodes owned elsewhere in the tree.
//!
//! Membership is by node id, so the same station appearing twice in the
//! directory is two distinct favourites candidates, and removing a
//! favourite never destroys the underlying node. The store is written
//! back on exit only when something actually changed.

use std::path::PathBuf;

use tracing::warn;

use crate::codec;
use crate::error::PersistenceError;
use crate::node::{NodeId, OutlineKind, OutlineNode};
use crate::platform;
use crate::tree::Tree;

pub struct Favourites {
    id: NodeId,
    path: PathBuf,
}

impl Favourites {
    /// Load from the fixed per-user location, or start empty.
    pub fn load(tree: &mut Tree) -> Self {
        Self::load_from(tree, platform::favourites_path())
    }

    /// Load from `path` if it exists. A malformed or unreadable file is
    /// reported and treated as empty; the session still gets a working
    /// favourites list.
    pub fn load_from(tree: &mut Tree, path: PathBuf) -> Self {
        let id = tree.alloc(OutlineNode::favourites());
        if path.exists() {
            match std::fs::read(&path) {
                Ok(bytes) => match codec::parse_document(tree, &bytes) {
                    Ok(children) => tree.node_mut(id).children = children,
                    Err(e) => warn!("ignoring malformed favourites at {}: {e}", path.display()),
                },
                Err(e) => warn!("could not read favourites at {}: {e}", path.display()),
            }
        }
        Self { id, path }
    }

    /// Id of the favourites root node in the tree.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn contains(&self, tree: &Tree, id: NodeId) -> bool {
        tree.node(self.id).children.contains(&id)
    }

    /// Add or remove a node from the favourites list and mark the store
    /// dirty. The favourites root itself is not toggleable: it would
    /// become its own descendant in the flattened view.
    pub fn toggle(&self, tree: &mut Tree, id: NodeId) {
        if id == self.id {
            return;
        }
        let node = tree.node_mut(self.id);
        if let Some(pos) = node.children.iter().position(|&c| c == id) {
            node.children.remove(pos);
        } else {
            node.children.push(id);
        }
        if let OutlineKind::Favourites { dirty, .. } = &mut node.kind {
            *dirty = true;
        }
    }

    pub fn is_dirty(&self, tree: &Tree) -> bool {
        matches!(
            tree.node(self.id).kind,
            OutlineKind::Favourites { dirty: true, .. }
        )
    }

    /// Write the favourites document, but only when dirty.
    pub fn persist(&self, tree: &Tree) -> Result<(), PersistenceError> {
        if !self.is_dirty(tree) {
            return Ok(());
        }
        let bytes = codec::write_document(tree, self.id)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PersistenceError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, bytes).map_err(|source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Attributes;

    fn station(tree: &mut Tree, text: &str) -> NodeId {
        let mut attrs = Attributes::new();
        attrs.insert("URL".to_string(), format!("https://x/{text}.pls"));
        attrs.insert("type".to_string(), "audio".to_string());
        attrs.insert("text".to_string(), text.to_string());
        let id = tree.alloc(OutlineNode::audio(text.to_string(), attrs).unwrap());
        let root = tree.root();
        tree.push_child(root, id);
        id
    }

    #[test]
    fn toggle_is_its_own_inverse_and_always_dirties() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Tree::new();
        let favs = Favourites::load_from(&mut tree, dir.path().join("favourites.opml"));
        let s = station(&mut tree, "s");

        favs.toggle(&mut tree, s);
        assert!(favs.contains(&tree, s));
        assert!(favs.is_dirty(&tree));

        favs.toggle(&mut tree, s);
        assert!(!favs.contains(&tree, s));
        assert!(favs.is_dirty(&tree));
    }

    #[test]
    fn membership_has_no_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Tree::new();
        let favs = Favourites::load_from(&mut tree, dir.path().join("favourites.opml"));
        let s = station(&mut tree, "s");

        favs.toggle(&mut tree, s);
        favs.toggle(&mut tree, s);
        favs.toggle(&mut tree, s);
        assert_eq!(tree.node(favs.id()).children, vec![s]);
    }

    #[test]
    fn favourites_root_is_not_toggleable() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Tree::new();
        let favs = Favourites::load_from(&mut tree, dir.path().join("favourites.opml"));
        favs.toggle(&mut tree, favs.id());
        assert!(tree.node(favs.id()).children.is_empty());
        assert!(!favs.is_dirty(&tree));
    }

    #[test]
    fn persist_is_a_no_op_while_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favourites.opml");
        let mut tree = Tree::new();
        let favs = Favourites::load_from(&mut tree, path.clone());
        favs.persist(&tree).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn persist_then_load_round_trips_members() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favourites.opml");

        let mut tree = Tree::new();
        let favs = Favourites::load_from(&mut tree, path.clone());
        let a = station(&mut tree, "alpha");
        let b = station(&mut tree, "beta");
        favs.toggle(&mut tree, a);
        favs.toggle(&mut tree, b);
        favs.persist(&tree).unwrap();
        assert!(path.exists());

        let mut tree2 = Tree::new();
        let favs2 = Favourites::load_from(&mut tree2, path);
        let loaded = &tree2.node(favs2.id()).children;
        assert_eq!(loaded.len(), 2);
        assert_eq!(tree2.node(loaded[0]).text, "alpha");
        assert_eq!(tree2.node(loaded[1]).text, "beta");
        // Freshly loaded favourites are clean until the next toggle.
        assert!(!favs2.is_dirty(&tree2));
    }
}
