/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The document node tree (§3 "Node").
//!
//! Nodes are arena-allocated and addressed by `NodeId`. Each node owns a
//! parent pointer and raw doubly-linked sibling pointers; a node's box, once
//! built, is reachable via a weak back pointer set during construction
//! (`box_tree::construct`).

use smallvec::SmallVec;

use crate::arena::{Arena, Id};
use crate::box_tree::BoxId;
use crate::intern::InternedString;

pub type NodeId = Id<Node>;

/// One attribute on an `Element`; `name` is unique within the element.
#[derive(Clone, Debug)]
pub struct Attribute {
    pub name: InternedString,
    pub value: String,
}

#[derive(Clone, Debug, Default)]
pub struct ElementData {
    pub namespace: InternedString,
    pub tag: InternedString,
    pub id: Option<String>,
    pub classes: SmallVec<[InternedString; 4]>,
    pub attributes: Vec<Attribute>,
}

impl ElementData {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.as_str() == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c.as_str() == class)
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

/// A polymorphic tree entity: `Text`, `Element`, or the `Document` root.
pub struct Node {
    pub kind: NodeKind,
    document: Option<NodeId>,
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    /// Set once the box tree is built for this node; `None` for nodes whose
    /// style resolves to `display: none` (§4.1: "null ⇒ display:none, skip").
    pub(crate) layout_box: Option<BoxId>,
}

impl Node {
    fn new(kind: NodeKind, document: Option<NodeId>) -> Self {
        Self {
            kind,
            document,
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
            layout_box: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Owns the arena of nodes for one document and the root node id.
///
/// Invariants (§3): the sibling list is a doubly linked list whose
/// first/last pointers on the parent are consistent; `parent` is non-null
/// except for the root; every child's document id equals the owning tree's
/// root id.
pub struct NodeTree {
    nodes: Arena<Node>,
    root: NodeId,
}

impl NodeTree {
    pub fn new() -> Self {
        let nodes = Arena::new();
        let root = nodes.alloc(Node::new(NodeKind::Document, None));
        nodes.get_mut(root).document = Some(root);
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> atomic_refcell::AtomicRef<'_, Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&self, id: NodeId) -> atomic_refcell::AtomicRefMut<'_, Node> {
        self.nodes.get_mut(id)
    }

    pub fn document_of(&self, id: NodeId) -> NodeId {
        self.nodes.get(id).document.unwrap_or(self.root)
    }

    fn new_node(&self, kind: NodeKind) -> NodeId {
        self.nodes.alloc(Node::new(kind, Some(self.root)))
    }

    pub fn create_element(&self, data: ElementData) -> NodeId {
        self.new_node(NodeKind::Element(data))
    }

    pub fn create_text(&self, text: impl Into<String>) -> NodeId {
        self.new_node(NodeKind::Text(text.into()))
    }

    /// Detaches `child` from its current parent/siblings, if any.
    pub fn detach(&self, child: NodeId) {
        let (parent, prev, next) = {
            let node = self.nodes.get(child);
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if let Some(prev) = prev {
            self.nodes.get_mut(prev).next_sibling = next;
        } else if let Some(parent) = parent {
            self.nodes.get_mut(parent).first_child = next;
        }
        if let Some(next) = next {
            self.nodes.get_mut(next).prev_sibling = prev;
        } else if let Some(parent) = parent {
            self.nodes.get_mut(parent).last_child = prev;
        }
        let node = self.nodes.get_mut(child);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.nodes.get(parent).last_child;
        self.nodes.get_mut(child).parent = Some(parent);
        self.nodes.get_mut(child).prev_sibling = last;
        self.nodes.get_mut(child).next_sibling = None;
        if let Some(last) = last {
            self.nodes.get_mut(last).next_sibling = Some(child);
        } else {
            self.nodes.get_mut(parent).first_child = Some(child);
        }
        self.nodes.get_mut(parent).last_child = Some(child);
    }

    /// Iterates the direct children of `parent`, in sibling order.
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.nodes.get(parent).first_child,
        }
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Children<'a> {
    tree: &'a NodeTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).next_sibling;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_maintains_sibling_links() {
        let tree = NodeTree::new();
        let root = tree.root();
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        let c = tree.create_text("c");
        tree.append_child(root, a);
        tree.append_child(root, b);
        tree.append_child(root, c);
        let order: Vec<_> = tree.children(root).collect();
        assert_eq!(order, vec![a, b, c]);
        assert_eq!(tree.node(b).prev_sibling(), Some(a));
        assert_eq!(tree.node(b).next_sibling(), Some(c));
        assert_eq!(tree.node(c).next_sibling(), None);
    }

    #[test]
    fn detach_then_reappend_is_consistent() {
        let tree = NodeTree::new();
        let root = tree.root();
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.append_child(root, a);
        tree.append_child(root, b);
        tree.detach(a);
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![b]);
        tree.append_child(root, a);
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(tree.node(a).parent(), Some(root));
    }
}
