use alloc::vec::Vec;

use crate::Item;

/// Identity of an item inside the current collection.
///
/// Ids are assigned when a collection is supplied and stay valid until the next one replaces
/// it. They are never reused within a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub(crate) usize);

impl ItemId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) item: Item,
    pub(crate) parent: Option<ItemId>,
    pub(crate) children: Vec<ItemId>,
    pub(crate) depth: usize,
}

/// Arena holding the source collection. Parent links are plain ids, so there are no reference
/// cycles between parents and children.
#[derive(Clone, Debug, Default)]
pub(crate) struct ItemStore {
    nodes: Vec<Node>,
    roots: Vec<ItemId>,
}

impl ItemStore {
    pub(crate) fn from_items(items: Vec<Item>, children_field: &str) -> Self {
        let mut store = Self::default();
        store.append(items, children_field);
        store
    }

    /// Adds `items` as new roots after the existing ones.
    pub(crate) fn append(&mut self, items: Vec<Item>, children_field: &str) {
        for item in items {
            let id = self.insert(item, None, 0, children_field);
            self.roots.push(id);
        }
    }

    fn insert(
        &mut self,
        mut item: Item,
        parent: Option<ItemId>,
        depth: usize,
        children_field: &str,
    ) -> ItemId {
        let children = item.take_children(children_field);
        let id = ItemId(self.nodes.len());
        self.nodes.push(Node {
            item,
            parent,
            children: Vec::with_capacity(children.len()),
            depth,
        });
        for child in children {
            let child_id = self.insert(child, Some(id), depth + 1, children_field);
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn roots(&self) -> &[ItemId] {
        &self.roots
    }

    pub(crate) fn node(&self, id: ItemId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn item(&self, id: ItemId) -> Option<&Item> {
        self.nodes.get(id.0).map(|n| &n.item)
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.nodes.get_mut(id.0).map(|n| &mut n.item)
    }

    pub(crate) fn children(&self, id: ItemId) -> &[ItemId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// All ids in depth-first (display) order.
    pub(crate) fn depth_first(&self) -> Vec<ItemId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<ItemId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub(crate) fn is_ancestor(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut cur = self.node(id).and_then(|n| n.parent);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.node(p).and_then(|n| n.parent);
        }
        false
    }

    fn siblings_mut(&mut self, parent: Option<ItemId>) -> &mut Vec<ItemId> {
        match parent {
            Some(p) => &mut self.nodes[p.0].children,
            None => &mut self.roots,
        }
    }

    /// Moves `id` (with its subtree) next to `anchor`, becoming its sibling.
    ///
    /// Returns `false` when the move would place a node inside its own subtree.
    pub(crate) fn move_next_to(&mut self, id: ItemId, anchor: ItemId, after: bool) -> bool {
        if id == anchor || self.node(id).is_none() || self.node(anchor).is_none() {
            return false;
        }
        if self.is_ancestor(id, anchor) {
            return false;
        }

        let old_parent = self.nodes[id.0].parent;
        self.siblings_mut(old_parent).retain(|&s| s != id);

        let new_parent = self.nodes[anchor.0].parent;
        let siblings = self.siblings_mut(new_parent);
        let pos = siblings
            .iter()
            .position(|&s| s == anchor)
            .unwrap_or(siblings.len());
        let pos = if after { pos + 1 } else { pos };
        siblings.insert(pos.min(siblings.len()), id);

        self.nodes[id.0].parent = new_parent;
        let depth = new_parent.map_or(0, |p| self.nodes[p.0].depth + 1);
        self.set_depth(id, depth);
        true
    }

    fn set_depth(&mut self, id: ItemId, depth: usize) {
        self.nodes[id.0].depth = depth;
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.set_depth(child, depth + 1);
        }
    }

    /// Rebuilds the nested collection, reflecting reorders and state changes.
    pub(crate) fn to_items(&self, children_field: &str) -> Vec<Item> {
        self.roots
            .iter()
            .map(|&id| self.to_item(id, children_field))
            .collect()
    }

    fn to_item(&self, id: ItemId, children_field: &str) -> Item {
        let node = &self.nodes[id.0];
        let mut item = node.item.clone();
        if !node.children.is_empty() {
            let children = node
                .children
                .iter()
                .map(|&c| self.to_item(c, children_field))
                .collect();
            item = item.with_children(children_field, children);
        }
        item
    }
}
