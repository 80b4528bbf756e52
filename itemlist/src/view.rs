use alloc::vec::Vec;

use crate::{GroupHeader, ItemId};

/// What a view row displays.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowKind {
    Item(ItemId),
    Group(GroupHeader),
}

impl RowKind {
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            Self::Item(id) => Some(*id),
            Self::Group(_) => None,
        }
    }
}

/// One row of the flattened view list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewRow {
    pub kind: RowKind,
    /// Visual depth: enclosing group levels plus the item's own depth.
    pub depth: usize,
    pub collapsible: bool,
    pub collapsed: bool,
    /// Size hint in the scroll axis, if the item carries one.
    pub size: Option<u32>,
}

impl ViewRow {
    pub fn item_id(&self) -> Option<ItemId> {
        self.kind.item_id()
    }

    pub fn group(&self) -> Option<&GroupHeader> {
        match &self.kind {
            RowKind::Group(header) => Some(header),
            RowKind::Item(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, RowKind::Group(_))
    }
}

/// The flattened, filtered, grouped and sorted rows as they would render without
/// virtualization.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewList {
    rows: Vec<ViewRow>,
    depth_max: usize,
}

pub(crate) static EMPTY_VIEW: ViewList = ViewList {
    rows: Vec::new(),
    depth_max: 0,
};

impl ViewList {
    pub(crate) fn new(rows: Vec<ViewRow>) -> Self {
        let depth_max = rows.iter().map(|r| r.depth).max().unwrap_or(0);
        Self { rows, depth_max }
    }

    pub fn rows(&self) -> &[ViewRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [ViewRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Deepest row depth in the list (0 when empty).
    pub fn depth_max(&self) -> usize {
        self.depth_max
    }

    pub fn get(&self, index: usize) -> Option<&ViewRow> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, ViewRow> {
        self.rows.iter()
    }

    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> {
        self.rows.iter().filter_map(ViewRow::item_id)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.rows.iter().position(|r| r.item_id() == Some(id))
    }

    /// Exclusive end of the row's visible subtree: scans forward while depth is greater.
    pub fn subtree_end(&self, index: usize) -> usize {
        let Some(row) = self.rows.get(index) else {
            return index;
        };
        let mut end = index + 1;
        while end < self.rows.len() && self.rows[end].depth > row.depth {
            end += 1;
        }
        end
    }

    /// Index of the nearest preceding row with a smaller depth.
    pub fn parent_index(&self, index: usize) -> Option<usize> {
        let depth = self.rows.get(index)?.depth;
        (0..index).rev().find(|&i| self.rows[i].depth < depth)
    }
}

impl<'a> IntoIterator for &'a ViewList {
    type Item = &'a ViewRow;
    type IntoIter = core::slice::Iter<'a, ViewRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
