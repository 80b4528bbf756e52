use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{ListError, Result};
use crate::grouping::{self, GroupHeader, GroupInfo};
use crate::query::Matcher;
use crate::sorting::{self, SortInfo};
use crate::store::{ItemId, ItemStore};
use crate::view::EMPTY_VIEW;
use crate::{Item, Query, RowKind, Value, ViewList, ViewRow};

pub const DEFAULT_CHILDREN_FIELD: &str = "items";
pub const DEFAULT_TEXT_FIELD: &str = "displayName";
pub const DEFAULT_VALUE_FIELD: &str = "value";

/// Configuration for [`ItemList`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemListOptions {
    /// Field holding an item's children.
    pub children_field: String,
    /// Field used for display text and default sorting.
    pub text_field: String,
    /// Field used to match items across collections (see
    /// [`ItemList::set_items_preserving_selection`]).
    pub value_field: String,
    /// Field consulted by queries and type-ahead. Falls back to `text_field`.
    pub search_field: Option<String>,
    /// Text queries shorter than this produce an empty view.
    pub min_search_length: usize,
    pub multi_select: bool,
    /// Excludes selected items (and their subtrees) from the view.
    pub hide_selected: bool,
}

impl Default for ItemListOptions {
    fn default() -> Self {
        Self {
            children_field: DEFAULT_CHILDREN_FIELD.into(),
            text_field: DEFAULT_TEXT_FIELD.into(),
            value_field: DEFAULT_VALUE_FIELD.into(),
            search_field: None,
            min_search_length: 0,
            multi_select: false,
            hide_selected: false,
        }
    }
}

impl ItemListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_children_field(mut self, field: impl Into<String>) -> Self {
        self.children_field = field.into();
        self
    }

    pub fn with_text_field(mut self, field: impl Into<String>) -> Self {
        self.text_field = field.into();
        self
    }

    pub fn with_value_field(mut self, field: impl Into<String>) -> Self {
        self.value_field = field.into();
        self
    }

    pub fn with_search_field(mut self, field: impl Into<String>) -> Self {
        self.search_field = Some(field.into());
        self
    }

    pub fn with_min_search_length(mut self, len: usize) -> Self {
        self.min_search_length = len;
        self
    }

    pub fn with_multi_select(mut self, multi_select: bool) -> Self {
        self.multi_select = multi_select;
        self
    }

    pub fn with_hide_selected(mut self, hide_selected: bool) -> Self {
        self.hide_selected = hide_selected;
        self
    }

    /// The field queries and type-ahead read.
    pub fn search_field(&self) -> &str {
        self.search_field.as_deref().unwrap_or(&self.text_field)
    }
}

/// Where an item sits among its siblings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParentInfo {
    pub parent: Option<ItemId>,
    /// Position among the parent's children (or among the roots).
    pub index: usize,
    pub siblings: usize,
}

#[derive(Clone, Debug)]
struct ViewCache {
    revision: u64,
    query: Option<Query>,
    list: ViewList,
}

/// The list service.
///
/// Owns the item collection, the selection (stored on the items themselves), sort and group
/// descriptors, expand/collapse state, and a cache of the last computed [`ViewList`].
///
/// Every mutation that can change the view bumps an internal revision; the cache is reused only
/// while both the revision and the query match.
#[derive(Clone, Debug, Default)]
pub struct ItemList {
    options: ItemListOptions,
    store: ItemStore,
    sort_infos: Vec<SortInfo>,
    group_infos: Vec<GroupInfo>,
    group_collapsed: BTreeMap<Vec<String>, bool>,
    groups_collapsed_by_default: bool,
    revision: u64,
    query: Option<Query>,
    cache: Option<ViewCache>,
}

impl ItemList {
    pub fn new(options: ItemListOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ItemListOptions {
        &self.options
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn touch_selection(&mut self) {
        if self.options.hide_selected {
            self.touch();
        }
    }

    pub fn is_multi_select(&self) -> bool {
        self.options.multi_select
    }

    /// Switching to single-select keeps only the first selected item.
    pub fn set_multi_select(&mut self, multi_select: bool) {
        if self.options.multi_select == multi_select {
            return;
        }
        self.options.multi_select = multi_select;
        if !multi_select {
            self.keep_first_selected();
        }
    }

    pub fn set_hide_selected(&mut self, hide_selected: bool) {
        if self.options.hide_selected == hide_selected {
            return;
        }
        self.options.hide_selected = hide_selected;
        self.touch();
    }

    pub fn set_search_field(&mut self, field: Option<String>) {
        self.options.search_field = field;
        self.touch();
    }

    pub fn set_text_field(&mut self, field: impl Into<String>) {
        self.options.text_field = field.into();
        self.touch();
    }

    pub fn set_value_field(&mut self, field: impl Into<String>) {
        self.options.value_field = field.into();
    }

    pub fn set_min_search_length(&mut self, len: usize) {
        self.options.min_search_length = len;
        self.touch();
    }

    /// Changes the children field, re-reading the hierarchy of the current collection.
    pub fn set_children_field(&mut self, field: impl Into<String>) {
        let field = field.into();
        if self.options.children_field == field {
            return;
        }
        let items = self.store.to_items(&self.options.children_field);
        self.options.children_field = field;
        self.store = ItemStore::from_items(items, &self.options.children_field);
        self.touch();
    }

    /// Replaces the collection. Selection becomes whatever the new items carry.
    pub fn set_items(&mut self, items: Vec<Item>) {
        ldebug!(roots = items.len(), "ItemList::set_items");
        self.store = ItemStore::from_items(items, &self.options.children_field);
        self.cache = None;
        self.touch();
        if !self.options.multi_select {
            self.keep_first_selected();
        }
    }

    /// Appends root items to the collection (incremental loading). Existing ids stay valid.
    pub fn append_items(&mut self, items: Vec<Item>) {
        if items.is_empty() {
            return;
        }
        ldebug!(roots = items.len(), "ItemList::append_items");
        self.store.append(items, &self.options.children_field);
        self.touch();
        if !self.options.multi_select {
            self.keep_first_selected();
        }
    }

    /// Replaces the collection, re-selecting new items whose value field equals the value field
    /// of a previously selected item.
    pub fn set_items_preserving_selection(&mut self, items: Vec<Item>) {
        let field = self.options.value_field.clone();
        let previous: Vec<Value> = self
            .selected_items()
            .into_iter()
            .filter_map(|id| self.store.item(id)?.get(&field).cloned())
            .collect();

        self.set_items(items);
        if previous.is_empty() {
            return;
        }

        for id in self.store.depth_first() {
            if let Some(item) = self.store.item_mut(id) {
                if item.selectable && item.get(&field).is_some_and(|v| previous.contains(v)) {
                    item.selected = true;
                }
            }
        }
        if !self.options.multi_select {
            self.keep_first_selected();
        }
        self.touch_selection();
    }

    /// The current collection as nested items (reflecting reorders and row state).
    pub fn items(&self) -> Vec<Item> {
        self.store.to_items(&self.options.children_field)
    }

    /// Number of items in the collection, at every depth.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn roots(&self) -> &[ItemId] {
        self.store.roots()
    }

    /// Every item id in pre-order (parents before children, siblings in source order).
    pub fn depth_first(&self) -> Vec<ItemId> {
        self.store.depth_first()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.store.item(id)
    }

    pub fn children(&self, id: ItemId) -> &[ItemId] {
        self.store.children(id)
    }

    pub fn depth(&self, id: ItemId) -> Option<usize> {
        self.store.node(id).map(|n| n.depth)
    }

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.store.node(id)?.parent
    }

    pub fn parent_info(&self, id: ItemId) -> Option<ParentInfo> {
        let node = self.store.node(id)?;
        let siblings = match node.parent {
            Some(p) => self.store.children(p),
            None => self.store.roots(),
        };
        Some(ParentInfo {
            parent: node.parent,
            index: siblings.iter().position(|&s| s == id)?,
            siblings: siblings.len(),
        })
    }

    /// Display text of an item (text field).
    pub fn text_of(&self, id: ItemId) -> String {
        self.store
            .item(id)
            .map(|it| it.text(&self.options.text_field))
            .unwrap_or_default()
    }

    /// Mutates an item's fields. Any cached view is invalidated.
    pub fn update_item(&mut self, id: ItemId, f: impl FnOnce(&mut Item)) -> bool {
        let Some(item) = self.store.item_mut(id) else {
            return false;
        };
        f(item);
        self.touch();
        true
    }

    /// Records a display-size hint. The cached view is patched in place; order is unaffected.
    pub fn set_item_size(&mut self, id: ItemId, size: Option<u32>) -> bool {
        let Some(item) = self.store.item_mut(id) else {
            return false;
        };
        item.size = size;
        if let Some(cache) = &mut self.cache {
            for row in cache.list.rows_mut() {
                if row.item_id() == Some(id) {
                    row.size = size;
                }
            }
        }
        true
    }

    pub fn sort_infos(&self) -> &[SortInfo] {
        &self.sort_infos
    }

    pub fn set_sort(&mut self, infos: Vec<SortInfo>) {
        self.sort_infos = infos;
        self.touch();
    }

    /// Sorts by `field` (the text field when `None`).
    ///
    /// Sorting again by the current field flips the order; a new field starts ascending.
    pub fn sort_by(&mut self, field: Option<&str>) -> SortInfo {
        let field: String = field.map_or_else(|| self.options.text_field.clone(), String::from);
        let info = match self.sort_infos.first() {
            Some(cur) if cur.key.field_name() == Some(field.as_str()) => SortInfo {
                order: cur.order.toggled(),
                ..cur.clone()
            },
            _ => SortInfo::ascending(field),
        };
        ldebug!(order = ?info.order, "ItemList::sort_by");
        self.sort_infos = alloc::vec![info.clone()];
        self.touch();
        info
    }

    pub fn clear_sort(&mut self) {
        if self.sort_infos.is_empty() {
            return;
        }
        self.sort_infos.clear();
        self.touch();
    }

    pub fn group_infos(&self) -> &[GroupInfo] {
        &self.group_infos
    }

    pub fn group(&mut self, infos: Vec<GroupInfo>) {
        self.group_infos = infos;
        self.touch();
    }

    pub fn ungroup(&mut self, info: &GroupInfo) -> bool {
        let removed = grouping::ungroup(&mut self.group_infos, info);
        if removed {
            self.touch();
        }
        removed
    }

    /// Returns the flattened view for `query`, recomputing it only when stale.
    ///
    /// Pipeline: filter (an item stays when it or a descendant matches) → group → sort →
    /// flatten, skipping descendants of collapsed rows. A text query shorter than
    /// `min_search_length` yields an empty view.
    pub fn view_list(&mut self, query: Option<&Query>) -> &ViewList {
        let cache = match self.cache.take() {
            Some(c) if c.revision == self.revision && c.query.as_ref() == query => c,
            _ => {
                ltrace!(revision = self.revision, "ItemList::view_list recompute");
                ViewCache {
                    revision: self.revision,
                    query: query.cloned(),
                    list: self.compute_view(query),
                }
            }
        };
        self.query = query.cloned();
        &self.cache.insert(cache).list
    }

    /// The view for the last query used.
    pub fn current_view(&mut self) -> &ViewList {
        self.ensure_cache();
        self.view()
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// The cached view, if it is still valid.
    pub fn cached_view(&self) -> Option<&ViewList> {
        self.cache
            .as_ref()
            .filter(|c| c.revision == self.revision)
            .map(|c| &c.list)
    }

    pub fn has_cache(&self) -> bool {
        self.cached_view().is_some()
    }

    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.touch();
    }

    fn ensure_cache(&mut self) {
        let query = self.query.clone();
        self.view_list(query.as_ref());
    }

    fn view(&self) -> &ViewList {
        match &self.cache {
            Some(c) => &c.list,
            None => &EMPTY_VIEW,
        }
    }

    /// Row at `index` in the current view.
    pub fn row(&mut self, index: usize) -> Option<&ViewRow> {
        self.ensure_cache();
        self.view().get(index)
    }

    /// Item displayed at `index` in the current view.
    pub fn item_at(&mut self, index: usize) -> Option<&Item> {
        self.ensure_cache();
        let id = self.view().get(index)?.item_id()?;
        self.store.item(id)
    }

    /// Index of `id` in the current view.
    pub fn item_index(&mut self, id: ItemId) -> Option<usize> {
        self.ensure_cache();
        self.view().position(id)
    }

    /// Id of the item displayed at `index`; group headers are rejected.
    pub fn item_id_at(&mut self, index: usize) -> Result<ItemId> {
        self.row_at(index)?
            .item_id()
            .ok_or(ListError::NotAnItem { index })
    }

    fn row_at(&mut self, index: usize) -> Result<ViewRow> {
        self.ensure_cache();
        let view = self.view();
        view.get(index)
            .cloned()
            .ok_or_else(|| ListError::out_of_range(index, view.len()))
    }

    fn compute_view(&self, query: Option<&Query>) -> ViewList {
        if let Some(len) = query.and_then(Query::text_len) {
            if len < self.options.min_search_length {
                ldebug!(
                    len,
                    min = self.options.min_search_length,
                    "query shorter than minimum search length"
                );
                return ViewList::default();
            }
        }
        if self.store.is_empty() {
            return ViewList::default();
        }

        let visible = self.visibility(query);
        let roots: Vec<ItemId> = self
            .store
            .roots()
            .iter()
            .copied()
            .filter(|id| visible[id.0])
            .collect();

        let mut rows = Vec::new();
        self.emit_level(roots, 0, &mut Vec::new(), &visible, &mut rows);
        ViewList::new(rows)
    }

    fn visibility(&self, query: Option<&Query>) -> Vec<bool> {
        let mut visible = alloc::vec![true; self.store.len()];
        let matcher = query.map(Query::matcher);
        for &root in self.store.roots() {
            self.mark_visible(root, matcher.as_ref(), &mut visible);
        }
        visible
    }

    /// Returns whether `id` stays in the view.
    fn mark_visible(&self, id: ItemId, matcher: Option<&Matcher<'_>>, visible: &mut [bool]) -> bool {
        let Some(node) = self.store.node(id) else {
            return false;
        };
        if self.options.hide_selected && node.item.selected {
            visible[id.0] = false;
            return false;
        }

        let mut any_child = false;
        for &child in &node.children {
            any_child |= self.mark_visible(child, matcher, visible);
        }

        let keep = match matcher {
            None => true,
            Some(m) => any_child || m.is_match(&node.item.text(self.options.search_field())),
        };
        visible[id.0] = keep;
        keep
    }

    fn emit_level(
        &self,
        members: Vec<ItemId>,
        level: usize,
        path: &mut Vec<String>,
        visible: &[bool],
        rows: &mut Vec<ViewRow>,
    ) {
        let Some(info) = self.group_infos.get(level) else {
            for id in self.sorted(members) {
                self.emit_item(id, level, visible, rows);
            }
            return;
        };

        for b in grouping::bucket(self.with_items(members), info, |m| m.1) {
            path.push(b.key.clone());
            let collapsed = self.is_group_collapsed(path);
            rows.push(ViewRow {
                kind: RowKind::Group(GroupHeader {
                    level,
                    key: b.key,
                    path: path.clone(),
                    count: b.members.len(),
                }),
                depth: level,
                collapsible: true,
                collapsed,
                size: None,
            });
            if !collapsed {
                let ids = b.members.into_iter().map(|m| m.0).collect();
                self.emit_level(ids, level + 1, path, visible, rows);
            }
            path.pop();
        }
    }

    fn emit_item(&self, id: ItemId, depth: usize, visible: &[bool], rows: &mut Vec<ViewRow>) {
        let Some(node) = self.store.node(id) else {
            return;
        };
        let children: Vec<ItemId> = node
            .children
            .iter()
            .copied()
            .filter(|c| visible[c.0])
            .collect();

        rows.push(ViewRow {
            kind: RowKind::Item(id),
            depth,
            collapsible: !children.is_empty() && node.item.collapsible,
            collapsed: node.item.collapsed,
            size: node.item.size,
        });

        if node.item.collapsed {
            return;
        }
        for child in self.sorted(children) {
            self.emit_item(child, depth + 1, visible, rows);
        }
    }

    fn with_items(&self, ids: Vec<ItemId>) -> Vec<(ItemId, &Item)> {
        ids.into_iter()
            .filter_map(|id| Some((id, self.store.item(id)?)))
            .collect()
    }

    fn sorted(&self, ids: Vec<ItemId>) -> Vec<ItemId> {
        if self.sort_infos.is_empty() {
            return ids;
        }
        let mut pairs = self.with_items(ids);
        sorting::sort_by_item(&mut pairs, &self.sort_infos, |p| p.1);
        pairs.into_iter().map(|p| p.0).collect()
    }

    fn is_group_collapsed(&self, path: &[String]) -> bool {
        self.group_collapsed
            .get(path)
            .copied()
            .unwrap_or(self.groups_collapsed_by_default)
    }

    fn keep_first_selected(&mut self) {
        let mut seen = false;
        let mut changed = false;
        for id in self.store.depth_first() {
            if let Some(item) = self.store.item_mut(id) {
                if item.selected {
                    if seen {
                        item.selected = false;
                        changed = true;
                    }
                    seen = true;
                }
            }
        }
        if changed {
            self.touch_selection();
        }
    }

    /// Selected items in display (depth-first) order.
    pub fn selected_items(&self) -> Vec<ItemId> {
        self.store
            .depth_first()
            .into_iter()
            .filter(|&id| self.store.item(id).is_some_and(|it| it.selected))
            .collect()
    }

    /// The selected item of a single-select list.
    ///
    /// Rejected with [`ListError::MultiSelectActive`] on multi-select lists.
    pub fn selected_item(&self) -> Result<Option<ItemId>> {
        if self.options.multi_select {
            return Err(ListError::MultiSelectActive);
        }
        Ok(self.selected_items().into_iter().next())
    }

    /// Replaces the selection. Unselectable items are skipped.
    pub fn set_selected_items(&mut self, ids: &[ItemId]) -> Result<()> {
        if !self.options.multi_select && ids.len() > 1 {
            return Err(ListError::TooManySelected { count: ids.len() });
        }
        for id in (0..self.store.len()).map(ItemId) {
            if let Some(item) = self.store.item_mut(id) {
                item.selected = item.selectable && ids.contains(&id);
            }
        }
        self.touch_selection();
        Ok(())
    }

    /// Selects or deselects `ids`, returning the items whose state changed.
    ///
    /// On single-select lists, selecting clears the previous selection first.
    pub fn toggle_select(&mut self, ids: &[ItemId], selected: bool) -> Result<Vec<ItemId>> {
        let single = !self.options.multi_select;
        if single && selected && ids.len() > 1 {
            return Err(ListError::TooManySelected { count: ids.len() });
        }

        let mut changed = Vec::new();
        if single && selected {
            for id in self.selected_items() {
                if ids.contains(&id) {
                    continue;
                }
                if let Some(item) = self.store.item_mut(id) {
                    item.selected = false;
                    changed.push(id);
                }
            }
        }

        for &id in ids {
            let Some(item) = self.store.item_mut(id) else {
                continue;
            };
            if selected && !item.selectable {
                continue;
            }
            if item.selected != selected {
                item.selected = selected;
                changed.push(id);
            }
        }

        if !changed.is_empty() {
            ldebug!(changed = changed.len(), selected, "ItemList::toggle_select");
            self.touch_selection();
        }
        Ok(changed)
    }

    pub fn unselect_all(&mut self) -> Vec<ItemId> {
        let selected = self.selected_items();
        for &id in &selected {
            if let Some(item) = self.store.item_mut(id) {
                item.selected = false;
            }
        }
        if !selected.is_empty() {
            self.touch_selection();
        }
        selected
    }

    /// Selects the selectable items between two view indices (inclusive, either order) and
    /// deselects everything else. Returns the number of selected items.
    pub fn select_range(&mut self, from: usize, to: usize) -> Result<usize> {
        if !self.options.multi_select {
            return Err(ListError::RangeSelectRequiresMultiSelect);
        }
        self.ensure_cache();
        let view = self.view();
        let len = view.len();
        if from >= len {
            return Err(ListError::out_of_range(from, len));
        }
        if to >= len {
            return Err(ListError::out_of_range(to, len));
        }
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        let in_range: Vec<ItemId> = view.rows()[lo..=hi]
            .iter()
            .filter_map(ViewRow::item_id)
            .collect();

        let mut count = 0;
        for id in (0..self.store.len()).map(ItemId) {
            if let Some(item) = self.store.item_mut(id) {
                item.selected = item.selectable && in_range.contains(&id);
                if item.selected {
                    count += 1;
                }
            }
        }
        self.touch_selection();
        Ok(count)
    }

    /// Collapses or expands the row at `index` (an item with children or a group header).
    pub fn toggle_collapse(&mut self, index: usize, collapsed: bool) -> Result<RowKind> {
        let row = self.row_at(index)?;
        if !row.collapsible {
            return Err(ListError::NotCollapsible { index });
        }
        match &row.kind {
            RowKind::Item(id) => {
                self.set_collapsed(*id, collapsed);
            }
            RowKind::Group(header) => {
                self.group_collapsed.insert(header.path.clone(), collapsed);
                self.touch();
            }
        }
        ldebug!(index, collapsed, "ItemList::toggle_collapse");
        Ok(row.kind)
    }

    /// Sets an item's collapsed flag. Returns `true` if it changed.
    pub fn set_collapsed(&mut self, id: ItemId, collapsed: bool) -> bool {
        let Some(item) = self.store.item_mut(id) else {
            return false;
        };
        if item.collapsed == collapsed {
            return false;
        }
        item.collapsed = collapsed;
        self.touch();
        true
    }

    /// Collapses or expands every collapsible node (at any depth) and every group header.
    /// Returns the number of items whose state changed.
    pub fn toggle_all(&mut self, collapsed: bool) -> usize {
        let mut changed = 0;
        for id in (0..self.store.len()).map(ItemId) {
            let has_children = !self.store.children(id).is_empty();
            if let Some(item) = self.store.item_mut(id) {
                if has_children && item.collapsible && item.collapsed != collapsed {
                    item.collapsed = collapsed;
                    changed += 1;
                }
            }
        }
        self.group_collapsed.clear();
        self.groups_collapsed_by_default = collapsed;
        self.touch();
        changed
    }

    /// Resolves where a row dragged from `drag_index` lands when released over `target_index`.
    ///
    /// Returns `None` when the drop is rejected: indices out of range, group headers, grouped
    /// views, or a target inside the dragged row's own subtree.
    ///
    /// Rows are only ever dropped as siblings, never inside another row. A target deeper than
    /// the dragged row (a leaf or node inside some other subtree) therefore resolves to its
    /// ancestor at the dragged row's depth. A target at the same depth or shallower is already
    /// a sibling position and resolves to itself.
    pub fn calc_drag_target(&mut self, drag_index: usize, target_index: usize) -> Option<usize> {
        if !self.group_infos.is_empty() {
            return None;
        }
        self.ensure_cache();
        let view = self.view();
        let drag = view.get(drag_index)?;
        let target = view.get(target_index)?;
        if drag.is_group() || target.is_group() {
            return None;
        }
        if drag_index == target_index {
            return Some(drag_index);
        }
        if target_index > drag_index && target_index < view.subtree_end(drag_index) {
            ltrace!(drag_index, target_index, "drop target inside dragged subtree");
            return None;
        }

        let mut resolved = target_index;
        while view.rows()[resolved].depth > drag.depth {
            resolved = view.parent_index(resolved)?;
        }
        Some(resolved)
    }

    /// Moves the dragged row's item (with its subtree) next to the resolved target, in the
    /// source collection.
    pub fn drop_item(&mut self, drag_index: usize, target_index: usize) -> Result<()> {
        if !self.sort_infos.is_empty() || !self.group_infos.is_empty() {
            return Err(ListError::ReorderUnavailable);
        }
        let rejected = ListError::InvalidDropTarget {
            from: drag_index,
            to: target_index,
        };
        let resolved = self
            .calc_drag_target(drag_index, target_index)
            .ok_or_else(|| rejected.clone())?;
        if resolved == drag_index {
            return Ok(());
        }

        let view = self.view();
        let moving = view.get(drag_index).and_then(ViewRow::item_id);
        let anchor = view.get(resolved).and_then(ViewRow::item_id);
        let (Some(moving), Some(anchor)) = (moving, anchor) else {
            return Err(rejected);
        };
        if !self.store.move_next_to(moving, anchor, resolved > drag_index) {
            return Err(rejected);
        }
        ldebug!(drag_index, resolved, "ItemList::drop_item");
        self.touch();
        Ok(())
    }

    /// The current view as it would look after dropping `drag_index` onto `target_index`,
    /// together with the resolved target.
    ///
    /// The dragged row and its visible descendants move as one block, re-indented to the
    /// target's depth. Nothing is committed. Returns `None` when the drop would be rejected.
    pub fn preview_drop(
        &mut self,
        drag_index: usize,
        target_index: usize,
    ) -> Option<(usize, ViewList)> {
        if !self.sort_infos.is_empty() {
            return None;
        }
        let resolved = self.calc_drag_target(drag_index, target_index)?;
        let view = self.view();
        if resolved == drag_index {
            return Some((resolved, view.clone()));
        }

        let block_end = view.subtree_end(drag_index);
        let target_end = view.subtree_end(resolved);
        let mut rows = view.rows().to_vec();
        let delta = rows[resolved].depth as isize - rows[drag_index].depth as isize;
        let mut block: Vec<ViewRow> = rows.drain(drag_index..block_end).collect();
        for row in &mut block {
            row.depth = row.depth.saturating_add_signed(delta);
        }
        let at = if resolved > drag_index {
            target_end - block.len()
        } else {
            resolved
        };
        rows.splice(at..at, block);
        Some((resolved, ViewList::new(rows)))
    }

    /// Scans the view from `start` (wrapping) for the first selectable item row accepted by
    /// `predicate`. Group headers are skipped.
    pub fn find_next_match(
        &mut self,
        mut predicate: impl FnMut(&Item, usize) -> bool,
        start: usize,
    ) -> Option<usize> {
        self.ensure_cache();
        let view = self.view();
        let n = view.len();
        if n == 0 {
            return None;
        }
        let start = if start >= n { 0 } else { start };
        (0..n).map(|k| (start + k) % n).find(|&i| {
            view.rows()[i]
                .item_id()
                .and_then(|id| self.store.item(id))
                .is_some_and(|item| item.selectable && predicate(item, i))
        })
    }
}
