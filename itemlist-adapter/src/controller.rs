use std::fmt::{self, Display};

use itemlist::{
    Item, ItemId, ItemList, ItemListOptions, Query, RowKind, ViewList, ViewRow, Viewport,
    ViewportOptions, ViewportWindow,
};

use crate::{AdapterError, Debouncer, Interceptors, NavKey, QueryLoader, Result, TypeAhead};

/// Filter input delay used by [`ListController::new`].
pub const DEFAULT_FILTER_DELAY_MS: u64 = 300;

/// Identifies one load request. Only the most recent ticket may commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// A drag in progress: the dragged row and, once it hovered a valid target, the previewed view.
#[derive(Clone, Debug)]
struct DragState {
    from: usize,
    preview: Option<(usize, ViewList)>,
}

/// A framework-neutral controller that owns an [`ItemList`] and a [`Viewport`] and keeps them
/// in sync.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_resize` / `on_scroll` / `measure_row` when UI events occur
/// - `on_filter_input` for typed filter text, and `tick(now_ms)` from a timer
/// - `begin_load` / `complete_load` (or the async helpers) to supply items
///
/// Then read `window()` and `visible_rows()` to render.
///
/// Loads are tagged with a generation: completing an older ticket after a newer one was issued
/// is a no-op (last request wins). After `teardown`, pending loads and interceptors are
/// discarded.
pub struct ListController {
    list: ItemList,
    viewport: Viewport,
    query: Option<Query>,
    hint: Option<String>,
    loading: bool,
    generation: u64,
    alive: bool,
    interceptors: Interceptors,
    filter: Debouncer<String>,
    type_ahead: TypeAhead,
    active: Option<usize>,
    loader: Option<QueryLoader>,
    drag: Option<DragState>,
}

impl fmt::Debug for ListController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListController")
            .field("list", &self.list)
            .field("viewport", &self.viewport)
            .field("query", &self.query)
            .field("hint", &self.hint)
            .field("loading", &self.loading)
            .field("generation", &self.generation)
            .field("alive", &self.alive)
            .field("interceptors", &self.interceptors)
            .field("active", &self.active)
            .field("has_loader", &self.loader.is_some())
            .field("drag", &self.drag)
            .finish_non_exhaustive()
    }
}

impl ListController {
    pub fn new(list_options: ItemListOptions, viewport_options: ViewportOptions) -> Self {
        Self::from_parts(ItemList::new(list_options), Viewport::new(viewport_options))
    }

    pub fn from_parts(list: ItemList, viewport: Viewport) -> Self {
        Self {
            list,
            viewport,
            query: None,
            hint: None,
            loading: false,
            generation: 0,
            alive: true,
            interceptors: Interceptors::default(),
            filter: Debouncer::new(DEFAULT_FILTER_DELAY_MS),
            type_ahead: TypeAhead::default(),
            active: None,
            loader: None,
            drag: None,
        }
    }

    pub fn list(&self) -> &ItemList {
        &self.list
    }

    /// Direct access to the list. Changes are picked up on the next read.
    pub fn list_mut(&mut self) -> &mut ItemList {
        &mut self.list
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    pub fn set_interceptors(&mut self, interceptors: Interceptors) {
        self.interceptors = interceptors;
    }

    pub fn set_filter_delay_ms(&mut self, delay_ms: u64) {
        self.filter = Debouncer::new(delay_ms);
    }

    pub fn set_type_ahead(&mut self, type_ahead: TypeAhead) {
        self.type_ahead = type_ahead;
    }

    /// The provider consulted by [`crate::load_for_query`] whenever the query changes.
    pub fn query_loader(&self) -> Option<&QueryLoader> {
        self.loader.as_ref()
    }

    /// Sets or clears the query-driven provider (server-side search).
    pub fn set_query_loader(&mut self, loader: Option<QueryLoader>) {
        self.loader = loader;
    }

    /// Bumped whenever the collection is replaced or a load begins.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Marks the controller dead: pending loads, streams and interceptor results are dropped.
    pub fn teardown(&mut self) {
        if !self.alive {
            return;
        }
        ldebug!(generation = self.generation, "ListController::teardown");
        self.alive = false;
        self.loading = false;
        self.drag = None;
        self.filter.cancel();
    }

    /// Message shown in place of rows (e.g. a provider error).
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn set_hint(&mut self, hint: Option<String>) {
        self.hint = hint;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// Applies a query immediately, cancelling any debounced filter input.
    pub fn set_query(&mut self, query: Option<Query>) -> ViewportWindow {
        self.filter.cancel();
        self.query = query;
        self.active = None;
        self.window()
    }

    /// Records typed filter text; it is applied by `tick` once input settles.
    pub fn on_filter_input(&mut self, text: impl Into<String>, now_ms: u64) {
        self.filter.push(text.into(), now_ms);
    }

    /// Advances timers. Returns the new window when debounced filter input was applied.
    pub fn tick(&mut self, now_ms: u64) -> Option<ViewportWindow> {
        if !self.alive {
            return None;
        }
        let text = self.filter.poll(now_ms)?;
        ltrace!(len = text.len(), "applying debounced filter");
        let query = (!text.is_empty()).then(|| Query::text(text));
        Some(self.set_query(query))
    }

    /// Replaces the collection synchronously. Any load in flight is superseded.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.generation = self.generation.wrapping_add(1);
        self.loading = false;
        self.hint = None;
        self.active = None;
        self.list.set_items(items);
        self.sync();
    }

    /// Starts a load. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> Result<LoadTicket> {
        if !self.alive {
            return Err(AdapterError::Detached);
        }
        self.generation = self.generation.wrapping_add(1);
        self.loading = true;
        ldebug!(generation = self.generation, "ListController::begin_load");
        Ok(LoadTicket {
            generation: self.generation,
        })
    }

    /// Whether `ticket` may still commit.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.alive && ticket.generation == self.generation
    }

    fn check_ticket(&self, ticket: LoadTicket) -> Result<bool> {
        if !self.alive {
            return Err(AdapterError::Detached);
        }
        if ticket.generation != self.generation {
            ldebug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale load"
            );
            return Ok(false);
        }
        Ok(true)
    }

    /// Commits the result of a load.
    ///
    /// Returns `Ok(false)` when the ticket is stale. A provider error becomes the hint label
    /// and leaves the list empty.
    pub fn complete_load<E: Display>(
        &mut self,
        ticket: LoadTicket,
        result: core::result::Result<Vec<Item>, E>,
    ) -> Result<bool> {
        if !self.check_ticket(ticket)? {
            return Ok(false);
        }
        self.loading = false;
        match result {
            Ok(items) => self.replace_items(items),
            Err(err) => {
                lwarn!(error = %err, "item provider failed");
                self.active = None;
                self.hint = Some(err.to_string());
                self.list.set_items(Vec::new());
                self.sync();
            }
        }
        Ok(true)
    }

    /// Replaces the collection with the first chunk of an incremental load. The load stays
    /// in progress.
    pub fn replace_loaded(
        &mut self,
        ticket: LoadTicket,
        items: Vec<Item>,
    ) -> Result<bool> {
        if !self.check_ticket(ticket)? {
            return Ok(false);
        }
        self.replace_items(items);
        Ok(true)
    }

    fn replace_items(&mut self, items: Vec<Item>) {
        self.hint = None;
        self.active = None;
        self.list.set_items_preserving_selection(items);
        self.sync();
    }

    /// Appends a chunk of an incremental load.
    pub fn append_loaded(
        &mut self,
        ticket: LoadTicket,
        items: Vec<Item>,
    ) -> Result<bool> {
        if !self.check_ticket(ticket)? {
            return Ok(false);
        }
        self.list.append_items(items);
        self.sync();
        Ok(true)
    }

    /// Marks an incremental load as done.
    pub fn finish_load(&mut self, ticket: LoadTicket) -> Result<bool> {
        if !self.check_ticket(ticket)? {
            return Ok(false);
        }
        self.loading = false;
        Ok(true)
    }

    /// Pushes the list's view into the viewport if it changed.
    pub(crate) fn sync(&mut self) {
        let stale = !self.list.has_cache() || self.list.query() != self.query.as_ref();
        if stale {
            self.refresh();
        }
    }

    /// Recomputes the view and resets viewport rows unconditionally. A drag in progress is
    /// cancelled, since its indices refer to the previous view.
    pub fn refresh(&mut self) -> ViewportWindow {
        if self.drag.take().is_some() {
            ldebug!("drag cancelled by view change");
        }
        let query = self.query.clone();
        let view = self.list.view_list(query.as_ref());
        ltrace!(rows = view.len(), "ListController::refresh");
        self.viewport.set_rows(view);
        if self.active.is_some_and(|a| a >= self.viewport.count()) {
            self.active = None;
        }
        self.viewport.window()
    }

    /// The window to render. Consumes any pending scroll request.
    pub fn window(&mut self) -> ViewportWindow {
        self.sync();
        self.viewport.next_window()
    }

    /// Rows inside the current window. While a drag hovers a valid target, these come from the
    /// previewed view.
    pub fn visible_rows(&mut self) -> &[ViewRow] {
        self.sync();
        let w = self.viewport.window();
        let preview = self
            .drag
            .as_ref()
            .and_then(|d| d.preview.as_ref())
            .map(|(_, view)| view);
        match preview.or(self.list.cached_view()) {
            Some(view) => {
                let end = w.end_index.min(view.len());
                &view.rows()[w.start_index.min(end)..end]
            }
            None => &[],
        }
    }

    pub fn on_resize(&mut self, container_size: u32) {
        self.viewport.set_container_size(container_size);
    }

    pub fn on_scroll(&mut self, scroll_offset: u64) {
        self.viewport.set_scroll_offset(scroll_offset);
    }

    /// Records a rendered row's size. The size also becomes the item's hint, so it survives
    /// later view recomputation.
    pub fn measure_row(&mut self, index: usize, size: u32) {
        self.sync();
        self.viewport.measure(index, size);
        let id = match self.drag.as_ref().and_then(|d| d.preview.as_ref()) {
            Some((_, view)) => view.get(index).and_then(ViewRow::item_id),
            None => self.list.row(index).and_then(ViewRow::item_id),
        };
        if let Some(id) = id {
            self.list.set_item_size(id, Some(size));
        }
    }

    /// Selects or unselects the item row at `index` without consulting interceptors.
    pub fn toggle_select(&mut self, index: usize, selected: bool) -> Result<Vec<ItemId>> {
        let id = self.list.item_id_at(index)?;
        let changed = self.list.toggle_select(&[id], selected)?;
        self.sync();
        Ok(changed)
    }

    /// Collapses or expands the row at `index` without consulting interceptors.
    pub fn toggle_collapse(&mut self, index: usize, collapsed: bool) -> Result<RowKind> {
        let kind = self.list.toggle_collapse(index, collapsed)?;
        self.sync();
        Ok(kind)
    }

    pub fn drop_item(&mut self, drag_index: usize, target_index: usize) -> Result<()> {
        self.list.drop_item(drag_index, target_index)?;
        self.active = None;
        self.sync();
        Ok(())
    }

    /// Starts dragging the item row at `index`.
    pub fn begin_drag(&mut self, index: usize) -> Result<()> {
        self.sync();
        self.list.item_id_at(index)?;
        self.drag = Some(DragState {
            from: index,
            preview: None,
        });
        Ok(())
    }

    /// The row being dragged, as an index into the committed view.
    pub fn drag_index(&self) -> Option<usize> {
        self.drag.as_ref().map(|d| d.from)
    }

    /// Moves the drag over `target_index`. On a valid target the rendered rows show the dragged
    /// block at its landing position; the resolved target is returned. An invalid target keeps
    /// the last preview.
    pub fn drag_over(&mut self, target_index: usize) -> Option<usize> {
        self.sync();
        let from = self.drag.as_ref()?.from;
        let (resolved, view) = self.list.preview_drop(from, target_index)?;
        ltrace!(from, target_index, resolved, "ListController::drag_over");
        self.viewport.set_rows(&view);
        if let Some(drag) = self.drag.as_mut() {
            drag.preview = Some((resolved, view));
        }
        Some(resolved)
    }

    /// Abandons the drag and restores the committed rows.
    pub fn cancel_drag(&mut self) {
        if self.drag.is_some() {
            self.refresh();
        }
    }

    /// Commits the drag at its last valid target. Returns `Ok(false)` when no drag was in
    /// progress or no valid target was hovered.
    pub fn end_drag(&mut self) -> Result<bool> {
        let Some(drag) = self.drag.take() else {
            return Ok(false);
        };
        let Some((resolved, _)) = drag.preview else {
            self.refresh();
            return Ok(false);
        };
        let result = self.drop_item(drag.from, resolved);
        self.refresh();
        result.map(|()| true)
    }

    /// The keyboard-active row.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Makes `index` the active row, scrolling it into view.
    pub fn set_active(&mut self, index: usize) -> Option<u64> {
        self.sync();
        self.active = Some(index);
        self.viewport.ensure_visible(index)
    }

    /// Moves the active row for a navigation key.
    pub fn navigate(&mut self, key: NavKey) -> Option<usize> {
        self.sync();
        let next = crate::navigate(&mut self.list, &self.viewport, key, self.active)?;
        self.set_active(next);
        Some(next)
    }

    /// Feeds a typed character to type-ahead search and activates the match.
    pub fn type_ahead(&mut self, ch: char, now_ms: u64) -> Option<usize> {
        self.sync();
        let next = self
            .type_ahead
            .on_key(&mut self.list, ch, now_ms, self.active)?;
        self.set_active(next);
        Some(next)
    }
}
