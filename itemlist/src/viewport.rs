use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::fenwick::Fenwick;
use crate::options::ViewportOptions;
use crate::{Align, ViewList, ViewportMode, ViewportState, ViewportWindow};

/// Maps the view list plus scroll geometry onto the window of rows to render.
///
/// The viewport is adapter-driven: it does not own a scroll container. Feed it the row count
/// (or a [`ViewList`]), the container size, the scroll offset and measured row sizes, then read
/// [`Viewport::window`].
///
/// Sizes are `u32` per row and `u64` in aggregate.
pub struct Viewport {
    options: ViewportOptions,
    count: usize,
    hints: Vec<Option<u32>>,
    measured: Vec<Option<u32>>,
    sums: Fenwick,
    container_size: u32,
    scroll_offset: u64,
    pending_scroll: Option<u64>,
    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl Viewport {
    pub fn new(options: ViewportOptions) -> Self {
        ldebug!(
            mode = ?options.mode,
            row_height = options.row_height,
            "Viewport::new"
        );
        Self {
            options,
            count: 0,
            hints: Vec::new(),
            measured: Vec::new(),
            sums: Fenwick::default(),
            container_size: 0,
            scroll_offset: 0,
            pending_scroll: None,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    pub fn set_on_change(&mut self, on_change: Option<impl Fn(&Viewport) + Send + Sync + 'static>) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    pub fn mode(&self) -> ViewportMode {
        self.options.mode
    }

    /// Changes the mode. Every row size is recomputed.
    pub fn set_mode(&mut self, mode: ViewportMode) {
        if self.options.mode == mode {
            return;
        }
        ldebug!(from = ?self.options.mode, to = ?mode, "Viewport::set_mode");
        self.options.mode = mode;
        self.rebuild();
        self.notify();
    }

    pub fn row_height(&self) -> u32 {
        self.options.row_height
    }

    pub fn set_row_height(&mut self, row_height: u32) {
        if self.options.row_height == row_height {
            return;
        }
        self.options.row_height = row_height;
        self.rebuild();
        self.notify();
    }

    pub fn set_max_size(&mut self, max_size: Option<u32>) {
        self.options.max_size = max_size;
        self.notify();
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Takes row count and size hints from a view list. Measurements are dropped since row
    /// identities may have shifted.
    pub fn set_rows(&mut self, rows: &ViewList) {
        self.count = rows.len();
        self.hints = rows.iter().map(|r| r.size).collect();
        self.measured = alloc::vec![None; self.count];
        self.rebuild();
        self.notify();
    }

    /// Sets a row count without size hints.
    pub fn set_count(&mut self, count: usize) {
        if self.count == count {
            return;
        }
        self.count = count;
        self.hints.resize(count, None);
        self.measured.resize(count, None);
        self.rebuild();
        self.notify();
    }

    /// Effective container size (capped by `max_size`).
    pub fn container_size(&self) -> u32 {
        match self.options.max_size {
            Some(max) => self.container_size.min(max),
            None => self.container_size,
        }
    }

    pub fn set_container_size(&mut self, size: u32) {
        if self.container_size == size {
            return;
        }
        self.container_size = size;
        self.notify();
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// Records the adapter's scroll offset. Offsets past the end are kept and reported through
    /// [`ViewportWindow::out_of_range`].
    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.scroll_offset == offset {
            return;
        }
        self.scroll_offset = offset;
        self.notify();
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        self.set_scroll_offset(self.clamp_scroll_offset(offset));
    }

    /// Sets container size and scroll offset with a single notification.
    pub fn set_geometry(&mut self, container_size: u32, scroll_offset: u64) {
        self.batch_update(|v| {
            v.set_container_size(container_size);
            v.set_scroll_offset(scroll_offset);
        });
    }

    fn size_of(&self, index: usize) -> u32 {
        let h = self.options.row_height;
        let measured = self.measured.get(index).copied().flatten();
        let hint = self.hints.get(index).copied().flatten();
        match self.options.mode {
            ViewportMode::Disabled | ViewportMode::Fixed => h,
            ViewportMode::Variable => measured.or(hint).unwrap_or(h),
            ViewportMode::Auto => measured.or(hint).map_or(h, |s| s.max(h)),
        }
    }

    fn rebuild(&mut self) {
        self.sums = Fenwick::from_sizes((0..self.count).map(|i| self.size_of(i)));
        ltrace!(count = self.count, total = self.sums.total(), "Viewport::rebuild");
    }

    /// Records a measured row size. Ignored for sizes in fixed mode, but kept for a later mode
    /// change.
    pub fn measure(&mut self, index: usize, size: u32) {
        if index >= self.count || self.measured[index] == Some(size) {
            return;
        }
        let old = self.size_of(index);
        self.measured[index] = Some(size);
        let new = self.size_of(index);
        ltrace!(index, old, new, "Viewport::measure");
        if new != old {
            self.sums.add(index, new as i64 - old as i64);
            self.notify();
        }
    }

    pub fn measure_many(&mut self, measurements: impl IntoIterator<Item = (usize, u32)>) {
        self.batch_update(|v| {
            for (index, size) in measurements {
                v.measure(index, size);
            }
        });
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).is_some_and(Option::is_some)
    }

    pub fn clear_measurements(&mut self) {
        self.measured.iter_mut().for_each(|m| *m = None);
        self.rebuild();
        self.notify();
    }

    pub fn row_size(&self, index: usize) -> Option<u32> {
        (index < self.count).then(|| self.size_of(index))
    }

    pub fn row_start(&self, index: usize) -> Option<u64> {
        (index < self.count).then(|| self.sums.prefix_sum(index))
    }

    pub fn total_size(&self) -> u64 {
        self.sums.total()
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.total_size()
            .saturating_sub(self.container_size() as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    /// Row covering `offset`, if any.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let index = self.sums.lower_bound(offset);
        (index < self.count).then_some(index)
    }

    /// The window for the current geometry, including any pending scroll request.
    pub fn window(&self) -> ViewportWindow {
        ViewportWindow {
            scroll_pos: self.pending_scroll,
            ..self.window_for(self.scroll_offset, self.container_size())
        }
    }

    /// Like [`Self::window`], but consumes the pending scroll request.
    pub fn next_window(&mut self) -> ViewportWindow {
        let window = self.window();
        self.pending_scroll = None;
        window
    }

    /// Computes the window for arbitrary geometry without touching state.
    pub fn window_for(&self, scroll_offset: u64, container_size: u32) -> ViewportWindow {
        let n = self.count;
        let total = self.total_size();
        let view = container_size as u64;
        let out_of_range = scroll_offset > total.saturating_sub(view);

        let (start, end) = match self.options.mode {
            ViewportMode::Disabled => (0, n),
            ViewportMode::Fixed if self.options.row_height == 0 => (0, n),
            ViewportMode::Fixed => {
                let h = self.options.row_height as u64;
                let start = usize::try_from(scroll_offset / h).unwrap_or(usize::MAX).min(n);
                let end = if view == 0 {
                    start
                } else {
                    let visible = usize::try_from(view.div_ceil(h)).unwrap_or(usize::MAX);
                    start.saturating_add(visible).saturating_add(1).min(n)
                };
                (start, end)
            }
            ViewportMode::Variable | ViewportMode::Auto => {
                let start = self.sums.lower_bound(scroll_offset).min(n);
                let end = if view == 0 {
                    start
                } else {
                    let last = self.sums.lower_bound(scroll_offset.saturating_add(view - 1));
                    // One row of slack past the last visible row.
                    last.saturating_add(2).min(n).max(start)
                };
                (start, end)
            }
        };

        let (padding_before, padding_after) = match self.options.mode {
            ViewportMode::Disabled => (0, 0),
            _ => {
                let before = self.sums.prefix_sum(start);
                (before, total.saturating_sub(self.sums.prefix_sum(end)))
            }
        };

        ViewportWindow {
            start_index: start,
            end_index: end,
            padding_before,
            padding_after,
            total_size: total,
            out_of_range,
            scroll_pos: None,
        }
    }

    /// Scroll offset that places row `index` according to `align` (clamped).
    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        if self.count == 0 {
            return 0;
        }
        let index = index.min(self.count - 1);
        let start = self.sums.prefix_sum(index);
        let end = start.saturating_add(self.size_of(index) as u64);
        let view = self.container_size() as u64;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
            Align::Center => {
                let center = start.saturating_add((end - start) / 2);
                center.saturating_sub(view / 2)
            }
            Align::Auto => {
                let cur = self.scroll_offset;
                let cur_end = cur.saturating_add(view);
                if start >= cur && end <= cur_end {
                    cur
                } else if start < cur {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target)
    }

    /// Scrolls so that row `index` sits at `align`. Returns the new offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.scroll_to_index_offset(index, align);
        self.set_scroll_offset(offset);
        offset
    }

    /// Computes the minimal scroll that brings row `index` into view.
    ///
    /// When a scroll is needed, the offset is applied, returned, and exposed as
    /// [`ViewportWindow::scroll_pos`] until [`Self::next_window`] consumes it. Does nothing when
    /// virtualization is disabled.
    pub fn ensure_visible(&mut self, index: usize) -> Option<u64> {
        if !self.options.mode.is_virtual() || index >= self.count {
            return None;
        }
        let offset = self.scroll_to_index_offset(index, Align::Auto);
        if offset == self.scroll_offset {
            return None;
        }
        ldebug!(index, offset, "Viewport::ensure_visible");
        self.pending_scroll = Some(offset);
        self.set_scroll_offset(offset);
        Some(offset)
    }

    pub fn viewport_state(&self) -> ViewportState {
        ViewportState {
            mode: self.options.mode,
            container_size: self.container_size,
            scroll_offset: self.scroll_offset,
        }
    }

    pub fn restore_viewport_state(&mut self, state: ViewportState) {
        self.batch_update(|v| {
            v.set_mode(state.mode);
            v.set_container_size(state.container_size);
            v.set_scroll_offset(state.scroll_offset);
        });
    }
}

impl core::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Viewport")
            .field("options", &self.options)
            .field("count", &self.count)
            .field("container_size", &self.container_size)
            .field("scroll_offset", &self.scroll_offset)
            .field("total_size", &self.total_size())
            .finish_non_exhaustive()
    }
}
