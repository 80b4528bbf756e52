/// Where a row should land when scrolling to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    /// Scroll the minimum distance that makes the row fully visible.
    Auto,
}

/// How row sizes are determined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViewportMode {
    /// No virtualization: the window always covers the whole list.
    #[default]
    Disabled,
    /// Every row has the configured row height.
    Fixed,
    /// Measured size, else the row's size hint, else the row height.
    Variable,
    /// The row height, grown to a larger measured size or hint.
    Auto,
}

impl ViewportMode {
    pub fn is_virtual(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// The slice of the view list to render plus the space taken by the rows around it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportWindow {
    pub start_index: usize,
    pub end_index: usize, // exclusive
    /// Summed size of the rows before `start_index`.
    pub padding_before: u64,
    /// Summed size of the rows from `end_index` on.
    pub padding_after: u64,
    pub total_size: u64,
    /// The scroll offset lies past the scrollable maximum.
    pub out_of_range: bool,
    /// Scroll offset requested by [`crate::Viewport::ensure_visible`], if any.
    pub scroll_pos: Option<u64>,
}

impl ViewportWindow {
    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    /// Inclusive end of the window.
    pub fn last_index(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.end_index - 1)
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}
