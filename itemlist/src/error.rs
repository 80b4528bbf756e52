//! Error types for list operations.

/// Result type alias for list operations.
pub type Result<T> = core::result::Result<T, ListError>;

/// Errors surfaced by [`crate::ItemList`] operations.
///
/// These are configuration or usage errors: the operation is rejected and no state changes.
/// Malformed item data never produces an error; absent fields are treated as absent values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    /// A single-item accessor was used while multi-select is active.
    #[error("single item selection requested while multi-select is active")]
    MultiSelectActive,

    /// More than one item was selected on a single-select list.
    #[error("cannot select {count} items on a single-select list")]
    TooManySelected { count: usize },

    /// Range selection needs multi-select.
    #[error("range selection requires multi-select")]
    RangeSelectRequiresMultiSelect,

    /// A view index was outside the current view list.
    #[error("index {index} is out of range (view list has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The row at `index` has nothing to collapse.
    #[error("row {index} is not collapsible")]
    NotCollapsible { index: usize },

    /// The row at `index` is a group header, not an item.
    #[error("row {index} is a group header")]
    NotAnItem { index: usize },

    /// Reordering is meaningless while a sort or grouping is applied.
    #[error("items cannot be reordered while sorting or grouping is active")]
    ReorderUnavailable,

    /// The drop target was rejected (e.g. a node dropped inside its own subtree).
    #[error("cannot drop row {from} onto row {to}")]
    InvalidDropTarget { from: usize, to: usize },
}

impl ListError {
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}
