//! A headless item list and viewport engine.
//!
//! This crate turns a flat or hierarchical collection of items into the ordered rows a list
//! widget would display, and computes which of those rows actually need rendering.
//!
//! - [`ItemList`] owns the collection, selection and expand/collapse state, applies filter
//!   queries, grouping and sorting, and flattens the result into a [`ViewList`].
//! - [`Viewport`] maps a view list plus container size and scroll offset onto a
//!   [`ViewportWindow`]: the slice of rows to render and the padding around it.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - the items (see [`Item`])
//! - container size and scroll offset
//! - (optionally) measured row sizes
//!
//! For async loading, interceptors and input helpers, see the `itemlist-adapter` crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod fenwick;
pub mod grouping;
mod item;
mod list;
mod model;
mod options;
mod query;
pub mod sorting;
mod state;
mod store;
mod types;
mod value;
mod view;
mod viewport;

#[cfg(test)]
mod tests;

pub use error::{ListError, Result};
pub use grouping::{GroupHeader, GroupInfo, GroupOrder, GroupedRow, group_items};
pub use item::Item;
pub use list::{
    DEFAULT_CHILDREN_FIELD, DEFAULT_TEXT_FIELD, DEFAULT_VALUE_FIELD, ItemList, ItemListOptions,
    ParentInfo,
};
pub use options::{DEFAULT_ROW_HEIGHT, OnChangeCallback, ViewportOptions};
pub use query::{MatchFn, Query};
pub use sorting::{SortInfo, SortOrder};
pub use state::ViewportState;
pub use store::ItemId;
pub use types::{Align, ViewportMode, ViewportWindow};
pub use value::{Accessor, DeriveFn, LazyFn, Value, ValueType};
pub use view::{RowKind, ViewList, ViewRow};
pub use viewport::Viewport;
