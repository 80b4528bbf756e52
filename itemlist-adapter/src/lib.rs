//! Event-driven adapter utilities for the `itemlist` crate.
//!
//! The `itemlist` crate is UI-agnostic and focuses on the list model and viewport math. This
//! crate provides small, framework-neutral helpers an adapter needs on top of it:
//!
//! - [`ListController`]: one list plus one viewport kept in sync, with load generations
//!   (last request wins) and a liveness flag for teardown
//! - async loading from futures and streams ([`load_items`], [`load_item_stream`]), and
//!   query-driven reloads for server-side search ([`QueryLoader`], [`tick_filter`])
//! - async interceptors that may veto select/unselect/expand/collapse ([`Interceptors`])
//! - input helpers: [`Debouncer`], [`TypeAhead`], keyboard [`navigate`]
//!
//! Everything is single-threaded. Share a controller as `RefCell<ListController>`; the async
//! helpers never hold a borrow across an `.await`.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod controller;
mod debounce;
mod error;
mod intercept;
mod nav;
mod provider;
mod typeahead;


pub use controller::{DEFAULT_FILTER_DELAY_MS, ListController, LoadTicket};
pub use debounce::Debouncer;
pub use error::{AdapterError, Result};
pub use intercept::{Action, Hook, HookFuture, Interceptors, select, set_collapsed};
pub use nav::{NavKey, navigate, page_size};
pub use provider::{
    LoaderFuture, QueryLoader, load_for_query, load_item_stream, load_items, query_loader,
    tick_filter,
};
pub use typeahead::{DEFAULT_TYPE_AHEAD_RESET_MS, TypeAhead};
