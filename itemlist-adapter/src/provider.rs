use std::cell::RefCell;
use std::fmt::Display;
use std::future::Future;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::{FutureExt, Stream, StreamExt, pin_mut};
use itemlist::{Item, Query, ViewportWindow};

use crate::{AdapterError, ListController, Result};

/// Future returned by a [`QueryLoader`].
pub type LoaderFuture = LocalBoxFuture<'static, core::result::Result<Vec<Item>, String>>;

/// Loads the collection for a query (server-side search). Receives the query, or `None` when
/// the filter is cleared, and the currently selected items.
pub type QueryLoader = Rc<dyn Fn(Option<&Query>, &[Item]) -> LoaderFuture>;

/// Wraps a closure as a [`QueryLoader`].
pub fn query_loader<F, Fut>(f: F) -> QueryLoader
where
    F: Fn(Option<&Query>, &[Item]) -> Fut + 'static,
    Fut: Future<Output = core::result::Result<Vec<Item>, String>> + 'static,
{
    Rc::new(move |query, selected| f(query, selected).boxed_local())
}

/// Loads a collection from a future and commits it if no newer load started meanwhile.
///
/// Returns `Ok(false)` when the result was discarded as stale, and
/// [`crate::AdapterError::Detached`] when the controller was torn down. Provider errors are
/// not propagated; they become the controller's hint label.
pub async fn load_items<F, E>(ctrl: &RefCell<ListController>, items: F) -> Result<bool>
where
    F: Future<Output = core::result::Result<Vec<Item>, E>>,
    E: Display,
{
    let ticket = ctrl.borrow_mut().begin_load()?;
    let result = items.await;
    ctrl.borrow_mut().complete_load(ticket, result)
}

/// Loads a collection delivered in chunks.
///
/// The first chunk replaces the collection, later chunks are appended. Consumption stops as soon
/// as a newer load starts (`Ok(false)`) or the controller is torn down.
pub async fn load_item_stream<S, E>(ctrl: &RefCell<ListController>, chunks: S) -> Result<bool>
where
    S: Stream<Item = core::result::Result<Vec<Item>, E>>,
    E: Display,
{
    let ticket = ctrl.borrow_mut().begin_load()?;
    pin_mut!(chunks);

    let mut first = true;
    while let Some(chunk) = chunks.next().await {
        let mut c = ctrl.borrow_mut();
        let applied = match chunk {
            Ok(items) if first => c.replace_loaded(ticket, items)?,
            Ok(items) => c.append_loaded(ticket, items)?,
            Err(err) => return c.complete_load(ticket, Err(err)),
        };
        if !applied {
            return Ok(false);
        }
        first = false;
    }

    let mut c = ctrl.borrow_mut();
    if first {
        return c.complete_load::<E>(ticket, Ok(Vec::new()));
    }
    c.finish_load(ticket)
}

/// Reloads the collection from the controller's query loader for its current query.
///
/// Returns `Ok(false)` when no loader is set or the result was superseded by a newer load.
/// Selected items whose value reappears in the new collection stay selected.
pub async fn load_for_query(ctrl: &RefCell<ListController>) -> Result<bool> {
    let pending = {
        let c = ctrl.borrow();
        if !c.is_alive() {
            return Err(AdapterError::Detached);
        }
        let Some(loader) = c.query_loader().cloned() else {
            return Ok(false);
        };
        let selected: Vec<Item> = c
            .list()
            .selected_items()
            .into_iter()
            .filter_map(|id| c.list().item(id).cloned())
            .collect();
        loader(c.query(), &selected)
    };
    load_items(ctrl, pending).await
}

/// Applies settled filter input (see [`ListController::tick`]). With a query loader set, the
/// collection is reloaded for the new query before the window is returned.
///
/// Returns `Ok(None)` when no input has settled yet, or when the reload was superseded.
pub async fn tick_filter(
    ctrl: &RefCell<ListController>,
    now_ms: u64,
) -> Result<Option<ViewportWindow>> {
    let Some(window) = ctrl.borrow_mut().tick(now_ms) else {
        return Ok(None);
    };
    if ctrl.borrow().query_loader().is_none() {
        return Ok(Some(window));
    }
    if !load_for_query(ctrl).await? {
        return Ok(None);
    }
    Ok(Some(ctrl.borrow_mut().window()))
}
