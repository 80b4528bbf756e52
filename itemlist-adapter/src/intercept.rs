use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use itemlist::{Item, ItemId, ItemList, RowKind, ViewRow};

use crate::{AdapterError, ListController, Result};

/// A state change an interceptor can veto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Select,
    Unselect,
    Expand,
    Collapse,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Select => "select",
            Self::Unselect => "unselect",
            Self::Expand => "expand",
            Self::Collapse => "collapse",
        })
    }
}

/// Future returned by a hook: `Ok(())` lets the change through, `Err(reason)` vetoes it.
pub type HookFuture = LocalBoxFuture<'static, core::result::Result<(), String>>;

/// A user-supplied check run before a state change commits.
pub type Hook = Rc<dyn Fn(ItemId, &Item) -> HookFuture>;

/// Optional async hooks consulted before select, unselect, expand and collapse.
#[derive(Clone, Default)]
pub struct Interceptors {
    before_select: Option<Hook>,
    before_unselect: Option<Hook>,
    before_expand: Option<Hook>,
    before_collapse: Option<Hook>,
}

fn boxed<F, Fut>(f: F) -> Hook
where
    F: Fn(ItemId, &Item) -> Fut + 'static,
    Fut: Future<Output = core::result::Result<(), String>> + 'static,
{
    Rc::new(move |id, item| f(id, item).boxed_local())
}

impl Interceptors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_before_select<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ItemId, &Item) -> Fut + 'static,
        Fut: Future<Output = core::result::Result<(), String>> + 'static,
    {
        self.before_select = Some(boxed(f));
        self
    }

    pub fn with_before_unselect<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ItemId, &Item) -> Fut + 'static,
        Fut: Future<Output = core::result::Result<(), String>> + 'static,
    {
        self.before_unselect = Some(boxed(f));
        self
    }

    pub fn with_before_expand<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ItemId, &Item) -> Fut + 'static,
        Fut: Future<Output = core::result::Result<(), String>> + 'static,
    {
        self.before_expand = Some(boxed(f));
        self
    }

    pub fn with_before_collapse<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ItemId, &Item) -> Fut + 'static,
        Fut: Future<Output = core::result::Result<(), String>> + 'static,
    {
        self.before_collapse = Some(boxed(f));
        self
    }

    pub fn hook(&self, action: Action) -> Option<&Hook> {
        match action {
            Action::Select => self.before_select.as_ref(),
            Action::Unselect => self.before_unselect.as_ref(),
            Action::Expand => self.before_expand.as_ref(),
            Action::Collapse => self.before_collapse.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.before_select.is_none()
            && self.before_unselect.is_none()
            && self.before_expand.is_none()
            && self.before_collapse.is_none()
    }
}

impl fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptors")
            .field("before_select", &self.before_select.is_some())
            .field("before_unselect", &self.before_unselect.is_some())
            .field("before_expand", &self.before_expand.is_some())
            .field("before_collapse", &self.before_collapse.is_some())
            .finish()
    }
}

fn start_hook(
    list: &ItemList,
    hooks: &Interceptors,
    action: Action,
    id: ItemId,
) -> Option<HookFuture> {
    let hook = hooks.hook(action)?;
    list.item(id).map(|item| hook(id, item))
}

/// Runs the hook for `action` on `id` (if any) without holding the controller borrow, then
/// re-borrows and returns the controller if the change may still commit.
async fn run_hook(
    ctrl: &RefCell<ListController>,
    action: Action,
    id: ItemId,
) -> Result<std::cell::RefMut<'_, ListController>> {
    let (pending, generation) = {
        let c = ctrl.borrow();
        if !c.is_alive() {
            return Err(AdapterError::Detached);
        }
        (
            start_hook(c.list(), c.interceptors(), action, id),
            c.generation(),
        )
    };

    if let Some(fut) = pending {
        ldebug!(%action, "awaiting interceptor");
        let verdict = fut.await;
        if !ctrl.borrow().is_alive() {
            ldebug!(%action, "discarding interceptor result after teardown");
            return Err(AdapterError::Detached);
        }
        verdict.map_err(|reason| AdapterError::Vetoed { action, reason })?;
    }

    let c = ctrl.borrow_mut();
    if !c.is_alive() {
        ldebug!(%action, "discarding interceptor result after teardown");
        return Err(AdapterError::Detached);
    }
    if c.generation() != generation {
        return Err(AdapterError::Superseded { action });
    }
    Ok(c)
}

/// Selects or unselects the item row at `index`, consulting the matching interceptor first.
///
/// Returns the items whose selection changed.
pub async fn select(
    ctrl: &RefCell<ListController>,
    index: usize,
    selected: bool,
) -> Result<Vec<ItemId>> {
    let action = if selected {
        Action::Select
    } else {
        Action::Unselect
    };
    let id = ctrl.borrow_mut().list_mut().item_id_at(index)?;
    let mut c = run_hook(ctrl, action, id).await?;
    let changed = c.list_mut().toggle_select(&[id], selected)?;
    c.sync();
    Ok(changed)
}

/// Collapses or expands the row at `index`, consulting the matching interceptor first.
///
/// Group headers have no item and are toggled without a hook.
pub async fn set_collapsed(
    ctrl: &RefCell<ListController>,
    index: usize,
    collapsed: bool,
) -> Result<RowKind> {
    let action = if collapsed {
        Action::Collapse
    } else {
        Action::Expand
    };
    let id = {
        let mut c = ctrl.borrow_mut();
        if !c.is_alive() {
            return Err(AdapterError::Detached);
        }
        c.list_mut().row(index).and_then(ViewRow::item_id)
    };

    let (mut c, index) = match id {
        Some(id) => {
            let mut c = run_hook(ctrl, action, id).await?;
            // The row may have moved while the hook was pending.
            let index = c
                .list_mut()
                .item_index(id)
                .ok_or(AdapterError::Superseded { action })?;
            (c, index)
        }
        None => (ctrl.borrow_mut(), index),
    };
    let kind = c.list_mut().toggle_collapse(index, collapsed)?;
    c.sync();
    Ok(kind)
}
