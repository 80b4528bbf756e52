use itemlist::{ItemList, ViewRow, Viewport};

/// Keyboard navigation keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavKey {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

/// Rows per page for the viewport's container size.
pub fn page_size(viewport: &Viewport) -> usize {
    let h = viewport.row_height();
    if h == 0 {
        return 1;
    }
    ((viewport.container_size() / h) as usize).max(1)
}

fn is_target(list: &mut ItemList, index: usize) -> bool {
    let Some(id) = list.row(index).and_then(ViewRow::item_id) else {
        return false;
    };
    list.item(id).is_some_and(|item| item.selectable)
}

fn first_from(list: &mut ItemList, start: usize, len: usize) -> Option<usize> {
    (start..len).find(|&i| is_target(list, i))
}

fn last_until(list: &mut ItemList, end_inclusive: usize) -> Option<usize> {
    (0..=end_inclusive).rev().find(|&i| is_target(list, i))
}

/// Moves from the `current` row to the next selectable item row for `key`.
///
/// Group headers and unselectable rows are skipped; navigation does not wrap.
pub fn navigate(
    list: &mut ItemList,
    viewport: &Viewport,
    key: NavKey,
    current: Option<usize>,
) -> Option<usize> {
    let len = list.current_view().len();
    if len == 0 {
        return None;
    }
    let last = len - 1;
    let page = page_size(viewport);

    match (key, current) {
        (NavKey::Home, _) | (NavKey::Down, None) | (NavKey::PageDown, None) => {
            first_from(list, 0, len)
        }
        (NavKey::End, _) | (NavKey::Up, None) | (NavKey::PageUp, None) => last_until(list, last),
        (NavKey::Down, Some(c)) => first_from(list, c + 1, len),
        (NavKey::Up, Some(c)) => c.checked_sub(1).and_then(|p| last_until(list, p)),
        (NavKey::PageDown, Some(c)) => {
            let target = c.saturating_add(page).min(last);
            first_from(list, target, len).or_else(|| {
                (c + 1..=target).rev().find(|&i| is_target(list, i))
            })
        }
        (NavKey::PageUp, Some(c)) => {
            let target = c.saturating_sub(page);
            last_until(list, target).or_else(|| (target..c).find(|&i| is_target(list, i)))
        }
    }
}
