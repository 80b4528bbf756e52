//! Comparator and sorting helpers for flat and hierarchical collections.

use alloc::borrow::Cow;
use alloc::string::String;
use core::cmp::Ordering;

use crate::{Accessor, Item, Value, ValueType};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Maps an ascending ordering onto this direction.
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Self::Ascending => ord,
            Self::Descending => ord.reverse(),
        }
    }
}

/// A sort descriptor: what to read, which direction, and optionally how to compare.
#[derive(Clone, Debug, PartialEq)]
pub struct SortInfo {
    pub key: Accessor,
    pub order: SortOrder,
    /// Forces a comparison family (e.g. compare integers as dates).
    pub value_type: Option<ValueType>,
}

impl SortInfo {
    pub fn new(key: impl Into<Accessor>, order: SortOrder) -> Self {
        Self {
            key: key.into(),
            order,
            value_type: None,
        }
    }

    pub fn ascending(key: impl Into<Accessor>) -> Self {
        Self::new(key, SortOrder::Ascending)
    }

    pub fn descending(key: impl Into<Accessor>) -> Self {
        Self::new(key, SortOrder::Descending)
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    fn value<'a>(&self, item: &'a Item) -> Option<Cow<'a, Value>> {
        match &item.sort_field {
            Some(field) => item.get(field).map(Cow::Borrowed),
            None => self.key.value(item),
        }
    }
}

/// Compares two items under a single descriptor.
///
/// Policy, in order:
/// - both values absent: equal;
/// - one absent: the absent one sorts first when ascending, last when descending;
/// - lazy values are evaluated;
/// - values of the same comparison family compare numerically (numbers) or by timestamp
///   (dates, or any value when the descriptor forces [`ValueType::Date`]);
/// - everything else compares the values' text, case-sensitively.
pub fn compare(a: &Item, b: &Item, info: &SortInfo) -> Ordering {
    let va = info.value(a);
    let vb = info.value(b);
    compare_optional(va.as_deref(), vb.as_deref(), info.order, info.value_type)
}

/// Applies descriptors in priority order; the first non-equal result wins.
pub fn compare_many(a: &Item, b: &Item, infos: &[SortInfo]) -> Ordering {
    infos
        .iter()
        .map(|info| compare(a, b, info))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

pub(crate) fn compare_optional(
    a: Option<&Value>,
    b: Option<&Value>,
    order: SortOrder,
    value_type: Option<ValueType>,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => order.apply(Ordering::Less),
        (Some(_), None) => order.apply(Ordering::Greater),
        (Some(a), Some(b)) => order.apply(compare_values(a, b, value_type)),
    }
}

/// Ascending comparison of two present values.
pub fn compare_values(a: &Value, b: &Value, value_type: Option<ValueType>) -> Ordering {
    let a = a.resolve();
    let b = b.resolve();

    let family = match value_type {
        Some(forced) => Some(forced),
        None => match (a.value_type(), b.value_type()) {
            (Some(ta), Some(tb)) if ta == tb => Some(ta),
            _ => None,
        },
    };

    match family {
        Some(ValueType::Number) => {
            if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            }
        }
        Some(ValueType::Date) => {
            if let (Some(x), Some(y)) = (a.as_timestamp(), b.as_timestamp()) {
                return x.cmp(&y);
            }
        }
        Some(ValueType::Text) | None => {}
    }

    compare_text(&a.to_text(), &b.to_text())
}

/// Locale-style text order: letters compare case-insensitively first, then lowercase sorts
/// before uppercase, then raw text breaks any remaining tie.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<String>();
    folded(a)
        .cmp(&folded(b))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Stable sort of any slice whose elements expose an [`Item`].
pub fn sort_by_item<T>(list: &mut [T], infos: &[SortInfo], item_of: impl Fn(&T) -> &Item) {
    if infos.is_empty() {
        return;
    }
    list.sort_by(|a, b| compare_many(item_of(a), item_of(b), infos));
}

/// Sorts a flat collection in place.
pub fn sort_items(items: &mut [Item], infos: &[SortInfo]) {
    sort_by_item(items, infos, |it| it);
}

/// Sorts a hierarchical collection: each sibling group is sorted independently, recursively,
/// so the tree keeps its shape.
pub fn sort_tree(items: &mut [Item], infos: &[SortInfo], children_field: &str) {
    sort_items(items, infos);
    for item in items.iter_mut() {
        if let Some(children) = item.children_mut(children_field) {
            sort_tree(children, infos, children_field);
        }
    }
}

/// Sorts a list of values (used for group key ordering).
pub(crate) fn sort_keys<T>(
    keys: &mut [T],
    order: SortOrder,
    key_of: impl Fn(&T) -> Option<&Value>,
) {
    keys.sort_by(|a, b| compare_optional(key_of(a), key_of(b), order, None));
}
