//! Bucketing of items into synthetic group headers.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::sorting::{SortOrder, sort_keys};
use crate::{Accessor, Item, Value};

/// How buckets are ordered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupOrder {
    /// In the order each key is first encountered.
    #[default]
    FirstSeen,
    /// By key value.
    Sorted(SortOrder),
}

/// A group descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupInfo {
    pub key: Accessor,
    pub order: GroupOrder,
}

impl GroupInfo {
    pub fn new(key: impl Into<Accessor>) -> Self {
        Self {
            key: key.into(),
            order: GroupOrder::FirstSeen,
        }
    }

    pub fn with_order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }
}

/// A synthetic header row emitted for a non-empty bucket.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupHeader {
    /// Nesting level (0 for the first descriptor).
    pub level: usize,
    /// Display text of the bucket key (`""` for items without a key).
    pub key: String,
    /// Keys of this header and all enclosing headers, outermost first.
    pub path: Vec<String>,
    /// Number of items in the bucket (before any collapse).
    pub count: usize,
}

/// Items that share a group key, in their incoming relative order.
#[derive(Clone, Debug)]
pub struct Bucket<T> {
    pub key: String,
    pub value: Option<Value>,
    pub members: Vec<T>,
}

/// Partitions `members` by the descriptor's key. Member order inside each bucket is preserved.
pub fn bucket<T>(
    members: Vec<T>,
    info: &GroupInfo,
    item_of: impl Fn(&T) -> &Item,
) -> Vec<Bucket<T>> {
    let mut buckets: Vec<Bucket<T>> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();

    for member in members {
        let value = info.key.value(item_of(&member)).map(|v| v.resolve().into_owned());
        let key = value.as_ref().map(Value::to_text).unwrap_or_default();
        match index.get(&key) {
            Some(&i) => buckets[i].members.push(member),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push(Bucket {
                    key,
                    value,
                    members: alloc::vec![member],
                });
            }
        }
    }

    if let GroupOrder::Sorted(order) = info.order {
        sort_keys(&mut buckets, order, |b| b.value.as_ref());
    }
    buckets
}

/// A row of a grouped sequence: either a header or a member item.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupedRow<'a> {
    Header(GroupHeader),
    Member(&'a Item),
}

/// Groups a flat sequence: one header per non-empty bucket followed by its members. Multiple
/// descriptors nest, outermost first.
pub fn group_items<'a>(items: &'a [Item], infos: &[GroupInfo]) -> Vec<GroupedRow<'a>> {
    let mut out = Vec::with_capacity(items.len());
    emit(items.iter().collect(), infos, 0, &mut Vec::new(), &mut out);
    out
}

fn emit<'a>(
    members: Vec<&'a Item>,
    infos: &[GroupInfo],
    level: usize,
    path: &mut Vec<String>,
    out: &mut Vec<GroupedRow<'a>>,
) {
    let Some(info) = infos.get(level) else {
        out.extend(members.into_iter().map(GroupedRow::Member));
        return;
    };
    for b in bucket(members, info, |it| *it) {
        path.push(b.key.clone());
        out.push(GroupedRow::Header(GroupHeader {
            level,
            key: b.key,
            path: path.clone(),
            count: b.members.len(),
        }));
        emit(b.members, infos, level + 1, path, out);
        path.pop();
    }
}

/// Removes every descriptor equal to `info`. Returns `true` if one was removed.
///
/// Since grouped views are always rebuilt from the source order, members regain their prior
/// relative ordering once the descriptor is gone.
pub fn ungroup(infos: &mut Vec<GroupInfo>, info: &GroupInfo) -> bool {
    let before = infos.len();
    infos.retain(|g| g != info);
    infos.len() != before
}
