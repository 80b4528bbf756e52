use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::Value;

/// A displayable row: a mapping from field name to [`Value`] plus reserved row state.
///
/// Children of hierarchical items are stored as [`Value::Items`] under the list's configured
/// children field (see [`crate::ItemListOptions::children_field`]).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Item {
    fields: BTreeMap<String, Value>,
    pub selected: bool,
    pub selectable: bool,
    pub collapsed: bool,
    pub collapsible: bool,
    /// Display-size hint in the scroll axis (e.g. a measured row height).
    pub size: Option<u32>,
    /// Overrides the field a sort descriptor reads for this item.
    pub sort_field: Option<String>,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            fields: BTreeMap::new(),
            selected: false,
            selectable: true,
            collapsed: false,
            collapsible: true,
            size: None,
            sort_field: None,
        }
    }
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn with_children(self, field: impl Into<String>, children: Vec<Item>) -> Self {
        self.with(field, Value::Items(children))
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn with_collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = collapsible;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_sort_field(mut self, field: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields.get_mut(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Children stored under `field`, if that field holds a nested collection.
    pub fn children(&self, field: &str) -> Option<&[Item]> {
        self.get(field).and_then(Value::as_items)
    }

    pub fn children_mut(&mut self, field: &str) -> Option<&mut Vec<Item>> {
        match self.fields.get_mut(field) {
            Some(Value::Items(items)) => Some(items),
            _ => None,
        }
    }

    pub(crate) fn take_children(&mut self, field: &str) -> Vec<Item> {
        match self.fields.remove(field) {
            Some(Value::Items(items)) => items,
            Some(other) => {
                lwarn!(field, "children field does not hold an item collection");
                self.fields.insert(field.into(), other);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Display text of `field`; absent and falsy values yield `""`.
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(Value::to_text).unwrap_or_default()
    }
}
