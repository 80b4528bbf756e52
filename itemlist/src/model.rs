//! Mapping between bound values and list items.

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::{Item, ItemList, ItemListOptions, Value};

impl ItemListOptions {
    /// Wraps a plain value (text, number, date) as an item: the value becomes the display text,
    /// the value field and, when configured, the search field.
    pub fn item_from_value(&self, value: impl Into<Value>) -> Item {
        let value = value.into();
        let mut item = Item::new()
            .with(self.text_field.clone(), value.to_text())
            .with(self.value_field.clone(), value.clone());
        if let Some(field) = &self.search_field {
            item.set(field.clone(), value.to_text());
        }
        item
    }

    /// Normalizes a record into an item. The record keeps all of its fields; the text and value
    /// fields are filled in when missing, and nested records are normalized recursively.
    ///
    /// `selected` applies to leaves only.
    pub fn item_from_record(&self, mut record: Item, selected: bool) -> Item {
        if !record.contains(&self.text_field) {
            let text = record.text(&self.value_field);
            record.set(self.text_field.clone(), text);
        }
        if !record.contains(&self.value_field) {
            let text = record.text(&self.text_field);
            record.set(self.value_field.clone(), text);
        }
        match record.children_mut(&self.children_field) {
            Some(children) => {
                for child in children.iter_mut() {
                    *child = self.item_from_record(core::mem::take(child), selected);
                }
            }
            None => record.selected = record.selected || selected,
        }
        record
    }

    /// Items standing in for bound selection values that have no item yet.
    ///
    /// On a multi-select list, a text value is a comma-separated list. A single-select list keeps
    /// the first value only.
    pub fn virtual_selection(&self, values: &[Value]) -> Vec<Item> {
        let stand_in = |text: &str, value: Value| {
            Item::new()
                .with(self.text_field.clone(), text.trim())
                .with(self.value_field.clone(), value)
                .with_selected(true)
        };

        let mut out = Vec::new();
        for value in values {
            match value.resolve().as_ref() {
                Value::Text(text) if self.multi_select => out.extend(
                    text.split(',')
                        .map(|part| stand_in(part, Value::Text(part.trim().into()))),
                ),
                Value::Items(_) => {}
                other => out.push(stand_in(&other.to_string(), other.clone())),
            }
            if !self.multi_select && !out.is_empty() {
                out.truncate(1);
                break;
            }
        }
        out
    }
}

impl ItemList {
    /// Replaces the collection with one item per plain value.
    pub fn set_values<V: Into<Value>>(&mut self, values: impl IntoIterator<Item = V>) {
        let items = values
            .into_iter()
            .map(|v| self.options().item_from_value(v))
            .collect();
        self.set_items(items);
    }

    /// Replaces the collection with normalized records (see
    /// [`ItemListOptions::item_from_record`]).
    pub fn set_records(&mut self, records: impl IntoIterator<Item = Item>, selected: bool) {
        let items = records
            .into_iter()
            .map(|r| self.options().item_from_record(r, selected))
            .collect();
        self.set_items(items);
    }

    /// Value-field values of the selected items, in depth-first order.
    pub fn selected_values(&self) -> Vec<Value> {
        let field = &self.options().value_field;
        self.selected_items()
            .into_iter()
            .filter_map(|id| self.item(id)?.get(field).cloned())
            .collect()
    }

    /// Selects the items whose value field matches one of `values`. Values without a matching
    /// item are returned as stand-in items (see [`ItemListOptions::virtual_selection`]).
    pub fn select_values(&mut self, values: &[Value]) -> crate::Result<Vec<Item>> {
        let field = self.options().value_field.clone();
        let mut matched = Vec::new();
        let mut missing = Vec::new();
        for value in values {
            let id = self
                .depth_first()
                .into_iter()
                .find(|&id| self.item(id).is_some_and(|it| it.get(&field) == Some(value)));
            match id {
                Some(id) => matched.push(id),
                None => missing.push(value.clone()),
            }
        }
        if !self.is_multi_select() {
            matched.truncate(1);
        }
        self.set_selected_items(&matched)?;
        if !self.is_multi_select() && !matched.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.options().virtual_selection(&missing))
    }
}
