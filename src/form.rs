//! In-memory form state: base field values plus an ordered line-item list.
//!
//! Line items carry an id assigned at insertion and never reused within a
//! form session. Focus tracking, copy, and remove all address items by id,
//! so renumbering on screen never detaches an edit from its row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LineItemError {
    #[error("line item count may not exceed {0}")]
    TooMany(usize),
    #[error("at least one line item is required")]
    LastItem,
}

/// One line of the item table. Values are keyed by field key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub id: u64,
    pub values: BTreeMap<String, String>,
}

/// Ordered, bounded collection of line items.
#[derive(Debug, Clone)]
pub struct LineItems {
    items: Vec<LineItem>,
    next_id: u64,
    min: usize,
    max: usize,
}

impl LineItems {
    /// Creates a collection holding `min` empty items.
    pub fn new(min: usize, max: usize) -> Self {
        let mut this = Self {
            items: Vec::new(),
            next_id: 0,
            min,
            max,
        };
        for _ in 0..min {
            this.push_empty();
        }
        this
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut LineItem> {
        self.items.get_mut(index)
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn push_empty(&mut self) {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(LineItem {
            id,
            values: BTreeMap::new(),
        });
    }

    /// Sets the item count directly. Counts below the minimum clamp up;
    /// counts above the maximum are rejected. Shrinking drops items from
    /// the tail; growing appends empty items. Surviving values are kept.
    pub fn resize(&mut self, count: usize) -> Result<(), LineItemError> {
        if count > self.max {
            return Err(LineItemError::TooMany(self.max));
        }
        let target = count.max(self.min);
        while self.items.len() > target {
            self.items.pop();
        }
        while self.items.len() < target {
            self.push_empty();
        }
        Ok(())
    }

    /// Inserts an empty item after `index`. Returns the new item's id.
    pub fn add_after(&mut self, index: usize) -> Result<u64, LineItemError> {
        if self.items.len() >= self.max {
            return Err(LineItemError::TooMany(self.max));
        }
        let id = self.next_id;
        self.next_id += 1;
        let at = (index + 1).min(self.items.len());
        self.items.insert(
            at,
            LineItem {
                id,
                values: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    /// Inserts a copy of the item at `index` directly after it. Returns the
    /// new item's id.
    pub fn copy(&mut self, index: usize) -> Result<u64, LineItemError> {
        if self.items.len() >= self.max {
            return Err(LineItemError::TooMany(self.max));
        }
        let Some(source) = self.items.get(index) else {
            return self.add_after(index);
        };
        let values = source.values.clone();
        let id = self.next_id;
        self.next_id += 1;
        self.items.insert(index + 1, LineItem { id, values });
        Ok(id)
    }

    /// Removes the item at `index`. Removing the sole remaining item is
    /// rejected so the table never renders empty.
    pub fn remove(&mut self, index: usize) -> Result<(), LineItemError> {
        if self.items.len() <= self.min.max(1) {
            return Err(LineItemError::LastItem);
        }
        if index < self.items.len() {
            self.items.remove(index);
        }
        Ok(())
    }
}

/// Plain value snapshot of a form: what autosave writes and builders read.
///
/// Ids are a session concern and deliberately absent; a restored draft
/// gets fresh ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub base: BTreeMap<String, String>,
    pub items: Vec<BTreeMap<String, String>>,
}

impl FormState {
    /// Snapshot of live editing state.
    pub fn capture(base: &BTreeMap<String, String>, items: &LineItems) -> Self {
        Self {
            base: base.clone(),
            items: items.iter().map(|item| item.values.clone()).collect(),
        }
    }

    /// Base field value, empty string when unset.
    pub fn base(&self, key: &str) -> &str {
        self.base.get(key).map_or("", String::as_str)
    }

    /// Line field value, empty string when unset or out of range.
    pub fn item(&self, index: usize, key: &str) -> &str {
        self.items
            .get(index)
            .and_then(|values| values.get(key))
            .map_or("", String::as_str)
    }

    /// Restores a draft into a live collection, clamping to its bounds.
    pub fn restore_items(&self, min: usize, max: usize) -> LineItems {
        let mut items = LineItems::new(min, max);
        let count = self.items.len().clamp(min, max);
        // new() already filled to min; resize within [min, max] cannot fail.
        let _ = items.resize(count);
        for (index, values) in self.items.iter().take(count).enumerate() {
            if let Some(item) = items.get_mut(index) {
                item.values = values.clone();
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(items: &mut LineItems, index: usize, key: &str, value: &str) {
        items
            .get_mut(index)
            .unwrap()
            .values
            .insert(key.to_string(), value.to_string());
    }

    #[test]
    fn new_fills_to_minimum() {
        let items = LineItems::new(1, 20);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn resize_clamps_below_minimum() {
        let mut items = LineItems::new(1, 20);
        items.resize(5).unwrap();
        assert_eq!(items.len(), 5);
        items.resize(0).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn resize_rejects_above_maximum() {
        let mut items = LineItems::new(1, 10);
        assert_eq!(items.resize(11), Err(LineItemError::TooMany(10)));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn resize_preserves_surviving_values() {
        let mut items = LineItems::new(1, 20);
        items.resize(3).unwrap();
        filled(&mut items, 0, "itemCode", "SKU1");
        filled(&mut items, 2, "itemCode", "SKU3");
        items.resize(2).unwrap();
        assert_eq!(items.get(0).unwrap().values["itemCode"], "SKU1");
        items.resize(4).unwrap();
        assert_eq!(items.get(0).unwrap().values["itemCode"], "SKU1");
        assert!(items.get(3).unwrap().values.is_empty());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut items = LineItems::new(1, 20);
        let a = items.add_after(0).unwrap();
        items.remove(1).unwrap();
        let b = items.add_after(0).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn copy_duplicates_values_with_fresh_id() {
        let mut items = LineItems::new(1, 20);
        filled(&mut items, 0, "itemCode", "SKU1");
        let id = items.copy(0).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items.get(1).unwrap().id, id);
        assert_eq!(items.get(1).unwrap().values["itemCode"], "SKU1");
        assert_ne!(items.get(0).unwrap().id, id);
    }

    #[test]
    fn remove_sole_item_is_rejected() {
        let mut items = LineItems::new(1, 20);
        filled(&mut items, 0, "itemCode", "SKU1");
        assert_eq!(items.remove(0), Err(LineItemError::LastItem));
        assert_eq!(items.get(0).unwrap().values["itemCode"], "SKU1");
    }

    #[test]
    fn capture_and_restore_round_trip() {
        let mut items = LineItems::new(1, 20);
        items.resize(2).unwrap();
        filled(&mut items, 0, "itemCode", "SKU1");
        filled(&mut items, 1, "actualQty", "5");
        let mut base = BTreeMap::new();
        base.insert("entryOrderCode".to_string(), "EO123".to_string());

        let state = FormState::capture(&base, &items);
        let restored = state.restore_items(1, 20);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get(0).unwrap().values["itemCode"], "SKU1");
        assert_eq!(restored.get(1).unwrap().values["actualQty"], "5");
    }

    #[test]
    fn restore_clamps_oversized_draft() {
        let state = FormState {
            base: BTreeMap::new(),
            items: vec![BTreeMap::new(); 15],
        };
        let restored = state.restore_items(1, 10);
        assert_eq!(restored.len(), 10);
    }

    #[test]
    fn missing_values_read_as_empty() {
        let state = FormState::default();
        assert_eq!(state.base("warehouseCode"), "");
        assert_eq!(state.item(3, "itemCode"), "");
    }
}
