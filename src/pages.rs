//! Page registry: one [`PageSpec`] per connector form.
//!
//! Every page used to be its own hand-written controller; here each is a
//! static description (fields, bounds, endpoint, embedded preset) plus one
//! pure build function. Everything else — rendering, validation, preview,
//! persistence, submission — is generic over the page description.

mod allocation_in;
mod allocation_out;
mod exchange_order;
mod inventory_adjustment;
mod inventory_entry;
mod inventory_out;
mod order_delivery;
mod order_download;
mod refund_order;
mod return_order_entry;
mod return_order_notice;
mod stockout_push;

use serde_json::Value;

use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode};
use crate::schema::FieldDescriptor;

/// How the submit body is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// The built document, as `application/json`.
    Json,
    /// The flattened form fields, as `application/x-www-form-urlencoded`.
    Form,
}

type BuildFn = fn(&Value, &FormState, BuildMode, &BuildContext) -> Result<Value, BuildError>;

pub struct PageSpec {
    /// Stable slug used on the command line and as the storage key stem.
    pub name: &'static str,
    pub title: &'static str,
    /// Path on the connector backend the submit body is posted to.
    pub submit_path: &'static str,
    /// Optional path serving a fresher preset than the embedded one.
    pub preset_path: Option<&'static str>,
    pub encoding: BodyEncoding,
    pub min_items: usize,
    pub max_items: usize,
    /// First line number used in flattened field names and line labels.
    pub index_origin: usize,
    pub base_fields: &'static [FieldDescriptor],
    pub item_fields: &'static [FieldDescriptor],
    /// Connector document skeleton the build function fills in.
    pub preset: fn() -> Value,
    pub build: BuildFn,
}

impl PageSpec {
    /// Flattens form state into wire form fields: base fields by key, the
    /// line count, then per-line fields suffixed with their line number.
    pub fn flatten(&self, state: &FormState) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for field in self.base_fields {
            pairs.push((field.key.to_string(), state.base(field.key).to_string()));
        }
        if !self.item_fields.is_empty() {
            pairs.push(("detail_count".to_string(), state.items.len().to_string()));
            for (index, _) in state.items.iter().enumerate() {
                let n = self.index_origin + index;
                for field in self.item_fields {
                    pairs.push((
                        format!("{}{n}", field.key),
                        state.item(index, field.key).to_string(),
                    ));
                }
            }
        }
        pairs
    }
}

/// All pages, in menu order.
pub static ALL: &[&PageSpec] = &[
    &allocation_in::PAGE,
    &allocation_out::PAGE,
    &exchange_order::PAGE,
    &inventory_adjustment::PAGE,
    &inventory_entry::PAGE,
    &inventory_out::PAGE,
    &order_delivery::PAGE,
    &order_download::PAGE,
    &refund_order::PAGE,
    &return_order_entry::PAGE,
    &return_order_notice::PAGE,
    &stockout_push::PAGE,
];

pub fn find(name: &str) -> Option<&'static PageSpec> {
    ALL.iter().copied().find(|page| page.name == name)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::collections::HashSet;

    #[test]
    fn page_names_are_unique() {
        let mut seen = HashSet::new();
        for page in ALL {
            assert!(seen.insert(page.name), "duplicate page name {}", page.name);
        }
    }

    #[test]
    fn find_resolves_every_registered_page() {
        for page in ALL {
            assert!(find(page.name).is_some());
        }
        assert!(find("no-such-page").is_none());
    }

    #[test]
    fn bounds_are_sane() {
        for page in ALL {
            assert!(page.min_items <= page.max_items, "{}", page.name);
            if page.item_fields.is_empty() {
                assert_eq!(page.max_items, 0, "{}", page.name);
            } else {
                assert!(page.min_items >= 1, "{}", page.name);
            }
        }
    }

    #[test]
    fn flatten_suffixes_lines_from_index_origin() {
        let page = find("return-order-notice").unwrap();
        assert_eq!(page.index_origin, 1);

        let mut base = BTreeMap::new();
        base.insert("returnOrderCode".to_string(), "RN1".to_string());
        let mut line = BTreeMap::new();
        line.insert("itemCode".to_string(), "A".to_string());
        let state = FormState {
            base,
            items: vec![line],
        };

        let pairs = page.flatten(&state);
        assert!(pairs.contains(&("returnOrderCode".to_string(), "RN1".to_string())));
        assert!(pairs.contains(&("detail_count".to_string(), "1".to_string())));
        assert!(pairs.contains(&("itemCode1".to_string(), "A".to_string())));
    }

    #[test]
    fn flatten_skips_line_count_without_item_fields() {
        let page = find("inventory-adjustment").unwrap();
        let state = FormState::default();
        let pairs = page.flatten(&state);
        assert!(!pairs.iter().any(|(k, _)| k == "detail_count"));
    }
}
