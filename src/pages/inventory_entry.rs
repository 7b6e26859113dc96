//! Other inbound: purchase-style entry-order confirm (CGRK).

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, first_line, int_or_zero, require};
use crate::schema::FieldDescriptor;

static BASE_FIELDS: &[FieldDescriptor] =
    &[FieldDescriptor::text("entryOrderCode", "Entry Order Code")];

static ITEM_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("itemCode", "Item Code"),
    FieldDescriptor::number("actualQty", "Actual Qty", 1),
];

pub static PAGE: PageSpec = PageSpec {
    name: "inventory-entry",
    title: "Other Inbound",
    submit_path: "/inventory_entry/submit",
    preset_path: None,
    encoding: BodyEncoding::Form,
    min_items: 1,
    max_items: 10,
    index_origin: 0,
    base_fields: BASE_FIELDS,
    item_fields: ITEM_FIELDS,
    preset,
    build,
};

fn preset() -> Value {
    json!({
        "callbackResponse": {
            "apiMethodName": "taobao.qimen.entryorder.confirm",
            "entryOrder": {
                "confirmType": 0,
                "entryOrderCode": "GSI20250808044945",
                "entryOrderId": "GSI20250808044945",
                "entryOrderType": "CGRK",
                "operateTime": "2025-08-08 10:58:44",
                "outBizCode": "GSI20250808044945",
                "ownerCode": "xier",
                "remark": "",
                "status": "PARTFULFILLED",
                "warehouseCode": "DCN"
            },
            "orderLines": [
                {
                    "actualQty": 2000,
                    "inventoryType": "ZP",
                    "itemCode": "6937334127735",
                    "orderLineNo": "",
                    "ownerCode": "xier"
                }
            ],
            "responseClass": "com.qimen.api.response.EntryorderConfirmResponse",
            "version": "2.0"
        },
        "entryOrderCode": "GSI20250808044945",
        "type": 2
    })
}

fn build(
    preset: &Value,
    state: &FormState,
    mode: BuildMode,
    ctx: &BuildContext,
) -> Result<Value, BuildError> {
    let code = require(mode, state.base("entryOrderCode"), "entryOrderCode")?;

    let mut doc = preset.clone();
    let template = first_line(&doc["callbackResponse"], "orderLines");

    // The code is mirrored at the top level as well as inside the order.
    doc["entryOrderCode"] = json!(code);
    let entry = &mut doc["callbackResponse"]["entryOrder"];
    entry["entryOrderCode"] = json!(code);
    entry["entryOrderId"] = json!(code);
    entry["outBizCode"] = json!(code);
    entry["operateTime"] = json!(ctx.wall_time());

    let mut lines = Vec::new();
    for (i, _) in state.items.iter().enumerate() {
        let item_code = state.item(i, "itemCode");
        let qty = state.item(i, "actualQty");
        if item_code.is_empty() || qty.is_empty() {
            continue;
        }
        let mut line = template.clone();
        line["itemCode"] = json!(item_code);
        line["actualQty"] = json!(int_or_zero(qty));
        lines.push(line);
    }
    doc["callbackResponse"]["orderLines"] = json!(lines);

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::test_support::{ctx, state};

    #[test]
    fn code_is_mirrored_top_level_and_inside_order() {
        let state = state(
            &[("entryOrderCode", "GSI1")],
            &[&[("itemCode", "A"), ("actualQty", "7")]],
        );
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        assert_eq!(doc["entryOrderCode"], "GSI1");
        let entry = &doc["callbackResponse"]["entryOrder"];
        assert_eq!(entry["entryOrderCode"], "GSI1");
        assert_eq!(entry["entryOrderId"], "GSI1");
        assert_eq!(entry["outBizCode"], "GSI1");
        assert_eq!(entry["entryOrderType"], "CGRK");
    }

    #[test]
    fn quantities_are_numeric_and_template_fields_survive() {
        let state = state(
            &[("entryOrderCode", "GSI1")],
            &[&[("itemCode", "A"), ("actualQty", "7")]],
        );
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        let line = &doc["callbackResponse"]["orderLines"][0];
        assert_eq!(line["actualQty"], 7);
        assert_eq!(line["ownerCode"], "xier");
    }

    #[test]
    fn empty_lines_are_dropped() {
        let state = state(
            &[("entryOrderCode", "GSI1")],
            &[&[("itemCode", "A"), ("actualQty", "7")], &[("itemCode", "B")]],
        );
        let doc = build(&preset(), &state, BuildMode::Preview, &ctx()).unwrap();
        assert_eq!(doc["callbackResponse"]["orderLines"].as_array().unwrap().len(), 1);
    }
}
