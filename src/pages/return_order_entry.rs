//! B2B return entry: entry-order confirm for returned goods (B2BRK).
//!
//! Blank order codes are minted from the clock, and the submit body carries
//! the flat `detail_<n>` objects the backend reads alongside the document.

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, first_line};
use crate::schema::FieldDescriptor;

const FALLBACK_WAREHOUSE: &str = "DCN";

static BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("entryOrderCode", "Entry Order Code").optional(),
    FieldDescriptor::text("warehouseCode", "Warehouse Code").optional(),
];

static ITEM_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("itemCode", "Item Code"),
    FieldDescriptor::number("planQty", "Plan Qty", 1),
    FieldDescriptor::number("actualQty", "Actual Qty", 1).optional(),
];

pub static PAGE: PageSpec = PageSpec {
    name: "return-order-entry",
    title: "Return Order Entry",
    submit_path: "/return_order_entry/submit",
    preset_path: Some("/return_order_entry/preset"),
    encoding: BodyEncoding::Json,
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
            "apiMethodName": "entryorder.confirm",
            "entryOrder": {
                "confirmType": 0,
                "entryOrderCode": "",
                "entryOrderId": "",
                "entryOrderType": "B2BRK",
                "operateTime": "",
                "outBizCode": "",
                "ownerCode": "NEWTESTXIER",
                "remark": "",
                "status": "PARTFULFILLED",
                "warehouseCode": ""
            },
            "orderLines": [
                {
                    "actualQty": "",
                    "batchCode": "",
                    "expireDate": "",
                    "inventoryType": "ZP",
                    "itemCode": "",
                    "itemId": "",
                    "itemName": "儿童折叠滑板车",
                    "orderLineNo": "1",
                    "outBizCode": "",
                    "ownerCode": "NEWTESTXIER",
                    "planQty": "",
                    "produceCode": "",
                    "productDate": ""
                }
            ],
            "responseClass": "com.qimen.api.response.EntryorderConfirmResponse",
            "version": "2.0"
        },
        "outOrderCode": "",
        "type": 2
    })
}

fn build(
    preset: &Value,
    state: &FormState,
    mode: BuildMode,
    ctx: &BuildContext,
) -> Result<Value, BuildError> {
    let code = match state.base("entryOrderCode").trim() {
        "" => format!("RO{}", ctx.epoch_millis()),
        code => code.to_string(),
    };
    let warehouse = match state.base("warehouseCode").trim() {
        "" => FALLBACK_WAREHOUSE.to_string(),
        warehouse => warehouse.to_string(),
    };

    let mut doc = preset.clone();
    let template = first_line(&doc["callbackResponse"], "orderLines");

    let entry = &mut doc["callbackResponse"]["entryOrder"];
    entry["entryOrderCode"] = json!(code);
    entry["entryOrderId"] = json!(code);
    entry["outBizCode"] = json!(code);
    entry["operateTime"] = json!(ctx.utc_time());
    entry["warehouseCode"] = json!(warehouse);
    doc["callbackResponse"]["outOrderCode"] = json!(code);

    let mut lines = Vec::new();
    for (i, _) in state.items.iter().enumerate() {
        let item_code = state.item(i, "itemCode");
        let plan = state.item(i, "planQty");
        let actual = match state.item(i, "actualQty") {
            "" => plan,
            actual => actual,
        };
        let mut line = template.clone();
        line["itemCode"] = json!(item_code);
        line["planQty"] = json!(plan);
        line["actualQty"] = json!(actual);
        line["orderLineNo"] = json!((i + 1).to_string());
        lines.push(line);
    }
    doc["callbackResponse"]["orderLines"] = json!(lines);

    if mode == BuildMode::Submit {
        // The backend reads the details from flat keys, not the document.
        doc["detail_count"] = json!(state.items.len());
        for (i, _) in state.items.iter().enumerate() {
            let plan = state.item(i, "planQty");
            let actual = match state.item(i, "actualQty") {
                "" => plan,
                actual => actual,
            };
            doc[format!("detail_{i}")] = json!({
                "itemCode": state.item(i, "itemCode"),
                "planQty": plan,
                "actualQty": actual
            });
        }
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::test_support::{ctx, state};

    #[test]
    fn blank_code_is_minted_from_the_clock() {
        let state = state(&[], &[&[("itemCode", "A"), ("planQty", "2")]]);
        let doc = build(&preset(), &state, BuildMode::Preview, &ctx()).unwrap();
        let entry = &doc["callbackResponse"]["entryOrder"];
        assert_eq!(entry["entryOrderCode"], "RO1709296200000");
        assert_eq!(entry["warehouseCode"], FALLBACK_WAREHOUSE);
        assert_eq!(doc["callbackResponse"]["outOrderCode"], "RO1709296200000");
        assert_eq!(doc["outOrderCode"], "");
    }

    #[test]
    fn actual_qty_defaults_to_plan_qty() {
        let state = state(
            &[("entryOrderCode", "RO9"), ("warehouseCode", "W")],
            &[&[("itemCode", "A"), ("planQty", "5")]],
        );
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        let line = &doc["callbackResponse"]["orderLines"][0];
        assert_eq!(line["planQty"], "5");
        assert_eq!(line["actualQty"], "5");
        assert_eq!(line["ownerCode"], "NEWTESTXIER");
    }

    #[test]
    fn submit_body_adds_flat_details() {
        let state = state(
            &[("entryOrderCode", "RO9")],
            &[&[("itemCode", "A"), ("planQty", "5"), ("actualQty", "4")]],
        );
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        assert_eq!(doc["detail_count"], 1);
        assert_eq!(
            doc["detail_0"],
            json!({ "itemCode": "A", "planQty": "5", "actualQty": "4" })
        );
    }

    #[test]
    fn preview_body_has_no_flat_details() {
        let state = state(&[("entryOrderCode", "RO9")], &[&[("itemCode", "A")]]);
        let doc = build(&preset(), &state, BuildMode::Preview, &ctx()).unwrap();
        assert!(doc.get("detail_count").is_none());
    }
}
