//! Other outbound: stockout confirm posted as a classic urlencoded form.

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, first_line, require};
use crate::schema::FieldDescriptor;

static BASE_FIELDS: &[FieldDescriptor] =
    &[FieldDescriptor::text("deliveryOrderCode", "Delivery Order Code")];

static ITEM_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("itemCode", "Item Code"),
    FieldDescriptor::number("actualQty", "Actual Qty", 1),
];

pub static PAGE: PageSpec = PageSpec {
    name: "inventory-out",
    title: "Other Outbound",
    submit_path: "/inventory_out/submit",
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
        "type": 2,
        "callbackResponse": {
            "apiMethodName": "stockout.confirm",
            "deliveryOrder": {
                "confirmType": 0,
                "deliveryOrderCode": "GSO20250808126164",
                "operateTime": "2021-03-17 16:57:15",
                "orderConfirmTime": "2021-03-17 16:57:15",
                "orderType": "DBCK",
                "outBizCode": "GSO20250808126164",
                "ownerCode": "XIER",
                "status": "PARTDELIVERED",
                "warehouseCode": "DCN"
            },
            "orderLines": [
                {
                    "actualQty": "100",
                    "inventoryType": "ZP",
                    "itemCode": "6937334127735",
                    "orderLineNo": "1",
                    "ownerCode": "XIER"
                }
            ],
            "responseClass": "com.qimen.api.response.StockoutConfirmResponse",
            "version": "2.0"
        }
    })
}

fn build(
    preset: &Value,
    state: &FormState,
    mode: BuildMode,
    ctx: &BuildContext,
) -> Result<Value, BuildError> {
    let code = require(mode, state.base("deliveryOrderCode"), "deliveryOrderCode")?;
    let now = ctx.wall_time();

    let mut doc = preset.clone();
    let template = first_line(&doc["callbackResponse"], "orderLines");

    let delivery = &mut doc["callbackResponse"]["deliveryOrder"];
    delivery["deliveryOrderCode"] = json!(code);
    delivery["outBizCode"] = json!(code);
    delivery["operateTime"] = json!(now);
    delivery["orderConfirmTime"] = json!(now);

    let lines: Vec<Value> = state
        .items
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let mut line = template.clone();
            line["itemCode"] = json!(state.item(i, "itemCode"));
            line["actualQty"] = json!(state.item(i, "actualQty"));
            line["orderLineNo"] = json!((i + 1).to_string());
            line
        })
        .collect();
    doc["callbackResponse"]["orderLines"] = json!(lines);

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::test_support::{ctx, state};

    #[test]
    fn delivery_code_overrides_sample_and_mirrors() {
        let state = state(
            &[("deliveryOrderCode", "GSO77")],
            &[&[("itemCode", "X"), ("actualQty", "3")]],
        );
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        let delivery = &doc["callbackResponse"]["deliveryOrder"];
        assert_eq!(delivery["deliveryOrderCode"], "GSO77");
        assert_eq!(delivery["outBizCode"], "GSO77");
        // Sample warehouse from the skeleton is kept as-is.
        assert_eq!(delivery["warehouseCode"], "DCN");
    }

    #[test]
    fn every_line_is_emitted_with_string_qty() {
        let state = state(
            &[("deliveryOrderCode", "GSO77")],
            &[&[("itemCode", "X"), ("actualQty", "3")], &[]],
        );
        let doc = build(&preset(), &state, BuildMode::Preview, &ctx()).unwrap();
        let lines = doc["callbackResponse"]["orderLines"].as_array().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["actualQty"], "3");
        assert_eq!(lines[1]["itemCode"], "");
        assert_eq!(lines[1]["orderLineNo"], "2");
    }
}
