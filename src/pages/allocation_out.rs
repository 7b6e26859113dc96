//! Allocation outbound: stockout confirm for warehouse transfers (DBCK).

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, first_line, require};
use crate::schema::FieldDescriptor;

static BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("deliveryOrderCode", "Delivery Order Code"),
    FieldDescriptor::text("warehouseCode", "Warehouse Code"),
];

static ITEM_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("itemCode", "Item Code"),
    FieldDescriptor::number("actualQty", "Actual Qty", 1),
];

pub static PAGE: PageSpec = PageSpec {
    name: "allocation-out",
    title: "Allocation Outbound",
    submit_path: "/allocation_out/submit",
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
                "deliveryOrderCode": "",
                "operateTime": "2021-03-17 16:57:15",
                "orderConfirmTime": "2021-03-17 16:57:15",
                "orderType": "DBCK",
                "outBizCode": "",
                "ownerCode": "XIER",
                "status": "PARTDELIVERED",
                "warehouseCode": ""
            },
            "orderLines": [
                {
                    "actualQty": "",
                    "inventoryType": "ZP",
                    "itemCode": "",
                    "orderLineNo": "",
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
    let warehouse = require(mode, state.base("warehouseCode"), "warehouseCode")?;
    let now = ctx.wall_time();

    let mut doc = preset.clone();
    let template = first_line(&doc["callbackResponse"], "orderLines");

    let delivery = &mut doc["callbackResponse"]["deliveryOrder"];
    delivery["deliveryOrderCode"] = json!(code);
    delivery["outBizCode"] = json!(code);
    delivery["warehouseCode"] = json!(warehouse);
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
    fn delivery_code_mirrors_into_out_biz_code() {
        let state = state(
            &[("deliveryOrderCode", "DB01"), ("warehouseCode", "WH")],
            &[&[("itemCode", "A"), ("actualQty", "4")]],
        );
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        let delivery = &doc["callbackResponse"]["deliveryOrder"];
        assert_eq!(delivery["deliveryOrderCode"], "DB01");
        assert_eq!(delivery["outBizCode"], "DB01");
        assert_eq!(delivery["orderType"], "DBCK");
        assert_eq!(delivery["status"], "PARTDELIVERED");
        assert_eq!(delivery["operateTime"], delivery["orderConfirmTime"]);
    }

    #[test]
    fn lines_keep_template_owner_and_string_quantities() {
        let state = state(
            &[("deliveryOrderCode", "DB01"), ("warehouseCode", "WH")],
            &[&[("itemCode", "A"), ("actualQty", "4")]],
        );
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        let line = &doc["callbackResponse"]["orderLines"][0];
        assert_eq!(line["actualQty"], "4");
        assert_eq!(line["ownerCode"], "XIER");
        assert_eq!(line["inventoryType"], "ZP");
    }

    #[test]
    fn submit_requires_warehouse() {
        let state = state(&[("deliveryOrderCode", "DB01")], &[&[]]);
        assert_eq!(
            build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap_err(),
            BuildError::MissingField("warehouseCode")
        );
    }
}
