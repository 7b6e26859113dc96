//! 2B stockout push: stockout confirm with numeric quantities (PTCK).

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, int_or_zero, require};
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
    name: "stockout-push",
    title: "Stockout Push",
    submit_path: "/stockout_push/api/stockout_push",
    preset_path: None,
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
            "apiMethodName": "stockout.confirm",
            "deliveryOrder": {
                "confirmType": 0,
                "deliveryOrderCode": "",
                "operateTime": "2020-08-15 20:56:17",
                "orderConfirmTime": "2020-08-15 20:56:17",
                "orderType": "PTCK",
                "outBizCode": "",
                "ownerCode": "XIER",
                "status": "DELIVERED",
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
    let code = require(mode, state.base("deliveryOrderCode"), "deliveryOrderCode")?;
    let warehouse = require(mode, state.base("warehouseCode"), "warehouseCode")?;
    let now = ctx.wall_time();

    let mut doc = preset.clone();
    let delivery = &mut doc["callbackResponse"]["deliveryOrder"];
    delivery["deliveryOrderCode"] = json!(code);
    delivery["operateTime"] = json!(now);
    delivery["orderConfirmTime"] = json!(now);
    delivery["warehouseCode"] = json!(warehouse);
    doc["outOrderCode"] = json!(code);

    let lines: Vec<Value> = state
        .items
        .iter()
        .enumerate()
        .map(|(i, _)| {
            json!({
                "actualQty": int_or_zero(state.item(i, "actualQty")),
                "inventoryType": "ZP",
                "itemCode": state.item(i, "itemCode"),
                "orderLineNo": (i + 1).to_string(),
                "ownerCode": "XIER"
            })
        })
        .collect();
    doc["callbackResponse"]["orderLines"] = json!(lines);

    Ok(doc)
}
