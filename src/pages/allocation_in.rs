//! Allocation inbound: entry-order confirm for warehouse transfers (DBRK).

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, require};
use crate::schema::FieldDescriptor;

static BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("entryOrderCode", "Entry Order Code"),
    FieldDescriptor::text("warehouseCode", "Warehouse Code"),
];

static ITEM_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("itemCode", "Item Code"),
    FieldDescriptor::number("actualQty", "Actual Qty", 1),
];

pub static PAGE: PageSpec = PageSpec {
    name: "allocation-in",
    title: "Allocation Inbound",
    submit_path: "/allocation_in/submit",
    preset_path: None,
    encoding: BodyEncoding::Json,
    min_items: 1,
    max_items: 20,
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
                "entryOrderType": "DBRK",
                "operateTime": "",
                "outBizCode": "",
                "ownerCode": "XIER",
                "remark": "",
                "status": "PARTFULFILLED",
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
            "responseClass": "com.qimen.api.response.EntryorderConfirmResponse",
            "version": "2.0"
        },
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
    let warehouse = require(mode, state.base("warehouseCode"), "warehouseCode")?;

    let mut doc = preset.clone();
    let entry = &mut doc["callbackResponse"]["entryOrder"];
    // The entry-order code doubles as its id and the outer business code.
    entry["entryOrderCode"] = json!(code);
    entry["entryOrderId"] = json!(code);
    entry["outBizCode"] = json!(code);
    entry["warehouseCode"] = json!(warehouse);
    entry["operateTime"] = json!(ctx.wall_time());

    let lines: Vec<Value> = state
        .items
        .iter()
        .enumerate()
        .map(|(i, _)| {
            json!({
                "actualQty": state.item(i, "actualQty"),
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
