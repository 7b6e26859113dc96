//! Order delivery: deliveryorder confirm with order lines, batches, and a
//! single shared package.

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, int_or_zero, require};
use crate::schema::FieldDescriptor;

// Batch constants the warehouse expects on every confirmed line.
const BATCH_CODE: &str = "BH36520121703000017";
const EXPIRE_DATE: &str = "2022-12-16";
const PRODUCT_DATE: &str = "2019-12-17";
const LINE_OWNER: &str = "0212000695";

static BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("deliveryOrderCode", "Delivery Order Code"),
    FieldDescriptor::text("warehouseCode", "Warehouse Code"),
    FieldDescriptor::text("logisticsCode", "Logistics Code"),
    FieldDescriptor::text("logisticsName", "Logistics Name"),
    FieldDescriptor::text("expressCode", "Express Code"),
];

static ITEM_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("itemCode", "Item Code"),
    FieldDescriptor::number("quantity", "Quantity", 1),
];

pub static PAGE: PageSpec = PageSpec {
    name: "order-delivery",
    title: "Order Delivery",
    submit_path: "/order_delivery/submit",
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
            "apiMethodName": "deliveryorder.confirm",
            "deliveryOrder": {
                "confirmType": 0,
                "deliveryOrderCode": "",
                "deliveryOrderId": "",
                "orderConfirmTime": "",
                "orderType": "JYCK",
                "outBizCode": "",
                "status": "DELIVERED",
                "warehouseCode": "",
                "logisticsCode": "",
                "logisticsName": "",
                "expressCode": ""
            },
            "orderLines": [],
            "packages": [],
            "responseClass": "com.qimen.api.response.DeliveryorderConfirmResponse",
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
    let code = require(mode, state.base("deliveryOrderCode"), "deliveryOrderCode")?;
    let warehouse = require(mode, state.base("warehouseCode"), "warehouseCode")?;
    let logistics_code = require(mode, state.base("logisticsCode"), "logisticsCode")?;
    let logistics_name = require(mode, state.base("logisticsName"), "logisticsName")?;
    let express_code = require(mode, state.base("expressCode"), "expressCode")?;

    let mut doc = preset.clone();
    let delivery = &mut doc["callbackResponse"]["deliveryOrder"];
    delivery["deliveryOrderCode"] = json!(code);
    delivery["deliveryOrderId"] = json!(code);
    delivery["outBizCode"] = json!(code);
    delivery["orderConfirmTime"] = json!(ctx.utc_time());
    delivery["warehouseCode"] = json!(warehouse);
    delivery["logisticsCode"] = json!(logistics_code);
    delivery["logisticsName"] = json!(logistics_name);
    delivery["expressCode"] = json!(express_code);

    let mut lines = Vec::new();
    let mut packages: Vec<Value> = Vec::new();
    for (i, _) in state.items.iter().enumerate() {
        let item_code = state.item(i, "itemCode");
        let quantity = state.item(i, "quantity");
        // Only complete lines ship; blanks are treated as scratch rows.
        if item_code.is_empty() || quantity.is_empty() {
            continue;
        }

        lines.push(json!({
            "actualQty": quantity,
            "batchCode": BATCH_CODE,
            "batchs": [{
                "actualQty": quantity,
                "batchCode": BATCH_CODE,
                "expireDate": EXPIRE_DATE,
                "inventoryType": "ZP",
                "productDate": PRODUCT_DATE
            }],
            "expireDate": EXPIRE_DATE,
            "inventoryType": "ZP",
            "itemCode": item_code,
            "itemId": item_code,
            "ownerCode": LINE_OWNER,
            "planQty": quantity,
            "productDate": PRODUCT_DATE
        }));

        let package_item = json!({
            "itemCode": item_code,
            "itemId": item_code,
            "quantity": int_or_zero(quantity)
        });
        // All items travel in one package; the first line creates it.
        if let Some(package) = packages.first_mut() {
            if let Some(items) = package["items"].as_array_mut() {
                items.push(package_item);
            }
        } else {
            packages.push(json!({
                "expressCode": express_code,
                "height": "0",
                "items": [package_item],
                "length": "0",
                "logisticsCode": logistics_code,
                "logisticsName": logistics_name,
                "packageMaterialList": [{ "quantity": "1", "type": "BC0011" }],
                "volume": "0",
                "weight": "11.32",
                "width": "0"
            }));
        }
    }
    doc["callbackResponse"]["orderLines"] = json!(lines);
    doc["callbackResponse"]["packages"] = json!(packages);

    Ok(doc)
}
