//! Inventory adjustment: arrival registration against the procurement
//! gateway. The only page without a line-item table, and the only one
//! with a selectable target environment.

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, require, require_int};
use crate::schema::FieldDescriptor;

const ENVIRONMENTS: &[(&str, &str)] = &[("test", "Test"), ("uat", "UAT")];

// Sample values shown while the form is still blank.
const SAMPLE_SKU: &str = "6926523473692";
const SAMPLE_QTY: i64 = 150_000;
const SAMPLE_WAREHOUSE: &str = "DCN";

static BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("skuCode", "SKU Code"),
    FieldDescriptor::number("quantity", "Quantity", 1),
    FieldDescriptor::text("warehouseCode", "Warehouse Code"),
    FieldDescriptor::select("apiEnv", "Environment", ENVIRONMENTS).with_default("test"),
];

pub static PAGE: PageSpec = PageSpec {
    name: "inventory-adjustment",
    title: "Inventory Adjustment",
    submit_path: "/inventory_adjustment/submit",
    preset_path: Some("/inventory_adjustment/get-preset"),
    encoding: BodyEncoding::Form,
    min_items: 0,
    max_items: 0,
    index_origin: 0,
    base_fields: BASE_FIELDS,
    item_fields: &[],
    preset,
    build,
};

fn preset() -> Value {
    json!({
        "appointmentNo": "",
        "businessNo": "",
        "checkMethod": "20",
        "detailList": [
            {
                "actualArrivalNumber": 0,
                "batchCode": "1",
                "lineNo": "1",
                "planArrivalNumber": 0,
                "productDate": "2025-07-01",
                "sampleQuality": 7,
                "skuCode": "",
                "sourceCode": "",
                "volume": 1,
                "weight": 1
            }
        ],
        "forecastArrivalTime": "",
        "forecastDeliveryTime": "",
        "isCallCar": 0,
        "orderCreator": "LY",
        "remark": "LY",
        "sourceType": "WWJG",
        "supplierCode": "CO00049541",
        "totalVolume": 1,
        "totalWeight": 1,
        "warehouseCode": "",
        "warehouseOutCode": ""
    })
}

fn build(
    preset: &Value,
    state: &FormState,
    mode: BuildMode,
    ctx: &BuildContext,
) -> Result<Value, BuildError> {
    let sku = require(mode, state.base("skuCode"), "skuCode")?;
    let quantity = require_int(mode, state.base("quantity"), "quantity")?;
    let warehouse = require(mode, state.base("warehouseCode"), "warehouseCode")?;

    // Blank preview fields fall back to sample data so the document shape
    // stays recognizable.
    let sku = if sku.is_empty() { SAMPLE_SKU.to_string() } else { sku };
    let quantity = if quantity == 0 { SAMPLE_QTY } else { quantity };
    let warehouse = if warehouse.is_empty() {
        SAMPLE_WAREHOUSE.to_string()
    } else {
        warehouse
    };

    let business_no = ctx.business_no();
    let source_code = match mode {
        BuildMode::Preview => format!("{business_no}112"),
        BuildMode::Submit => {
            let millis = ctx.epoch_millis().to_string();
            let suffix = &millis[millis.len().saturating_sub(5)..];
            format!("{business_no}{suffix}")
        }
    };
    let now = ctx.wall_time();

    let mut doc = preset.clone();
    doc["businessNo"] = json!(business_no);
    doc["forecastArrivalTime"] = json!(now);
    doc["forecastDeliveryTime"] = json!(now);
    doc["warehouseCode"] = json!(warehouse);
    doc["warehouseOutCode"] = json!(warehouse);

    let detail = &mut doc["detailList"][0];
    detail["actualArrivalNumber"] = json!(quantity);
    detail["planArrivalNumber"] = json!(quantity);
    detail["skuCode"] = json!(sku);
    detail["sourceCode"] = json!(source_code);

    Ok(doc)
}
