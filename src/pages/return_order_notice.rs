//! Return notice: returnorder confirm for B2C return plans (THRK).
//!
//! Line numbering starts at 1 on this page, both in the document and in
//! the flattened form fields.

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, require};
use crate::schema::FieldDescriptor;

const SAMPLE_ORDER: &str = "RN202410010001";
const SAMPLE_WAREHOUSE: &str = "WH001";
const SAMPLE_ITEM: &str = "ITEMXXX";
const SAMPLE_QTY: &str = "10";

static BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("returnOrderCode", "Return Order Code"),
    FieldDescriptor::text("warehouseCode", "Warehouse Code"),
    FieldDescriptor::text("CloseStatus", "Close Status").optional(),
];

static ITEM_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("itemCode", "Item Code"),
    FieldDescriptor::number("actualQty", "Actual Qty", 1),
];

pub static PAGE: PageSpec = PageSpec {
    name: "return-order-notice",
    title: "Return Order Notice",
    submit_path: "/return_order_notice/submit",
    preset_path: None,
    encoding: BodyEncoding::Form,
    min_items: 1,
    max_items: 10,
    index_origin: 1,
    base_fields: BASE_FIELDS,
    item_fields: ITEM_FIELDS,
    preset,
    build,
};

fn preset() -> Value {
    json!({
        "type": 2,
        "returnOrderCode": "",
        "callbackResponse": {
            "apiMethodName": "returnorder.confirm",
            "orderLines": [
                {
                    "actualQty": "",
                    "inventoryType": "ZP",
                    "itemCode": "123124324",
                    "orderLineNo": "1",
                    "ownerCode": "XIER"
                }
            ],
            "extendProps": {
                "CloseStatus": "",
                "ApiSource": "FLUXWMS"
            },
            "responseClass": "com.qimen.api.response.ReturnorderConfirmResponse",
            "returnOrder": {
                "orderConfirmTime": "2021-03-09 08:35:29",
                "orderType": "THRK",
                "outBizCode": "",
                "ownerCode": "XIER",
                "remark": "",
                "returnOrderCode": "",
                "warehouseCode": ""
            },
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
    let code = require(mode, state.base("returnOrderCode"), "returnOrderCode")?;
    let warehouse = require(mode, state.base("warehouseCode"), "warehouseCode")?;
    let code = if code.is_empty() { SAMPLE_ORDER.to_string() } else { code };
    let warehouse = if warehouse.is_empty() {
        SAMPLE_WAREHOUSE.to_string()
    } else {
        warehouse
    };

    let mut doc = preset.clone();
    doc["returnOrderCode"] = json!(code);

    let lines: Vec<Value> = state
        .items
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let n = i + 1;
            let item_code = match state.item(i, "itemCode") {
                "" => format!("{SAMPLE_ITEM}{n}"),
                item => item.to_string(),
            };
            let qty = match state.item(i, "actualQty") {
                "" => SAMPLE_QTY,
                qty => qty,
            };
            json!({
                "itemCode": item_code,
                "actualQty": qty,
                "inventoryType": "ZP",
                "orderLineNo": n.to_string(),
                "ownerCode": "XIER"
            })
        })
        .collect();
    doc["callbackResponse"]["orderLines"] = json!(lines);
    doc["callbackResponse"]["extendProps"]["CloseStatus"] = json!(state.base("CloseStatus"));

    let order = &mut doc["callbackResponse"]["returnOrder"];
    order["orderConfirmTime"] = json!(ctx.wall_time());
    order["returnOrderCode"] = json!(code);
    order["warehouseCode"] = json!(warehouse);

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::test_support::{ctx, state};

    #[test]
    fn code_appears_top_level_and_inside_return_order() {
        let state = state(
            &[("returnOrderCode", "RN77"), ("warehouseCode", "W1")],
            &[&[("itemCode", "A"), ("actualQty", "3")]],
        );
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        assert_eq!(doc["returnOrderCode"], "RN77");
        assert_eq!(doc["callbackResponse"]["returnOrder"]["returnOrderCode"], "RN77");
        assert_eq!(doc["callbackResponse"]["returnOrder"]["orderType"], "THRK");
    }

    #[test]
    fn extend_props_carry_close_status_and_source() {
        let state = state(
            &[
                ("returnOrderCode", "RN77"),
                ("warehouseCode", "W1"),
                ("CloseStatus", "CLOSED"),
            ],
            &[&[("itemCode", "A"), ("actualQty", "3")]],
        );
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        let props = &doc["callbackResponse"]["extendProps"];
        assert_eq!(props["CloseStatus"], "CLOSED");
        assert_eq!(props["ApiSource"], "FLUXWMS");
    }

    #[test]
    fn lines_number_from_one_with_sample_fallbacks() {
        let state = state(&[], &[&[], &[]]);
        let doc = build(&preset(), &state, BuildMode::Preview, &ctx()).unwrap();
        let lines = doc["callbackResponse"]["orderLines"].as_array().unwrap();
        assert_eq!(lines[0]["itemCode"], "ITEMXXX1");
        assert_eq!(lines[0]["orderLineNo"], "1");
        assert_eq!(lines[1]["itemCode"], "ITEMXXX2");
        assert_eq!(lines[1]["actualQty"], "10");
        assert_eq!(doc["returnOrderCode"], SAMPLE_ORDER);
    }
}
