//! Order download: synthetic sales orders fed into the OMS download queue.

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, first_line, int_or_zero, require};
use crate::schema::FieldDescriptor;

const GIFT_OPTIONS: &[(&str, &str)] = &[("0", "No"), ("1", "Yes")];

static BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("address", "Address"),
    FieldDescriptor::text("platformOrderNo", "Platform Order No"),
    FieldDescriptor::text("storeId", "Store Id"),
    FieldDescriptor::text("platformPayTime", "Platform Pay Time"),
];

static ITEM_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("platformOuterSkuCode", "Platform Outer SKU Code"),
    FieldDescriptor::text("platformNo", "Platform No"),
    FieldDescriptor::number("qty", "Quantity", 1),
    FieldDescriptor::select("isGift", "Gift", GIFT_OPTIONS).with_default("0"),
];

pub static PAGE: PageSpec = PageSpec {
    name: "order-download",
    title: "Order Download",
    submit_path: "/order_download/submit",
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
        "city": "杭州市",
        "country": "中国",
        "district": "滨江区",
        "mobile": "19957517031",
        "province": "浙江省",
        "receiverName": "听风",
        "salesOrderDetailConvertDTOList": [
            {
                "adjustFee": 5,
                "discountFee": 10,
                "divideOrderFee": 400,
                "isGift": "0",
                "partMjzDiscount": 0,
                "payment": 400,
                "platformOuterProductCode": "202104131345",
                "platformOuterSkuCode": "6941428688156",
                "platformProductId": "516137560",
                "platformProductName": "儿童测试手绘本",
                "platformRefundStatus": "0",
                "platformSkuId": "36520014",
                "platformSkuName": "598195516配件大枕套",
                "platformStatus": 20,
                "price": 400,
                "totalFee": 400,
                "settlementPrice": 400,
                "settlementFee": 400,
                "endTime": "2023-09-01 09:20:53",
                "isVirtualProduct": 0,
                "platformPresellDemand": "A"
            }
        ],
        "salesOrderExtConvertDTO": {
            "hasPostFee": 1,
            "isCod": 1,
            "isSpotOccupancy": 0,
            "isStep": 0,
            "memberName": "tb5369333866",
            "payment": 309,
            "platformCreateTime": "2023-09-01 09:20:53",
            "platformOrderStatus": "WAIT_SELLER_SEND_GOODS",
            "platformUpdateTime": "2023-09-01 09:20:53",
            "postFee": 0,
            "receivedPayment": 0,
            "stepPaidFee": 100,
            "stepStatus": 1,
            "totalFee": 309,
            "sellerMemo": ""
        },
        "storeId": 215,
        "zipCode": "000000"
    })
}

fn build(
    preset: &Value,
    state: &FormState,
    mode: BuildMode,
    _ctx: &BuildContext,
) -> Result<Value, BuildError> {
    let mut doc = preset.clone();
    let template = first_line(&doc, "salesOrderDetailConvertDTOList");

    for field in BASE_FIELDS {
        doc[field.key] = json!(require(mode, state.base(field.key), field.key)?);
    }

    let details: Vec<Value> = state
        .items
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let mut detail = template.clone();
            if let Some(obj) = detail.as_object_mut() {
                obj.remove("sku");
            }
            detail["platformOuterSkuCode"] = json!(state.item(i, "platformOuterSkuCode"));
            detail["platformNo"] = json!(state.item(i, "platformNo"));
            detail["qty"] = json!(state.item(i, "qty"));
            detail["isGift"] = json!(int_or_zero(state.item(i, "isGift")));
            detail
        })
        .collect();
    doc["salesOrderDetailConvertDTOList"] = json!(details);

    doc["salesOrderExtConvertDTO"]["platformPayTime"] = json!(state.base("platformPayTime"));

    Ok(doc)
}
