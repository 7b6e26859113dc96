//! Exchange order: paired in/out SKU lists for platform exchanges.

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, first_line, int_or_zero, require};
use crate::schema::FieldDescriptor;

static BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("platformExchangeNo", "Platform Exchange No"),
    FieldDescriptor::text("platformOrderNo", "Platform Order No"),
    FieldDescriptor::text("platformStatus", "Platform Status"),
    FieldDescriptor::text("platformId", "Platform Id"),
    FieldDescriptor::text("storeId", "Store Id"),
    FieldDescriptor::text("applyNum", "Apply Num"),
    FieldDescriptor::text("platformInSkuId", "Platform In SKU Id"),
    FieldDescriptor::text("platformNo", "Platform No"),
    FieldDescriptor::text("backExpressNo", "Back Express No").optional(),
    FieldDescriptor::text("backExpressName", "Back Express Name").optional(),
];

static ITEM_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("platformOutSkuCode", "Platform Out SKU Code"),
    FieldDescriptor::number("num", "Quantity", 1),
];

pub static PAGE: PageSpec = PageSpec {
    name: "exchange-order",
    title: "Exchange Order",
    submit_path: "/exchange_order/submit",
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
        "address": "柘林镇上海化学工业区环华路8号 海关",
        "applyTime": "2022-10-17T15:54:32",
        "applyUpdateTime": "2022-10-17T16:13:06",
        "backExpressNo": "",
        "backExpressName": "",
        "buyerExplain": "",
        "city": "上海市",
        "district": "奉贤区",
        "exchangeReason": "",
        "exchangeSkuList": [
            {
                "applyNum": "",
                "platformInSkuId": "",
                "platformNo": ""
            }
        ],
        "exchangeSkuOutList": [
            {
                "num": "",
                "platformOutSkuCode": ""
            }
        ],
        "isDetailExchange": 0,
        "isPlatformExchange": 0,
        "mark": 3,
        "mobile": "18466653550",
        "platformExchangeNo": "",
        "platformId": "",
        "platformOrderNo": "",
        "platformStatus": "",
        "province": "上海",
        "receiver": "陈华 -6395",
        "storeId": ""
    })
}

fn build(
    preset: &Value,
    state: &FormState,
    mode: BuildMode,
    ctx: &BuildContext,
) -> Result<Value, BuildError> {
    let mut doc = preset.clone();
    let in_template = first_line(&doc, "exchangeSkuList");
    let out_template = first_line(&doc, "exchangeSkuOutList");

    for field in BASE_FIELDS {
        if field.required {
            doc[field.key] = json!(require(mode, state.base(field.key), field.key)?);
        } else {
            doc[field.key] = json!(state.base(field.key));
        }
    }
    doc["applyTime"] = json!(ctx.iso_time());

    let platform_no = state.base("platformNo").to_string();
    let mut in_list = Vec::new();
    let mut out_list = Vec::new();
    for (i, _) in state.items.iter().enumerate() {
        let sku = state.item(i, "platformOutSkuCode");
        let num = state.item(i, "num");
        // Lines missing either value are left out of both lists.
        if sku.is_empty() || num.is_empty() {
            continue;
        }
        let mut entry = in_template.clone();
        entry["platformInSkuId"] = json!(sku);
        entry["applyNum"] = json!(int_or_zero(num));
        entry["platformNo"] = json!(platform_no);
        in_list.push(entry);

        let mut out = out_template.clone();
        out["platformOutSkuCode"] = json!(sku);
        out["num"] = json!(int_or_zero(num));
        out_list.push(out);
    }
    doc["exchangeSkuList"] = json!(in_list);
    doc["exchangeSkuOutList"] = json!(out_list);

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::test_support::{ctx, state};

    fn full_base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("platformExchangeNo", "EX1"),
            ("platformOrderNo", "PO1"),
            ("platformStatus", "10"),
            ("platformId", "TB"),
            ("storeId", "215"),
            ("applyNum", "1"),
            ("platformInSkuId", "S0"),
            ("platformNo", "PN7"),
        ]
    }

    #[test]
    fn lists_stay_paired_per_line() {
        let state = state(&full_base(), &[&[("platformOutSkuCode", "SKU9"), ("num", "2")]]);
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();

        assert_eq!(
            doc["exchangeSkuList"],
            json!([{ "applyNum": 2, "platformInSkuId": "SKU9", "platformNo": "PN7" }])
        );
        assert_eq!(
            doc["exchangeSkuOutList"],
            json!([{ "num": 2, "platformOutSkuCode": "SKU9" }])
        );
    }

    #[test]
    fn incomplete_lines_are_skipped() {
        let state = state(
            &full_base(),
            &[
                &[("platformOutSkuCode", "SKU9"), ("num", "2")],
                &[("platformOutSkuCode", "SKU8")],
            ],
        );
        let doc = build(&preset(), &state, BuildMode::Preview, &ctx()).unwrap();
        assert_eq!(doc["exchangeSkuList"].as_array().unwrap().len(), 1);
        assert_eq!(doc["exchangeSkuOutList"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn apply_time_is_iso_utc() {
        let state = state(&full_base(), &[&[("platformOutSkuCode", "S"), ("num", "1")]]);
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        assert_eq!(doc["applyTime"], "2024-03-01T12:30:00.000Z");
    }

    #[test]
    fn optional_express_fields_may_stay_blank() {
        let state = state(&full_base(), &[&[("platformOutSkuCode", "S"), ("num", "1")]]);
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        assert_eq!(doc["backExpressNo"], "");
        assert_eq!(doc["backExpressName"], "");
    }
}
