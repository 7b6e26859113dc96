//! Refund order: sales-order refund application with per-line details.

use serde_json::{Value, json};

use super::{BodyEncoding, PageSpec};
use crate::form::FormState;
use crate::payload::{BuildContext, BuildError, BuildMode, first_line, require};
use crate::schema::FieldDescriptor;

static BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("platformOrderNo", "Platform Order No"),
    FieldDescriptor::text("platformRefundNo", "Platform Refund No"),
    FieldDescriptor::text("applyType", "Apply Type"),
    FieldDescriptor::text("applyReason", "Apply Reason"),
    FieldDescriptor::text("refundPeriod", "Refund Period"),
    FieldDescriptor::text("storeId", "Store Id"),
    FieldDescriptor::text("expressNo", "Express No"),
    FieldDescriptor::text("expressName", "Express Name"),
    FieldDescriptor::text("platformStatus", "Platform Status"),
    FieldDescriptor::text("omsStatus", "OMS Status"),
];

static ITEM_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("platformNo", "Platform No"),
    FieldDescriptor::number("applyNum", "Apply Num", 1),
];

pub static PAGE: PageSpec = PageSpec {
    name: "refund-order",
    title: "Refund Order",
    submit_path: "/refund_order/submit",
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
        "applyMoney": 400,
        "applyNum": 1,
        "applyReason": "",
        "applyTime": "2021-08-30 19:54:53",
        "applyType": "",
        "buyerExplain": "",
        "isRefundTotal": 0,
        "memberName": "听风",
        "omsStatus": "",
        "platformNo": null,
        "platformOrderNo": "",
        "platformRefundNo": "",
        "platformStatus": "",
        "platformUpdateTime": "2021-08-30 14:54:53",
        "realMoney": 100,
        "refundPeriod": "",
        "expressNo": "",
        "expressName": "",
        "salesOrderRefundApplyDetailList": [
            {
                "applyMoney": 100,
                "applyNum": "",
                "platformNo": "",
                "platformProductId": "null",
                "platformProductName": "BP2011001混合口味维铁营养面尝鲜装",
                "platformStatus": ""
            }
        ],
        "storeId": ""
    })
}

fn build(
    preset: &Value,
    state: &FormState,
    mode: BuildMode,
    _ctx: &BuildContext,
) -> Result<Value, BuildError> {
    let mut doc = preset.clone();
    let template = first_line(&doc, "salesOrderRefundApplyDetailList");

    for field in BASE_FIELDS {
        doc[field.key] = json!(require(mode, state.base(field.key), field.key)?);
    }
    // The detail rows carry the platform numbers; the root one stays null.
    doc["platformNo"] = Value::Null;

    let platform_status = state.base("platformStatus").to_string();
    let mut details = Vec::new();
    for (i, _) in state.items.iter().enumerate() {
        let mut detail = template.clone();
        detail["platformNo"] = json!(require(mode, state.item(i, "platformNo"), "platformNo")?);
        detail["applyNum"] = json!(require(mode, state.item(i, "applyNum"), "applyNum")?);
        detail["platformStatus"] = json!(platform_status);
        details.push(detail);
    }
    doc["salesOrderRefundApplyDetailList"] = json!(details);

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::test_support::{ctx, state};

    fn full_base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("platformOrderNo", "PO1"),
            ("platformRefundNo", "RF1"),
            ("applyType", "1"),
            ("applyReason", "破损"),
            ("refundPeriod", "2"),
            ("storeId", "215"),
            ("expressNo", "SF100"),
            ("expressName", "顺丰"),
            ("platformStatus", "30"),
            ("omsStatus", "5"),
        ]
    }

    #[test]
    fn base_fields_overlay_the_preset() {
        let state = state(&full_base(), &[&[("platformNo", "PN1"), ("applyNum", "2")]]);
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        assert_eq!(doc["platformRefundNo"], "RF1");
        assert_eq!(doc["omsStatus"], "5");
        assert_eq!(doc["platformNo"], serde_json::Value::Null);
        // Untouched preset values survive.
        assert_eq!(doc["applyMoney"], 400);
        assert_eq!(doc["memberName"], "听风");
    }

    #[test]
    fn details_carry_line_values_and_the_base_status() {
        let state = state(
            &full_base(),
            &[
                &[("platformNo", "PN1"), ("applyNum", "2")],
                &[("platformNo", "PN2"), ("applyNum", "1")],
            ],
        );
        let doc = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap();
        let details = doc["salesOrderRefundApplyDetailList"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["platformNo"], "PN1");
        assert_eq!(details[0]["applyNum"], "2");
        assert_eq!(details[0]["platformStatus"], "30");
        assert_eq!(details[1]["platformNo"], "PN2");
        // Template fields survive into each row.
        assert_eq!(details[1]["applyMoney"], 100);
    }

    #[test]
    fn submit_rejects_blank_base_fields() {
        let state = state(
            &[("platformOrderNo", "PO1")],
            &[&[("platformNo", "PN1"), ("applyNum", "2")]],
        );
        let err = build(&preset(), &state, BuildMode::Submit, &ctx()).unwrap_err();
        assert_eq!(err, BuildError::MissingField("platformRefundNo"));
    }

    #[test]
    fn preview_passes_blanks_through() {
        let state = state(&[], &[&[]]);
        let doc = build(&preset(), &state, BuildMode::Preview, &ctx()).unwrap();
        assert_eq!(doc["platformRefundNo"], "");
        assert_eq!(doc["salesOrderRefundApplyDetailList"][0]["platformNo"], "");
    }
}
