//! Request templates for the RFC web services exposed to the agent
//!
//! Element order follows the backend function signatures; constant elements
//! (units, currency, ship point, validity end) are part of the template.

use super::template::{FieldKind, FieldSpec, OperationTemplate, ResolvedFields};

pub const SALES_ORDER: &str = "SO";
pub const STO_PURCHASE_ORDER: &str = "STO";
pub const OUTBOUND_DELIVERY: &str = "DN";
pub const SALES_VIEW: &str = "MAT_SALES";
pub const WAREHOUSE_VIEW: &str = "MAT_WAREHOUSE";
pub const SOURCE_LIST: &str = "SRC";
pub const INFO_RECORD: &str = "INF";
pub const KITTING_QUANTITY: &str = "QTY";

pub static TEMPLATES: &[OperationTemplate] = &[
    OperationTemplate {
        code: SALES_ORDER,
        name: "create_sales_order",
        description: "Step 1: create a sales order",
        service: "SO",
        body: concat!(
            "<urn:ZBAPI_SALESORDER_CREATE>{?UUID}",
            "<CUST_PO>{CUST_PO}</CUST_PO><CUST_PO_DATE>{CUST_PO_DATE}</CUST_PO_DATE>",
            "<IT_SO_ITEM><item><MATERIAL_NO>000010</MATERIAL_NO><MATERIAL>{MATERIAL}</MATERIAL>",
            "<UNIT>PCE</UNIT><QTY>{QTY}</QTY><PLANT>{PLANT}</PLANT>",
            "<SHIPPING_POINT>{SHIPPING_POINT}</SHIPPING_POINT>",
            "<DELIVERY_DATE>{CUST_PO_DATE}</DELIVERY_DATE></item></IT_SO_ITEM>",
            "<ORDER_TYPE>{ORDER_TYPE}</ORDER_TYPE><SALES_CHANNEL>{SALES_CHANNEL}</SALES_CHANNEL>",
            "<SALES_DIVISION>{SALES_DIVISION}</SALES_DIVISION><SALES_ORG>{SALES_ORG}</SALES_ORG>",
            "<SHIP_TO_PARTY>{SHIP_TO_PARTY}</SHIP_TO_PARTY><SOLD_TO_PARTY>{SOLD_TO_PARTY}</SOLD_TO_PARTY>",
            "</urn:ZBAPI_SALESORDER_CREATE>"
        ),
        fields: &[
            FieldSpec::with_default("CUST_PO", "TEST_PO"),
            FieldSpec::with_default("CUST_PO_DATE", "2025-01-01"),
            FieldSpec::required("MATERIAL"),
            FieldSpec::required("QTY").kind(FieldKind::PositiveNumber),
            FieldSpec::optional("UUID"),
            FieldSpec::with_default("ORDER_TYPE", "ZIES"),
            FieldSpec::with_default("SALES_ORG", "TW01"),
            FieldSpec::with_default("SALES_CHANNEL", "03"),
            FieldSpec::with_default("SALES_DIVISION", "01"),
            FieldSpec::with_default("SOLD_TO_PARTY", "HRCTO-IMX"),
            FieldSpec::with_default("SHIP_TO_PARTY", "HRCTO-MX"),
            FieldSpec::with_default("PLANT", "TP01"),
            FieldSpec::with_default("SHIPPING_POINT", "TW01"),
        ],
        derive: None,
    },
    OperationTemplate {
        code: STO_PURCHASE_ORDER,
        name: "create_sto_po",
        description: "Step 2: create a stock transport purchase order",
        service: "STO",
        body: concat!(
            "<urn:ZSD_STO_CREATE>{?UUID}<DOC_TYPE>{DOC_TYPE}</DOC_TYPE><LGORT/>",
            "<PR_NUMBER>{PR_NUMBER}</PR_NUMBER><PUR_GROUP>{PUR_GROUP}</PUR_GROUP>",
            "<PUR_ITEM><item><BNFPO>{PR_ITEM}</BNFPO></item></PUR_ITEM>",
            "<PUR_ORG>{PUR_ORG}</PUR_ORG><PUR_PLANT>{PUR_PLANT}</PUR_PLANT><VENDOR>{VENDOR}</VENDOR>",
            "</urn:ZSD_STO_CREATE>"
        ),
        fields: &[
            FieldSpec::required("PR_NUMBER"),
            FieldSpec::required("PR_ITEM"),
            FieldSpec::optional("UUID"),
            FieldSpec::with_default("PUR_GROUP", "999"),
            FieldSpec::with_default("PUR_ORG", "TW10"),
            FieldSpec::with_default("PUR_PLANT", "TP01"),
            FieldSpec::with_default("VENDOR", "ICC-CP60"),
            FieldSpec::with_default("DOC_TYPE", "NB"),
        ],
        derive: None,
    },
    OperationTemplate {
        code: OUTBOUND_DELIVERY,
        name: "create_outbound_delivery",
        description: "Step 3: create an outbound delivery for an STO",
        service: "DN",
        body: concat!(
            "<urn:ZBAPI_OUTB_DELIVERY_CREATE_STO>{?UUID}<PO_ITEM><item>",
            "<REF_DOC>{PO_NUMBER}</REF_DOC><REF_ITEM>{ITEM_NO}</REF_ITEM>",
            "<DLV_QTY>{QUANTITY}</DLV_QTY><SALES_UNIT>EA</SALES_UNIT></item></PO_ITEM>",
            "<SHIP_POINT>CN60</SHIP_POINT></urn:ZBAPI_OUTB_DELIVERY_CREATE_STO>"
        ),
        fields: &[
            FieldSpec::required("PO_NUMBER"),
            FieldSpec::required("ITEM_NO"),
            FieldSpec::required("QUANTITY").kind(FieldKind::PositiveNumber),
            FieldSpec::optional("UUID"),
        ],
        derive: None,
    },
    OperationTemplate {
        code: INFO_RECORD,
        name: "maintain_info_record",
        description: "Remediation: maintain the purchasing info record",
        service: "INF",
        body: concat!(
            "<urn:ZSD_INFO_RECORD_MAINTAIN>{?UUID}<CURRENCY>USD</CURRENCY>",
            "<MATERIAL>{MATERIAL}</MATERIAL><PLANT>{PLANT}</PLANT><PRICE>{PRICE}</PRICE>",
            "<PRICE_UNIT>1</PRICE_UNIT><PUR_ORG>{PUR_ORG}</PUR_ORG><VENDOR>{VENDOR}</VENDOR>",
            "</urn:ZSD_INFO_RECORD_MAINTAIN>"
        ),
        fields: &[
            FieldSpec::required("MATERIAL"),
            FieldSpec::optional("UUID"),
            FieldSpec::with_default("PRICE", "999").kind(FieldKind::Number),
            FieldSpec::with_default("VENDOR", "ICC-CP60"),
            FieldSpec::with_default("PLANT", "TP01"),
            FieldSpec::with_default("PUR_ORG", "TW10"),
        ],
        derive: None,
    },
    OperationTemplate {
        code: SALES_VIEW,
        name: "maintain_sales_view",
        description: "Remediation: maintain the material sales view",
        service: "MAT",
        body: concat!(
            "<urn:ZBAPI_MATERIAL_SAVEDATA>{?UUID}<HEADDATA><MATERIAL>{MATERIAL}</MATERIAL>",
            "<SALES_VIEW>X</SALES_VIEW><STORAGE_VIEW></STORAGE_VIEW><WAREHOUSE_VIEW></WAREHOUSE_VIEW>",
            "</HEADDATA><PLANTDATA><PLANT>{PLANT}</PLANT></PLANTDATA>",
            "<SALESDATA><SALES_ORG>{SALES_ORG}</SALES_ORG><DISTR_CHAN>{DISTR_CHAN}</DISTR_CHAN>",
            "<DELYG_PLNT>{DELYG_PLNT}</DELYG_PLNT></SALESDATA></urn:ZBAPI_MATERIAL_SAVEDATA>"
        ),
        fields: &[
            FieldSpec::required("MATERIAL"),
            FieldSpec::required("SALES_ORG"),
            FieldSpec::required("DISTR_CHAN"),
            FieldSpec::optional("UUID"),
            FieldSpec::with_default("PLANT", "TP01"),
            FieldSpec::with_default("DELYG_PLNT", "TP01"),
        ],
        derive: Some(derive_sales_view_plants),
    },
    OperationTemplate {
        code: WAREHOUSE_VIEW,
        name: "maintain_warehouse_view",
        description: "Remediation: maintain the material warehouse view",
        service: "MAT",
        body: concat!(
            "<urn:ZBAPI_MATERIAL_SAVEDATA>{?UUID}<HEADDATA><MATERIAL>{MATERIAL}</MATERIAL>",
            "<SALES_VIEW></SALES_VIEW><STORAGE_VIEW></STORAGE_VIEW><WAREHOUSE_VIEW>X</WAREHOUSE_VIEW>",
            "</HEADDATA><WAREHOUSENUMBERDATA><WHSE_NO>{WHSE_NO}</WHSE_NO></WAREHOUSENUMBERDATA>",
            "</urn:ZBAPI_MATERIAL_SAVEDATA>"
        ),
        fields: &[
            FieldSpec::required("MATERIAL"),
            FieldSpec::optional("UUID"),
            FieldSpec::with_default("WHSE_NO", "WH1"),
        ],
        derive: None,
    },
    OperationTemplate {
        code: SOURCE_LIST,
        name: "maintain_source_list",
        description: "Remediation: maintain the source list",
        service: "SRC",
        body: concat!(
            "<urn:ZSD_SOURCE_LIST_MAINTAIN>{?UUID}<MATERIAL>{MATERIAL}</MATERIAL>",
            "<PLANT>{PLANT}</PLANT><VENDOR>{VENDOR}</VENDOR><VALID_FROM>{VALID_FROM}</VALID_FROM>",
            "<VALID_TO>9999-12-31</VALID_TO></urn:ZSD_SOURCE_LIST_MAINTAIN>"
        ),
        fields: &[
            FieldSpec::required("MATERIAL"),
            FieldSpec::with_default("VALID_FROM", "2025-01-01"),
            FieldSpec::optional("UUID"),
            FieldSpec::with_default("PLANT", "TP01"),
            FieldSpec::with_default("VENDOR", "ICC-CP60"),
        ],
        derive: None,
    },
    OperationTemplate {
        code: KITTING_QUANTITY,
        name: "change_kitting_qty",
        description: "Remediation: change the quantity of a kitting PO item",
        service: "QTY",
        body: concat!(
            "<urn:ZSD_KITTING_FLOW_CHANGE>{?UUID}<KITTING_PO>{KITTING_PO}</KITTING_PO>",
            "<PR_ITEM><item><EBELP>{PO_ITEM}</EBELP><MENGE>{QUANTITY}</MENGE></item></PR_ITEM>",
            "</urn:ZSD_KITTING_FLOW_CHANGE>"
        ),
        fields: &[
            FieldSpec::required("KITTING_PO"),
            FieldSpec::required("PO_ITEM"),
            FieldSpec::required("QUANTITY").kind(FieldKind::Number),
            FieldSpec::optional("UUID"),
        ],
        derive: None,
    },
];

/// Sales organisation / distribution channel pairs pin the plant
fn derive_sales_view_plants(fields: &mut ResolvedFields) {
    let org = fields.get("SALES_ORG").map(String::as_str).unwrap_or("");
    let channel = fields.get("DISTR_CHAN").map(String::as_str).unwrap_or("");

    let plant = match (org, channel) {
        ("CN60", "03") => Some("CP60"),
        ("TW01", "03") => Some("TP01"),
        _ => None,
    };

    if let Some(plant) = plant {
        fields.insert("PLANT", plant.to_string());
        fields.insert("DELYG_PLNT", plant.to_string());
    }
}
