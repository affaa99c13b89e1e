use serde_json::json;

use storefront_payment::api::web::dto::{
    CreateInvoiceErrorDto, CreateInvoiceReqDto, FieldErrorReason, InvoiceWebhookReqDto,
    ProductItemErrorDto, ProductItemReqDto, ProductsErrorDto,
};
use storefront_payment::model::{
    DeliveryModel, OrderFormModel, OrderPayloadModel, PaymentOptionModel, DEFAULT_CURRENCY,
};

use crate::ut_valid_order_req;

#[test]
fn convert_form_ok() {
    let req = ut_valid_order_req();
    let form = OrderFormModel::try_from(req).unwrap();
    assert_eq!(form.buyer.first_name.as_str(), "Olena");
    assert_eq!(form.buyer.last_name.as_str(), "Kovalenko");
    assert_eq!(form.buyer.telegram_name.as_deref(), Some("@olena_k"));
    assert_eq!(form.currency, DEFAULT_CURRENCY);
    assert_eq!(form.delivery, DeliveryModel::Pickup);
    assert_eq!(form.payment_option, PaymentOptionModel::Full);
    assert_eq!(form.amount, 21000);
    assert_eq!(form.lines.len(), 2);
    assert_eq!(form.lines[0].quantity, 2);
    assert_eq!(form.lines[0].unit_price, 8500);
    assert_eq!(form.lines[1].article.as_str(), "FL-207");
    assert!(form.promocode.is_none());
}

#[test]
fn convert_form_missing_fields() {
    let req = CreateInvoiceReqDto::default();
    let e = OrderFormModel::try_from(req).unwrap_err();
    assert_eq!(e.name, Some(FieldErrorReason::Required));
    assert_eq!(e.last_name, Some(FieldErrorReason::Required));
    assert_eq!(e.phone, Some(FieldErrorReason::Required));
    assert_eq!(e.amount, Some(FieldErrorReason::Required));
    assert_eq!(e.full_amount, Some(FieldErrorReason::Required));
    assert_eq!(
        e.products,
        Some(ProductsErrorDto::List(FieldErrorReason::Required))
    );
    // optional fields are not reported
    assert!(e.ccy.is_none());
    assert!(e.delivery_method.is_none());
    assert!(e.payment_option.is_none());
    assert!(e.comment.is_none());
}

#[test]
fn convert_form_invalid_values() {
    let mut req = ut_valid_order_req();
    req.name = Some("   ".to_string());
    req.phone = Some("12345".to_string());
    req.amount = Some(0);
    req.ccy = Some(1000);
    req.payment_option = Some("installment".to_string());
    req.promocode = Some("P".repeat(65));
    let e = OrderFormModel::try_from(req).unwrap_err();
    assert_eq!(e.name, Some(FieldErrorReason::Empty));
    assert_eq!(e.phone, Some(FieldErrorReason::TooShort));
    assert_eq!(e.amount, Some(FieldErrorReason::BelowMinimum));
    assert_eq!(e.ccy, Some(FieldErrorReason::OutOfRange));
    assert_eq!(e.payment_option, Some(FieldErrorReason::InvalidChoice));
    assert_eq!(e.promocode, Some(FieldErrorReason::TooLong));
    assert!(e.last_name.is_none());
    assert!(e.products.is_none());
}

#[test]
fn convert_form_carrier_missing_settlement() {
    let mut req = ut_valid_order_req();
    req.delivery_method = Some("carrier_delivery".to_string());
    req.settlement = Some("".to_string());
    req.warehouse = Some("12".to_string());
    let e = OrderFormModel::try_from(req).unwrap_err();
    let expect = CreateInvoiceErrorDto {
        settlement: Some(FieldErrorReason::Required),
        ..Default::default()
    };
    assert_eq!(e, expect);
    let serial = serde_json::to_value(&e).unwrap();
    assert_eq!(serial, json!({"settlement": "Required"}));
}

#[test]
fn convert_form_carrier_ok() {
    let mut req = ut_valid_order_req();
    req.delivery_method = Some("nova_poshta".to_string());
    req.settlement = Some("Lviv".to_string());
    req.warehouse = Some("12".to_string());
    req.payment_option = Some("partial".to_string());
    req.amount = Some(5000);
    let form = OrderFormModel::try_from(req).unwrap();
    let expect = DeliveryModel::CarrierDelivery {
        settlement: "Lviv".to_string(),
        warehouse: "12".to_string(),
    };
    assert_eq!(form.delivery, expect);
    assert_eq!(form.payment_option, PaymentOptionModel::Partial);
    assert_eq!(form.amount, 5000);
    assert_eq!(form.full_amount, 21000);
}

#[test]
fn convert_form_pickup_discards_address() {
    let mut req = ut_valid_order_req();
    req.settlement = Some("Kyiv".to_string());
    req.warehouse = Some("3".to_string());
    let form = OrderFormModel::try_from(req).unwrap();
    assert_eq!(form.delivery, DeliveryModel::Pickup);
}

#[test]
fn convert_form_unknown_delivery() {
    let mut req = ut_valid_order_req();
    req.delivery_method = Some("drone".to_string());
    let e = OrderFormModel::try_from(req).unwrap_err();
    assert_eq!(e.delivery_method, Some(FieldErrorReason::InvalidChoice));
}

#[test]
fn convert_form_product_errors() {
    let mut req = ut_valid_order_req();
    req.products = Some(vec![]);
    let e = OrderFormModel::try_from(req).unwrap_err();
    assert_eq!(
        e.products,
        Some(ProductsErrorDto::List(FieldErrorReason::Empty))
    );

    let mut req = ut_valid_order_req();
    let valid_item = req.products.as_ref().unwrap()[0].clone();
    let bad_item = ProductItemReqDto {
        name: None,
        article: None,
        number_of_items: Some(0),
        price_with_discount: Some(100),
    };
    req.products = Some(vec![valid_item, bad_item]);
    let e = OrderFormModel::try_from(req).unwrap_err();
    let expect_item = ProductItemErrorDto {
        name: Some(FieldErrorReason::Required),
        article: Some(FieldErrorReason::Required),
        number_of_items: Some(FieldErrorReason::BelowMinimum),
        ..Default::default()
    };
    assert_eq!(
        e.products,
        Some(ProductsErrorDto::Items(vec![None, Some(expect_item)]))
    );
    let serial = serde_json::to_value(&e).unwrap();
    let expect = json!({
        "products": [null, {"name": "Required", "article": "Required", "number_of_items": "BelowMinimum"}]
    });
    assert_eq!(serial, expect);

    let mut req = ut_valid_order_req();
    let mut blank_article = req.products.as_ref().unwrap()[0].clone();
    blank_article.article = Some("   ".to_string());
    let mut long_article = blank_article.clone();
    long_article.article = Some("A".repeat(101));
    req.products = Some(vec![blank_article, long_article]);
    let e = OrderFormModel::try_from(req).unwrap_err();
    let expect_blank = ProductItemErrorDto {
        article: Some(FieldErrorReason::Empty),
        ..Default::default()
    };
    let expect_long = ProductItemErrorDto {
        article: Some(FieldErrorReason::TooLong),
        ..Default::default()
    };
    assert_eq!(
        e.products,
        Some(ProductsErrorDto::Items(vec![Some(expect_blank), Some(expect_long)]))
    );
}

#[test]
fn degraded_payload_from_webhook() {
    let event = InvoiceWebhookReqDto {
        invoice_id: Some("p2_9ZgpZVsl3".to_string()),
        status: Some("success".to_string()),
        amount: Some(json!(4200)),
        ccy: None,
        reference: Some(json!("JK7Q")),
        products: Some(json!([
            {"name": "Herbal tea", "article": "TE-12", "number_of_items": 2, "price_with_discount": 700},
            "not-a-product"
        ])),
    };
    let payload = OrderPayloadModel::degraded(&event);
    assert_eq!(payload.reference.as_str(), "JK7Q");
    assert_eq!(payload.form.buyer.first_name.as_str(), "-");
    assert_eq!(payload.form.buyer.phone.as_str(), "-");
    assert_eq!(payload.form.amount, 4200);
    assert_eq!(payload.form.full_amount, 4200);
    assert_eq!(payload.form.currency, DEFAULT_CURRENCY);
    assert_eq!(payload.form.lines.len(), 1);
    assert_eq!(payload.form.lines[0].name.as_str(), "Herbal tea");
    assert_eq!(payload.form.lines[0].quantity, 2);
}

#[test]
fn degraded_payload_lenient_fields() {
    let event = InvoiceWebhookReqDto {
        invoice_id: Some("p2_9ZgpZVsl3".to_string()),
        status: Some("success".to_string()),
        amount: Some(json!("21000")),
        ccy: Some(json!("840")),
        reference: Some(json!(1234)),
        products: Some(json!({"name": "not-a-list"})),
    };
    let payload = OrderPayloadModel::degraded(&event);
    assert_eq!(payload.form.amount, 21000);
    assert_eq!(payload.form.currency, 840);
    assert_eq!(payload.reference.as_str(), "-");
    assert!(payload.form.lines.is_empty());

    let event = InvoiceWebhookReqDto {
        amount: Some(json!(-5)),
        ccy: Some(json!(70000)),
        reference: Some(json!("not-a-code")),
        ..Default::default()
    };
    let payload = OrderPayloadModel::degraded(&event);
    assert_eq!(payload.form.amount, 0);
    assert_eq!(payload.form.currency, DEFAULT_CURRENCY);
    assert_eq!(payload.reference.as_str(), "-");
}

#[test]
fn degraded_payload_without_reference() {
    let event = InvoiceWebhookReqDto::default();
    let payload = OrderPayloadModel::degraded(&event);
    assert_eq!(payload.reference.as_str(), "-");
    assert_eq!(payload.form.amount, 0);
    assert!(payload.form.lines.is_empty());
}

#[test]
fn payload_serial_roundtrip_keeps_delivery() {
    let mut req = ut_valid_order_req();
    req.delivery_method = Some("carrier_delivery".to_string());
    req.settlement = Some("Odesa".to_string());
    req.warehouse = Some("44".to_string());
    let form = OrderFormModel::try_from(req).unwrap();
    let payload = OrderPayloadModel::new(form, "OA1B".to_string());
    let serial = serde_json::to_value(&payload).unwrap();
    assert_eq!(serial["form"]["delivery"]["method"], json!("carrier_delivery"));
    let restored = serde_json::from_value::<OrderPayloadModel>(serial).unwrap();
    assert_eq!(restored, payload);
}
