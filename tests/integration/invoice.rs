use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value as JsnVal};

use storefront_payment::api::web::dto::{CreateInvoiceRespDto, InvoiceStatusRespDto};
use storefront_payment::api::web::HEADER_WEBHOOK_SIGNATURE;

use super::{
    itest_example_path, itest_init_service, itest_setup_recording_shr_state,
    itest_setup_shr_state, itest_sign_b64,
};

const URI_CREATE: &str = "/payments/create-invoice/";
const URI_WEBHOOK: &str = "/payments/webhook/monobank/";

fn itest_order_body() -> JsnVal {
    json!({
        "name": "Olena",
        "last_name": "Kovalenko",
        "amount": 21000,
        "full_amount": 21000,
        "phone": "+380501234567",
        "telegram_name": "@olena_k",
        "delivery_method": "nova_poshta",
        "settlement": "Lviv",
        "warehouse": "12",
        "payment_option": "full",
        "products": [
            {"name": "Sourdough loaf", "article": "BR-001", "number_of_items": 2, "price_with_discount": 8500},
            {"name": "Rye flour", "article": "FL-207", "number_of_items": 1, "price_with_discount": 4000}
        ]
    })
}

fn itest_event_body(invoice_id: &str, status: &str, reference: &str) -> Vec<u8> {
    let body = json!({
        "invoiceId": invoice_id,
        "status": status,
        "amount": 21000,
        "ccy": 980,
        "reference": reference,
        "modifiedDate": "2026-10-18T08:11:02Z"
    });
    serde_json::to_vec(&body).unwrap()
}

#[actix_web::test]
async fn create_then_query_status() {
    let srv = itest_init_service(itest_setup_shr_state()).await;
    let req = test::TestRequest::post()
        .uri(URI_CREATE)
        .set_json(itest_order_body())
        .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: CreateInvoiceRespDto = test::read_body_json(resp).await;
    assert!(!created.invoice_id.is_empty());
    assert!(created.page_url.ends_with(created.invoice_id.as_str()));
    assert_eq!(created.reference.len(), 4);

    let uri = format!("/payments/status/{}/", created.invoice_id);
    let req = test::TestRequest::get().uri(uri.as_str()).to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let status: InvoiceStatusRespDto = test::read_body_json(resp).await;
    assert_eq!(status.invoice_id, created.invoice_id);
    assert_eq!(status.status.as_str(), "created");
    assert_eq!(status.amount, Some(21000));
    assert_eq!(status.currency, Some(980));
}

#[actix_web::test]
async fn create_field_errors() {
    let srv = itest_init_service(itest_setup_shr_state()).await;
    let mut body = itest_order_body();
    body["settlement"] = json!("");
    body["phone"] = json!("123");
    body["products"][1]["number_of_items"] = json!(0);
    let req = test::TestRequest::post()
        .uri(URI_CREATE)
        .set_json(body)
        .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors: JsnVal = test::read_body_json(resp).await;
    let expect = json!({
        "phone": "TooShort",
        "settlement": "Required",
        "products": [null, {"number_of_items": "BelowMinimum"}]
    });
    assert_eq!(errors, expect);
}

#[actix_web::test]
async fn create_malformed_json() {
    let srv = itest_init_service(itest_setup_shr_state()).await;
    let req = test::TestRequest::post()
        .uri(URI_CREATE)
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"name\": \"Olena\",")
        .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn status_unknown_invoice() {
    let srv = itest_init_service(itest_setup_shr_state()).await;
    let req = test::TestRequest::get()
        .uri("/payments/status/nonexist-inv/")
        .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: JsnVal = test::read_body_json(resp).await;
    assert_eq!(body, json!({"detail": "invoice not found"}));
}

#[actix_web::test]
async fn paid_webhook_notify_admins_once() {
    let (shr_state, sent) = itest_setup_recording_shr_state(None);
    let srv = itest_init_service(shr_state).await;
    let req = test::TestRequest::post()
        .uri(URI_CREATE)
        .set_json(itest_order_body())
        .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: CreateInvoiceRespDto = test::read_body_json(resp).await;

    let body = itest_event_body(
        created.invoice_id.as_str(),
        "success",
        created.reference.as_str(),
    );
    let sign = itest_sign_b64(&body);
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri(URI_WEBHOOK)
            .insert_header((HEADER_WEBHOOK_SIGNATURE, sign.as_str()))
            .set_payload(body.clone())
            .to_request();
        let resp = test::call_service(&srv, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let ack: JsnVal = test::read_body_json(resp).await;
        assert_eq!(ack, json!({"ok": true}));
    }
    let guard = sent.lock().unwrap();
    let mut recipients = guard.iter().map(|(r, _)| *r).collect::<Vec<_>>();
    recipients.sort();
    assert_eq!(recipients, vec![3001, 3002]);
    guard
        .iter()
        .map(|(_, msg)| {
            assert_eq!(msg.reference, created.reference);
            assert_eq!(msg.buyer_first_name.as_str(), "Olena");
            assert!(msg.text.contains("Нова Пошта: Lviv, відділення 12"));
        })
        .count();
}

#[actix_web::test]
async fn webhook_openssl_signed_fixture() {
    let (shr_state, sent) = itest_setup_recording_shr_state(None);
    let srv = itest_init_service(shr_state).await;
    let body = std::fs::read(itest_example_path("webhook_body_fixture.json")).unwrap();
    let sign = std::fs::read_to_string(itest_example_path("webhook_body_fixture.sig.b64")).unwrap();
    let req = test::TestRequest::post()
        .uri(URI_WEBHOOK)
        .insert_header((HEADER_WEBHOOK_SIGNATURE, sign.trim()))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    // invoice never created in this instance, notified with webhook fields
    let guard = sent.lock().unwrap();
    assert_eq!(guard.len(), 2);
    assert_eq!(guard[0].1.reference.as_str(), "JK7Q");
    assert_eq!(guard[0].1.buyer_first_name.as_str(), "-");
}

#[actix_web::test]
async fn webhook_invalid_signature() {
    let (shr_state, sent) = itest_setup_recording_shr_state(None);
    let srv = itest_init_service(shr_state).await;
    let body = itest_event_body("mock-inv-000001", "success", "OK3Z");
    let sign = itest_sign_b64(b"another body");
    let req = test::TestRequest::post()
        .uri(URI_WEBHOOK)
        .insert_header((HEADER_WEBHOOK_SIGNATURE, sign.as_str()))
        .set_payload(body.clone())
        .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let detail: JsnVal = test::read_body_json(resp).await;
    assert_eq!(detail, json!({"detail": "invalid signature"}));

    // header absent
    let req = test::TestRequest::post()
        .uri(URI_WEBHOOK)
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn webhook_public_key_absent() {
    let (shr_state, sent) = itest_setup_recording_shr_state(Some("payment/keyless"));
    let srv = itest_init_service(shr_state).await;
    let body = itest_event_body("mock-inv-000001", "success", "OK3Z");
    let sign = itest_sign_b64(&body);
    let req = test::TestRequest::post()
        .uri(URI_WEBHOOK)
        .insert_header((HEADER_WEBHOOK_SIGNATURE, sign.as_str()))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let detail: JsnVal = test::read_body_json(resp).await;
    assert_eq!(detail, json!({"detail": "server misconfigured"}));
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn webhook_expired_then_code_reusable() {
    let (shr_state, sent) = itest_setup_recording_shr_state(None);
    let registry = shr_state.reference_code_registry();
    let srv = itest_init_service(shr_state).await;
    let req = test::TestRequest::post()
        .uri(URI_CREATE)
        .set_json(itest_order_body())
        .to_request();
    let resp = test::call_service(&srv, req).await;
    let created: CreateInvoiceRespDto = test::read_body_json(resp).await;
    let reserved = registry.is_reserved(created.reference.as_str()).await;
    assert!(reserved.unwrap());

    let body = itest_event_body(
        created.invoice_id.as_str(),
        "expired",
        created.reference.as_str(),
    );
    let sign = itest_sign_b64(&body);
    let req = test::TestRequest::post()
        .uri(URI_WEBHOOK)
        .insert_header((HEADER_WEBHOOK_SIGNATURE, sign.as_str()))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let reserved = registry.is_reserved(created.reference.as_str()).await;
    assert!(!reserved.unwrap());
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn unknown_route() {
    let srv = itest_init_service(itest_setup_shr_state()).await;
    let req = test::TestRequest::get()
        .uri("/payments/create-invoice/")
        .to_request();
    let resp = test::call_service(&srv, req).await;
    assert!(resp.status().is_client_error());
}
