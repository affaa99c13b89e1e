use std::boxed::Box;
use std::sync::Arc;

use serde_json::json;

use storefront_payment::adapter::processor::{
    AbstractPaymentProcessor, AppProcessorError, AppProcessorErrorReason, AppProcessorFnLabel,
};
use storefront_payment::api::web::dto::FieldErrorReason;
use storefront_payment::model::ProcessorRawRespModel;
use storefront_payment::usecase::{CreateInvoiceUcError, CreateInvoiceUseCase};

use super::{ut_processor_resp, CapturedCreateReq, MockPaymentProcessor, UtRepoSet};
use crate::{ut_setup_logctx, ut_valid_order_req};

fn ut_setup_usecase(
    repos: &UtRepoSet,
    create_result: Option<Result<ProcessorRawRespModel, AppProcessorError>>,
) -> (CreateInvoiceUseCase, CapturedCreateReq) {
    let (processor, captured) = MockPaymentProcessor::build(create_result, None, None);
    let processor: Box<dyn AbstractPaymentProcessor> = processor;
    let uc = CreateInvoiceUseCase {
        processor: Arc::new(processor),
        ref_registry: repos.ref_registry(),
        pending_store: repos.pending_store(),
        logctx: ut_setup_logctx(),
    };
    (uc, captured)
}

#[actix_web::test]
async fn create_ok() {
    let repos = UtRepoSet::new(100);
    let resp = ut_processor_resp(
        201,
        json!({"invoiceId": "abc123", "pageUrl": "https://pay.mbnk.biz/abc123"}),
    );
    let (uc, captured) = ut_setup_usecase(&repos, Some(Ok(resp)));
    let result = uc.execute(ut_valid_order_req()).await;
    let resp = result.unwrap();
    assert_eq!(resp.invoice_id.as_str(), "abc123");
    assert_eq!(resp.page_url.as_str(), "https://pay.mbnk.biz/abc123");
    assert_eq!(resp.reference.len(), 4);

    let sent_req = captured.lock().unwrap().take().unwrap();
    assert_eq!(sent_req.reference, resp.reference);
    assert_eq!(sent_req.amount, 21000);
    assert_eq!(sent_req.currency, 980);
    assert!(sent_req.destination.ends_with(resp.reference.as_str()));

    let reserved = repos.ref_registry().is_reserved(resp.reference.as_str()).await;
    assert!(reserved.unwrap());
    let payload = repos.pending_store().pop("abc123").await.unwrap().unwrap();
    assert_eq!(payload.reference, resp.reference);
    assert_eq!(payload.form.buyer.first_name.as_str(), "Olena");
}

#[actix_web::test]
async fn create_client_error() {
    let repos = UtRepoSet::new(100);
    // processor must not be reached
    let (uc, captured) = ut_setup_usecase(&repos, None);
    let mut req = ut_valid_order_req();
    req.delivery_method = Some("carrier_delivery".to_string());
    req.settlement = Some("".to_string());
    req.warehouse = Some("12".to_string());
    let result = uc.execute(req).await;
    if let Err(CreateInvoiceUcError::ClientBadRequest(e)) = result {
        assert_eq!(e.settlement, Some(FieldErrorReason::Required));
        assert!(e.warehouse.is_none());
    } else {
        assert!(false);
    }
    assert!(captured.lock().unwrap().is_none());
}

#[actix_web::test]
async fn create_processor_rejected() {
    let repos = UtRepoSet::new(100);
    let resp = ut_processor_resp(
        400,
        json!({"errCode": "BAD_REQUEST", "errText": "invalid merchant"}),
    );
    let (uc, captured) = ut_setup_usecase(&repos, Some(Ok(resp)));
    let result = uc.execute(ut_valid_order_req()).await;
    if let Err(CreateInvoiceUcError::ProcessorRejected { status_code, body }) = result {
        assert_eq!(status_code, 400);
        assert_eq!(body["errCode"], json!("BAD_REQUEST"));
    } else {
        assert!(false);
    }
    let sent_req = captured.lock().unwrap().take().unwrap();
    let reserved = repos.ref_registry().is_reserved(sent_req.reference.as_str()).await;
    assert!(!reserved.unwrap());
}

#[actix_web::test]
async fn create_processor_incomplete_resp() {
    let repos = UtRepoSet::new(100);
    let resp = ut_processor_resp(200, json!({"invoiceId": "abc124"}));
    let (uc, captured) = ut_setup_usecase(&repos, Some(Ok(resp)));
    let result = uc.execute(ut_valid_order_req()).await;
    assert!(matches!(
        result,
        Err(CreateInvoiceUcError::ProcessorRejected { status_code: 200, .. })
    ));
    let sent_req = captured.lock().unwrap().take().unwrap();
    let reserved = repos.ref_registry().is_reserved(sent_req.reference.as_str()).await;
    assert!(!reserved.unwrap());
    assert!(repos.pending_store().pop("abc124").await.unwrap().is_none());
}

#[actix_web::test]
async fn create_processor_unavailable() {
    let repos = UtRepoSet::new(100);
    let e = AppProcessorError {
        reason: AppProcessorErrorReason::Timeout(15),
        fn_label: AppProcessorFnLabel::CreateInvoice,
    };
    let (uc, captured) = ut_setup_usecase(&repos, Some(Err(e)));
    let result = uc.execute(ut_valid_order_req()).await;
    if let Err(CreateInvoiceUcError::ProcessorUnavailable(e)) = result {
        assert!(matches!(e.reason, AppProcessorErrorReason::Timeout(15)));
    } else {
        assert!(false);
    }
    let sent_req = captured.lock().unwrap().take().unwrap();
    let reserved = repos.ref_registry().is_reserved(sent_req.reference.as_str()).await;
    assert!(!reserved.unwrap());
}

#[actix_web::test]
async fn create_ok_pending_store_full() {
    // the only slot is taken by reference code reservation
    let repos = UtRepoSet::new(1);
    let resp = ut_processor_resp(
        200,
        json!({"invoiceId": "abc125", "pageUrl": "https://pay.mbnk.biz/abc125"}),
    );
    let (uc, _captured) = ut_setup_usecase(&repos, Some(Ok(resp)));
    let result = uc.execute(ut_valid_order_req()).await;
    let resp = result.unwrap();
    assert_eq!(resp.invoice_id.as_str(), "abc125");
    assert!(repos.pending_store().pop("abc125").await.unwrap().is_none());
}

#[actix_web::test]
async fn create_reservation_unavailable() {
    let repos = UtRepoSet::new(1);
    let _occupied = repos.ref_registry().generate().await.unwrap();
    let (uc, captured) = ut_setup_usecase(&repos, None);
    let result = uc.execute(ut_valid_order_req()).await;
    assert!(matches!(
        result,
        Err(CreateInvoiceUcError::ReservationUnavailable(_))
    ));
    assert!(captured.lock().unwrap().is_none());
}
