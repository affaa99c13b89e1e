use std::boxed::Box;
use std::sync::Arc;

use serde_json::json;

use storefront_payment::adapter::processor::{
    AbstractPaymentProcessor, AppProcessorError, AppProcessorErrorReason, AppProcessorFnLabel,
};
use storefront_payment::model::ProcessorRawRespModel;
use storefront_payment::usecase::{InvoiceStatusUcError, InvoiceStatusUseCase};

use super::{ut_processor_resp, MockPaymentProcessor};

fn ut_setup_usecase(
    status_result: Result<ProcessorRawRespModel, AppProcessorError>,
) -> InvoiceStatusUseCase {
    let (processor, _captured) = MockPaymentProcessor::build(None, Some(status_result), None);
    let processor: Box<dyn AbstractPaymentProcessor> = processor;
    InvoiceStatusUseCase {
        processor: Arc::new(processor),
    }
}

#[actix_web::test]
async fn status_ok() {
    let resp = ut_processor_resp(
        200,
        json!({"invoiceId": "abc123", "status": "success", "amount": 21000, "ccy": 980}),
    );
    let uc = ut_setup_usecase(Ok(resp));
    let result = uc.execute("abc123".to_string()).await;
    let dto = result.unwrap();
    assert_eq!(dto.invoice_id.as_str(), "abc123");
    assert_eq!(dto.status.as_str(), "success");
    assert_eq!(dto.amount, Some(21000));
    assert_eq!(dto.currency, Some(980));
}

#[actix_web::test]
async fn status_fields_missing() {
    let resp = ut_processor_resp(200, json!({"invoiceId": "abc123"}));
    let uc = ut_setup_usecase(Ok(resp));
    let dto = uc.execute("abc123".to_string()).await.unwrap();
    assert_eq!(dto.status.as_str(), "unknown");
    assert!(dto.amount.is_none());
    assert!(dto.currency.is_none());
}

#[actix_web::test]
async fn status_not_found() {
    let resp = ut_processor_resp(404, json!({"errCode": "NOT_FOUND"}));
    let uc = ut_setup_usecase(Ok(resp));
    let result = uc.execute("nonexist".to_string()).await;
    assert!(matches!(result, Err(InvoiceStatusUcError::NotFound)));
}

#[actix_web::test]
async fn status_processor_rejected() {
    let resp = ut_processor_resp(500, json!({"text": "internal error"}));
    let uc = ut_setup_usecase(Ok(resp));
    let result = uc.execute("abc123".to_string()).await;
    if let Err(InvoiceStatusUcError::ProcessorRejected { status_code, body }) = result {
        assert_eq!(status_code, 500);
        assert_eq!(body, json!({"text": "internal error"}));
    } else {
        assert!(false);
    }
}

#[actix_web::test]
async fn status_processor_unavailable() {
    let e = AppProcessorError {
        reason: AppProcessorErrorReason::Timeout(15),
        fn_label: AppProcessorFnLabel::InvoiceStatus,
    };
    let uc = ut_setup_usecase(Err(e));
    let result = uc.execute("abc123".to_string()).await;
    assert!(matches!(
        result,
        Err(InvoiceStatusUcError::ProcessorUnavailable(_))
    ));
}
