use actix_web::web::{Bytes, Data as WebData, Json as ExtJson, Path as ExtPath};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde_json::Value as JsnVal;

use storefront_common::logging::{app_log_event, AppLogLevel};

use super::dto::{CreateInvoiceReqDto, DetailDto, GatewayErrorDto, WebhookAckDto};
use super::HEADER_WEBHOOK_SIGNATURE;
use crate::usecase::{
    CreateInvoiceUcError, CreateInvoiceUseCase, InvoiceStatusUcError, InvoiceStatusUseCase,
    InvoiceWebhookUseCase, WebhookUcError,
};
use crate::AppSharedState;

fn gateway_error(processor: JsnVal) -> HttpResponse {
    let body = GatewayErrorDto {
        detail: "payment processor error".to_string(),
        processor,
    };
    HttpResponse::BadGateway().json(body)
}

fn detail_body(detail: &str) -> DetailDto {
    DetailDto {
        detail: detail.to_string(),
    }
}

pub(super) async fn create_invoice(
    req_body: ExtJson<CreateInvoiceReqDto>,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    app_log_event!(logctx_p, AppLogLevel::DEBUG, "create-invoice-api");

    let uc = CreateInvoiceUseCase {
        processor: shr_state.processor_context(),
        ref_registry: shr_state.reference_code_registry(),
        pending_store: shr_state.pending_invoice_store(),
        logctx: logctx.clone(),
    };
    let resp = match uc.execute(req_body.into_inner()).await {
        Ok(v) => HttpResponse::Created().json(v),
        Err(uce) => match uce {
            CreateInvoiceUcError::ClientBadRequest(e) => HttpResponse::BadRequest().json(e),
            CreateInvoiceUcError::ReservationUnavailable(e) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
                HttpResponse::ServiceUnavailable().json(detail_body("reservation unavailable"))
            }
            CreateInvoiceUcError::ProcessorRejected {
                status_code: _,
                body,
            } => gateway_error(body),
            CreateInvoiceUcError::ProcessorUnavailable(e) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
                gateway_error(JsnVal::Null)
            }
        },
    };
    Ok(resp)
} // end of fn create_invoice

pub(super) async fn monobank_webhook(
    req: HttpRequest,
    body: Bytes,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    let sign_b64 = req
        .headers()
        .get(HEADER_WEBHOOK_SIGNATURE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let cfg = shr_state.config();
    let uc = InvoiceWebhookUseCase {
        processor: shr_state.processor_context(),
        notify_sink: shr_state.notification_sink(),
        ref_registry: shr_state.reference_code_registry(),
        pending_store: shr_state.pending_invoice_store(),
        notified_marker: shr_state.notified_invoice_marker(),
        admin_recipients: cfg.api_server.notification.admin_recipients().to_vec(),
        logctx: logctx.clone(),
    };
    let resp = match uc.execute(body.as_ref(), sign_b64).await {
        Ok(outcome) => {
            app_log_event!(logctx_p, AppLogLevel::DEBUG, "{:?}", outcome);
            HttpResponse::Ok().json(WebhookAckDto { ok: true })
        }
        Err(WebhookUcError::InvalidSignature) => {
            HttpResponse::Forbidden().json(detail_body("invalid signature"))
        }
        Err(WebhookUcError::MissingPublicKey(_e)) => {
            HttpResponse::InternalServerError().json(detail_body("server misconfigured"))
        }
    };
    Ok(resp)
} // end of fn monobank_webhook

pub(super) async fn invoice_status(
    path: ExtPath<String>,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    let invoice_id = path.into_inner();
    let uc = InvoiceStatusUseCase {
        processor: shr_state.processor_context(),
    };
    let resp = match uc.execute(invoice_id).await {
        Ok(v) => HttpResponse::Ok().json(v),
        Err(InvoiceStatusUcError::NotFound) => {
            HttpResponse::NotFound().json(detail_body("invoice not found"))
        }
        Err(InvoiceStatusUcError::ProcessorRejected { status_code, body }) => {
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "invoice-status, processor-status:{status_code}"
            );
            gateway_error(body)
        }
        Err(InvoiceStatusUcError::ProcessorUnavailable(e)) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
            gateway_error(JsnVal::Null)
        }
    };
    Ok(resp)
} // end of fn invoice_status
