mod client;
mod resources;

use std::future::Future;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http_body_util::{Empty, Full};
use hyper::body::Bytes;
use hyper::StatusCode;
use tokio_native_tls::TlsConnector;

use storefront_common::confidentiality::AbstractConfidentiality;
use storefront_common::config::AppMonobankCfg;
use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use self::client::AppMonobankClient;
use self::resources::{CreateInvoiceBody, InvoiceStatusQuery, MerchantPaymInfo, PAYMENT_TYPE_DEBIT};
use super::{
    load_api_token, load_webhook_verifier, AbstractPaymentProcessor, AppProcessorError,
    AppProcessorErrorReason, AppProcessorFnLabel, WebhookSignatureVerifier,
};
use crate::adapter::base_client::secure_connector;
use crate::adapter::BaseClientError;
use crate::model::{InvoiceCreateReqModel, ProcessorRawRespModel};

const PATH_INVOICE_CREATE: &str = "/api/merchant/invoice/create";
const PATH_INVOICE_STATUS: &str = "/api/merchant/invoice/status";

pub(super) struct AppProcessorMonobankCtx {
    host: String,
    port: u16,
    timeout_secs: u16,
    default_webhook_url: Option<String>,
    default_redirect_url: Option<String>,
    api_token: String,
    secure_connector: TlsConnector,
    verifier: WebhookSignatureVerifier,
    logctx: Arc<AppLogContext>,
}

impl AppProcessorMonobankCtx {
    pub(super) fn try_build(
        cfg: &AppMonobankCfg,
        cfdntl: &dyn AbstractConfidentiality,
        logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppProcessorErrorReason> {
        let base_path = cfg.confidentiality_path.as_str();
        let api_token = load_api_token(cfdntl, base_path)?;
        let verifier = load_webhook_verifier(cfdntl, base_path, &logctx);
        let secure_connector = secure_connector()?;
        Ok(Self {
            host: cfg.host.clone(),
            port: cfg.port,
            timeout_secs: cfg.timeout_secs,
            default_webhook_url: cfg.default_webhook_url.clone(),
            default_redirect_url: cfg.default_redirect_url.clone(),
            api_token,
            secure_connector,
            verifier,
            logctx,
        })
    }

    async fn with_timeout<F>(&self, fut: F) -> Result<(Vec<u8>, StatusCode), AppProcessorErrorReason>
    where
        F: Future<Output = Result<(Vec<u8>, StatusCode), BaseClientError>>,
    {
        let period = Duration::from_secs(self.timeout_secs as u64);
        match tokio::time::timeout(period, fut).await {
            Ok(result) => result.map_err(AppProcessorErrorReason::from),
            Err(_elapsed) => Err(AppProcessorErrorReason::Timeout(self.timeout_secs)),
        }
    }

    fn log_response(&self, path: &str, status: StatusCode) {
        let logctx_p = &self.logctx;
        if !status.is_success() {
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "path:{path}, status:{}",
                status.as_u16()
            );
        }
    }
} // end of impl AppProcessorMonobankCtx

#[async_trait]
impl AbstractPaymentProcessor for AppProcessorMonobankCtx {
    async fn create_invoice(
        &self,
        req: &InvoiceCreateReqModel,
    ) -> Result<ProcessorRawRespModel, AppProcessorError> {
        let body = CreateInvoiceBody {
            amount: req.amount,
            ccy: req.currency,
            merchant_paym_info: MerchantPaymInfo {
                reference: req.reference.as_str(),
                destination: req.destination.as_str(),
                comment: req.comment.as_str(),
            },
            web_hook_url: self.default_webhook_url.as_deref(),
            redirect_url: self.default_redirect_url.as_deref(),
            payment_type: PAYMENT_TYPE_DEBIT,
            reference: req.reference.as_str(),
        };
        let serial = serde_json::to_vec(&body).map_err(|e| AppProcessorError {
            reason: AppProcessorErrorReason::SerialiseFailure(e.to_string()),
            fn_label: AppProcessorFnLabel::CreateInvoice,
        })?;
        let fut = async {
            let mut client = AppMonobankClient::<Full<Bytes>>::try_build(
                self.logctx.clone(),
                &self.secure_connector,
                self.host.clone(),
                self.port,
                self.api_token.clone(),
            )
            .await?;
            client.post_json(PATH_INVOICE_CREATE, serial).await
        };
        let (raw, status) = self.with_timeout(fut).await.map_err(|reason| {
            let logctx_p = &self.logctx;
            app_log_event!(logctx_p, AppLogLevel::ERROR, "create-invoice, {:?}", reason);
            AppProcessorError {
                reason,
                fn_label: AppProcessorFnLabel::CreateInvoice,
            }
        })?;
        self.log_response(PATH_INVOICE_CREATE, status);
        Ok(ProcessorRawRespModel::from_raw(status.as_u16(), &raw))
    } // end of fn create_invoice

    async fn get_invoice_status(
        &self,
        invoice_id: &str,
    ) -> Result<ProcessorRawRespModel, AppProcessorError> {
        let query = serde_qs::to_string(&InvoiceStatusQuery { invoice_id }).map_err(|e| {
            AppProcessorError {
                reason: AppProcessorErrorReason::SerialiseFailure(e.to_string()),
                fn_label: AppProcessorFnLabel::InvoiceStatus,
            }
        })?;
        let resource_path = format!("{PATH_INVOICE_STATUS}?{query}");
        let fut = async {
            let mut client = AppMonobankClient::<Empty<Bytes>>::try_build(
                self.logctx.clone(),
                &self.secure_connector,
                self.host.clone(),
                self.port,
                self.api_token.clone(),
            )
            .await?;
            client.get(resource_path.as_str()).await
        };
        let (raw, status) = self.with_timeout(fut).await.map_err(|reason| {
            let logctx_p = &self.logctx;
            app_log_event!(logctx_p, AppLogLevel::ERROR, "invoice-status, {:?}", reason);
            AppProcessorError {
                reason,
                fn_label: AppProcessorFnLabel::InvoiceStatus,
            }
        })?;
        self.log_response(PATH_INVOICE_STATUS, status);
        Ok(ProcessorRawRespModel::from_raw(status.as_u16(), &raw))
    } // end of fn get_invoice_status

    fn verify_webhook_signature(
        &self,
        raw_body: &[u8],
        sign_b64: &str,
    ) -> Result<bool, AppProcessorError> {
        self.verifier.verify(raw_body, sign_b64)
    }
} // end of impl AbstractPaymentProcessor for AppProcessorMonobankCtx
