mod mock;
mod monobank;
mod signature;

use std::boxed::Box;
use std::marker::{Send, Sync};
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;

use storefront_common::confidentiality::AbstractConfidentiality;
use storefront_common::config::AppPaymentProcessorCfg;
use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use self::mock::MockInvoiceProcessor;
use self::monobank::AppProcessorMonobankCtx;
use crate::adapter::BaseClientError;
use crate::model::{InvoiceCreateReqModel, ProcessorRawRespModel};

pub use self::signature::WebhookSignatureVerifier;

/// Invoice API of external payment processor. Responses are returned
/// regardless of their status code, callers decide what is success.
#[async_trait]
pub trait AbstractPaymentProcessor: Send + Sync {
    async fn create_invoice(
        &self,
        req: &InvoiceCreateReqModel,
    ) -> Result<ProcessorRawRespModel, AppProcessorError>;

    async fn get_invoice_status(
        &self,
        invoice_id: &str,
    ) -> Result<ProcessorRawRespModel, AppProcessorError>;

    /// returns error only when the public key is not configured at all
    fn verify_webhook_signature(
        &self,
        raw_body: &[u8],
        sign_b64: &str,
    ) -> Result<bool, AppProcessorError>;
}

#[derive(Debug)]
pub enum AppProcessorErrorReason {
    MissingCredential(String),
    CredentialCorrupted(String),
    MissingWebhookPublicKey,
    LowLvlNet(BaseClientError),
    Timeout(u16),
    SerialiseFailure(String),
}

#[derive(Debug)]
pub enum AppProcessorFnLabel {
    TryBuild,
    CreateInvoice,
    InvoiceStatus,
    VerifyWebhookSignature,
}

#[derive(Debug)]
pub struct AppProcessorError {
    pub reason: AppProcessorErrorReason,
    pub fn_label: AppProcessorFnLabel,
}

impl From<BaseClientError> for AppProcessorErrorReason {
    fn from(value: BaseClientError) -> Self {
        Self::LowLvlNet(value)
    }
}

fn read_secret(
    cfdntl: &dyn AbstractConfidentiality,
    path: &str,
) -> Result<Option<String>, AppProcessorErrorReason> {
    let serial = match cfdntl.try_get_payload(path) {
        Ok(s) => s,
        Err(_e) => return Ok(None),
    };
    serde_json::from_str::<String>(serial.as_str())
        .map(Some)
        .map_err(|_e| AppProcessorErrorReason::CredentialCorrupted(path.to_string()))
}

pub(crate) fn load_webhook_verifier(
    cfdntl: &dyn AbstractConfidentiality,
    base_path: &str,
    logctx: &Arc<AppLogContext>,
) -> WebhookSignatureVerifier {
    let path = format!("{base_path}/webhook_public_key");
    let verifier = match read_secret(cfdntl, path.as_str()) {
        Ok(pubkey) => WebhookSignatureVerifier::new(pubkey.as_deref()),
        Err(e) => WebhookSignatureVerifier::malformed(format!("{:?}", e)),
    };
    if !verifier.is_configured() {
        app_log_event!(logctx, AppLogLevel::WARNING, "webhook-public-key-absent, {path}");
    } else if let Some(detail) = verifier.key_error() {
        app_log_event!(logctx, AppLogLevel::ERROR, "webhook-public-key-malformed, {detail}");
    }
    verifier
}

pub(crate) fn load_api_token(
    cfdntl: &dyn AbstractConfidentiality,
    base_path: &str,
) -> Result<String, AppProcessorErrorReason> {
    let path = format!("{base_path}/token");
    read_secret(cfdntl, path.as_str())?
        .filter(|t| !t.is_empty())
        .ok_or(AppProcessorErrorReason::MissingCredential(path))
}

pub fn app_processor_context(
    cfg: Arc<AppPaymentProcessorCfg>,
    cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    logctx: Arc<AppLogContext>,
) -> Result<Box<dyn AbstractPaymentProcessor>, AppProcessorError> {
    let result: Result<Box<dyn AbstractPaymentProcessor>, AppProcessorErrorReason> =
        match cfg.as_ref() {
            AppPaymentProcessorCfg::Monobank(c) => {
                AppProcessorMonobankCtx::try_build(c, &**cfdntl, logctx)
                    .map(|p| Box::new(p) as Box<dyn AbstractPaymentProcessor>)
            }
            AppPaymentProcessorCfg::Test {
                confidentiality_path,
            } => {
                let verifier = load_webhook_verifier(
                    &**cfdntl,
                    confidentiality_path.as_str(),
                    &logctx,
                );
                Ok(Box::new(MockInvoiceProcessor::new(verifier)))
            }
        };
    result.map_err(|reason| AppProcessorError {
        reason,
        fn_label: AppProcessorFnLabel::TryBuild,
    })
}
