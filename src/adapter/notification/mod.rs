mod log_only;
mod telegram;

use std::boxed::Box;
use std::marker::{Send, Sync};
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;

use storefront_common::confidentiality::AbstractConfidentiality;
use storefront_common::config::AppNotificationCfg;
use storefront_common::logging::AppLogContext;

use crate::adapter::BaseClientError;
use crate::model::AdminNotifyModel;

pub use self::log_only::LogOnlyNotificationSink;
pub use self::telegram::callback_data as telegram_callback_data;
use self::telegram::AppTelegramBotCtx;

/// delivers message to a single recipient, callers deliver to each
/// recipient independently
#[async_trait]
pub trait AbstractNotificationSink: Send + Sync {
    async fn send(&self, recipient: i64, msg: &AdminNotifyModel) -> Result<(), AppNotifyError>;
}

#[derive(Debug)]
pub enum AppNotifyErrorReason {
    MissingCredential(String),
    CredentialCorrupted(String),
    LowLvlNet(BaseClientError),
    Timeout(u16),
    RemoteRejected(u16, String),
    SerialiseFailure(String),
}

#[derive(Debug)]
pub struct AppNotifyError {
    pub reason: AppNotifyErrorReason,
}

impl From<BaseClientError> for AppNotifyError {
    fn from(value: BaseClientError) -> Self {
        Self {
            reason: AppNotifyErrorReason::LowLvlNet(value),
        }
    }
}

#[derive(Debug)]
pub struct NotifyDeliveryResult {
    pub recipient: i64,
    pub outcome: Result<(), AppNotifyError>,
}

impl NotifyDeliveryResult {
    pub fn delivered(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub fn app_notification_sink(
    cfg: Arc<AppNotificationCfg>,
    cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    logctx: Arc<AppLogContext>,
) -> Result<Box<dyn AbstractNotificationSink>, AppNotifyError> {
    match cfg.as_ref() {
        AppNotificationCfg::Telegram(c) => {
            let sink = AppTelegramBotCtx::try_build(c, &**cfdntl, logctx)?;
            Ok(Box::new(sink))
        }
        AppNotificationCfg::Test {
            admin_recipients: _,
        } => Ok(Box::new(LogOnlyNotificationSink::new(logctx))),
    }
}
