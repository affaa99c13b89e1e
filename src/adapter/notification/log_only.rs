use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;

use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use super::{AbstractNotificationSink, AppNotifyError};
use crate::model::AdminNotifyModel;

/// writes messages to log instead of delivering them, for test deployments
pub struct LogOnlyNotificationSink {
    logctx: Arc<AppLogContext>,
}

impl LogOnlyNotificationSink {
    pub fn new(logctx: Arc<AppLogContext>) -> Self {
        Self { logctx }
    }
}

#[async_trait]
impl AbstractNotificationSink for LogOnlyNotificationSink {
    async fn send(&self, recipient: i64, msg: &AdminNotifyModel) -> Result<(), AppNotifyError> {
        let logctx_p = &self.logctx;
        app_log_event!(
            logctx_p,
            AppLogLevel::INFO,
            "recipient:{recipient}, reference:{}, text:{}",
            msg.reference.as_str(),
            msg.text.as_str()
        );
        Ok(())
    }
}
