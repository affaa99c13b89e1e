use std::result::Result;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Method;
use serde::Serialize;
use tokio_native_tls::TlsConnector;

use storefront_common::confidentiality::AbstractConfidentiality;
use storefront_common::config::AppTelegramCfg;
use storefront_common::logging::AppLogContext;

use super::{AbstractNotificationSink, AppNotifyError, AppNotifyErrorReason};
use crate::adapter::base_client::{secure_connector, BaseClient};
use crate::model::AdminNotifyModel;

// limit in bytes, applied by Telegram Bot API
const MAX_CALLBACK_DATA_SZ: usize = 64;
const MAX_RESP_DETAIL_SZ: usize = 256;
const ACTION_MARK_DONE: &str = "mark_done";
const ACTION_CANCEL: &str = "cancel_order";

#[derive(Serialize)]
struct InlineButton {
    text: &'static str,
    callback_data: String,
}

#[derive(Serialize)]
struct InlineKeyboard {
    inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Serialize)]
struct SendMessageBody<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    reply_markup: InlineKeyboard,
}

fn truncate_bytes(raw: &str, max: usize) -> &str {
    if raw.len() <= max {
        return raw;
    }
    let end = (0..=max).rev().find(|i| raw.is_char_boundary(*i)).unwrap_or(0);
    &raw[..end]
}

/// `{action}|{first_name}|{last_name}|{reference}`, names are truncated
/// so the result always fits the size limit of callback data
pub fn callback_data(action: &str, msg: &AdminNotifyModel) -> String {
    let fixed_sz = action.len() + msg.reference.len() + 3;
    let name_budget = MAX_CALLBACK_DATA_SZ.saturating_sub(fixed_sz) / 2;
    let first = truncate_bytes(msg.buyer_first_name.as_str(), name_budget);
    let last = truncate_bytes(msg.buyer_last_name.as_str(), name_budget);
    let out = format!("{action}|{first}|{last}|{}", msg.reference);
    truncate_bytes(out.as_str(), MAX_CALLBACK_DATA_SZ).to_string()
}

pub(super) struct AppTelegramBotCtx {
    host: String,
    port: u16,
    timeout_secs: u16,
    bot_token: String,
    secure_connector: TlsConnector,
    logctx: Arc<AppLogContext>,
}

impl AppTelegramBotCtx {
    pub(super) fn try_build(
        cfg: &AppTelegramCfg,
        cfdntl: &dyn AbstractConfidentiality,
        logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppNotifyError> {
        let path = format!("{}/bot_token", cfg.confidentiality_path);
        let serial = cfdntl.try_get_payload(path.as_str()).map_err(|_e| AppNotifyError {
            reason: AppNotifyErrorReason::MissingCredential(path.clone()),
        })?;
        let bot_token = serde_json::from_str::<String>(serial.as_str()).map_err(|_e| {
            AppNotifyError {
                reason: AppNotifyErrorReason::CredentialCorrupted(path.clone()),
            }
        })?;
        let secure_connector = secure_connector()?;
        Ok(Self {
            host: cfg.host.clone(),
            port: cfg.port,
            timeout_secs: cfg.timeout_secs,
            bot_token,
            secure_connector,
            logctx,
        })
    }

    async fn _send(&self, path: &str, body: Vec<u8>) -> Result<(), AppNotifyError> {
        let mut client = BaseClient::<Full<Bytes>>::try_build(
            self.logctx.clone(),
            &self.secure_connector,
            self.host.clone(),
            self.port,
        )
        .await?;
        let (raw, status) = client
            .send_json(path, Method::POST, body, Vec::new())
            .await?;
        if status.is_success() {
            Ok(())
        } else {
            let detail = String::from_utf8_lossy(&raw);
            let detail = truncate_bytes(detail.as_ref(), MAX_RESP_DETAIL_SZ).to_string();
            Err(AppNotifyError {
                reason: AppNotifyErrorReason::RemoteRejected(status.as_u16(), detail),
            })
        }
    }
} // end of impl AppTelegramBotCtx

#[async_trait]
impl AbstractNotificationSink for AppTelegramBotCtx {
    async fn send(&self, recipient: i64, msg: &AdminNotifyModel) -> Result<(), AppNotifyError> {
        let buttons = vec![
            InlineButton {
                text: "✅ Відправлено",
                callback_data: callback_data(ACTION_MARK_DONE, msg),
            },
            InlineButton {
                text: "❌ Скасувати",
                callback_data: callback_data(ACTION_CANCEL, msg),
            },
        ];
        let body = SendMessageBody {
            chat_id: recipient,
            text: msg.text.as_str(),
            parse_mode: "Markdown",
            reply_markup: InlineKeyboard {
                inline_keyboard: vec![buttons],
            },
        };
        let serial = serde_json::to_vec(&body).map_err(|e| AppNotifyError {
            reason: AppNotifyErrorReason::SerialiseFailure(e.to_string()),
        })?;
        // token never written to log
        let path = format!("/bot{}/sendMessage", self.bot_token);
        let period = Duration::from_secs(self.timeout_secs as u64);
        match tokio::time::timeout(period, self._send(path.as_str(), serial)).await {
            Ok(r) => r,
            Err(_elapsed) => Err(AppNotifyError {
                reason: AppNotifyErrorReason::Timeout(self.timeout_secs),
            }),
        }
    }
} // end of impl AbstractNotificationSink for AppTelegramBotCtx
