pub mod adapter;
pub mod api;
pub mod model;
pub mod network;
pub mod usecase;

use std::result::Result;
use std::sync::Arc;

use chrono::Duration;

use storefront_common::config::AppConfig;
use storefront_common::confidentiality::{self, AbstractConfidentiality};
use storefront_common::error::AppConfidentialityError;
use storefront_common::logging::AppLogContext;

use crate::adapter::cache::{app_cache_context, AbstractKeyValueCache};
use crate::adapter::notification::{
    app_notification_sink, AbstractNotificationSink, AppNotifyError,
};
use crate::adapter::processor::{
    app_processor_context, AbstractPaymentProcessor, AppProcessorError,
};
use crate::adapter::repository::{
    NotifiedInvoiceMarker, PendingInvoiceStore, ReferenceCodeRegistry,
};

pub mod hard_limit {
    pub const MAX_ITEMS_INMEM_CACHE: u32 = 50000u32;
    pub const MAX_TIMEOUT_SECS: u16 = 120u16;
    pub const PENDING_INVOICE_TTL_SECS: i64 = 24 * 3600;
    // reservation outlives any realistic payment window
    pub const REFERENCE_CODE_TTL_FACTOR: i32 = 30;
    pub const NOTIFIED_MARKER_TTL_SECS: i64 = 24 * 3600;
}

pub struct AppSharedState {
    _config: Arc<AppConfig>,
    _log_ctx: Arc<AppLogContext>,
    _cache: Arc<Box<dyn AbstractKeyValueCache>>,
    _processor: Arc<Box<dyn AbstractPaymentProcessor>>,
    _notify_sink: Arc<Box<dyn AbstractNotificationSink>>,
}

#[derive(Debug)]
pub enum ShrStateInitProgress {
    Confidentiality,
    ExternalProcessor,
    NotificationSink,
}

#[derive(Debug)]
pub struct ShrStateInitError {
    pub progress: ShrStateInitProgress,
    pub detail: String,
}
impl From<AppConfidentialityError> for ShrStateInitError {
    fn from(value: AppConfidentialityError) -> Self {
        Self {
            progress: ShrStateInitProgress::Confidentiality,
            detail: format!("{:?}", value),
        }
    }
}
impl From<AppProcessorError> for ShrStateInitError {
    fn from(value: AppProcessorError) -> Self {
        Self {
            progress: ShrStateInitProgress::ExternalProcessor,
            detail: format!("{:?}", value),
        }
    }
}
impl From<AppNotifyError> for ShrStateInitError {
    fn from(value: AppNotifyError) -> Self {
        Self {
            progress: ShrStateInitProgress::NotificationSink,
            detail: format!("{:?}", value),
        }
    }
}

impl AppSharedState {
    pub fn new(cfg: AppConfig) -> Result<Self, ShrStateInitError> {
        let logctx = {
            let lc = AppLogContext::new(&cfg.basepath, &cfg.api_server.logging);
            Arc::new(lc)
        };
        let cfdntl: Arc<Box<dyn AbstractConfidentiality>> = {
            let c = confidentiality::build_context(&cfg)?;
            Arc::new(c)
        };
        let _cache = {
            let c = app_cache_context(&cfg.api_server.cache);
            Arc::new(c)
        };
        let _processor = {
            let proc_cfg = cfg.api_server.payment_processor.clone();
            let p = app_processor_context(proc_cfg, cfdntl.clone(), logctx.clone())?;
            Arc::new(p)
        };
        let _notify_sink = {
            let notify_cfg = cfg.api_server.notification.clone();
            let n = app_notification_sink(notify_cfg, cfdntl, logctx.clone())?;
            Arc::new(n)
        };
        Ok(Self {
            _config: Arc::new(cfg),
            _log_ctx: logctx,
            _cache,
            _processor,
            _notify_sink,
        })
    }

    /// for test deployments and test cases which build adapters
    /// without configuration files
    pub fn from_parts(
        cfg: AppConfig,
        logctx: Arc<AppLogContext>,
        cache: Box<dyn AbstractKeyValueCache>,
        processor: Box<dyn AbstractPaymentProcessor>,
        notify_sink: Box<dyn AbstractNotificationSink>,
    ) -> Self {
        Self {
            _config: Arc::new(cfg),
            _log_ctx: logctx,
            _cache: Arc::new(cache),
            _processor: Arc::new(processor),
            _notify_sink: Arc::new(notify_sink),
        }
    }

    pub fn cache(&self) -> Arc<Box<dyn AbstractKeyValueCache>> {
        self._cache.clone()
    }
    pub fn processor_context(&self) -> Arc<Box<dyn AbstractPaymentProcessor>> {
        self._processor.clone()
    }
    pub fn notification_sink(&self) -> Arc<Box<dyn AbstractNotificationSink>> {
        self._notify_sink.clone()
    }
    pub fn log_context(&self) -> Arc<AppLogContext> {
        self._log_ctx.clone()
    }
    pub fn config(&self) -> Arc<AppConfig> {
        self._config.clone()
    }

    pub fn reference_code_registry(&self) -> ReferenceCodeRegistry {
        let ttl = Duration::seconds(hard_limit::PENDING_INVOICE_TTL_SECS)
            * hard_limit::REFERENCE_CODE_TTL_FACTOR;
        ReferenceCodeRegistry::new(self.cache(), ttl, self.log_context())
    }
    pub fn pending_invoice_store(&self) -> PendingInvoiceStore {
        let ttl = Duration::seconds(hard_limit::PENDING_INVOICE_TTL_SECS);
        PendingInvoiceStore::new(self.cache(), ttl)
    }
    pub fn notified_invoice_marker(&self) -> NotifiedInvoiceMarker {
        let ttl = Duration::seconds(hard_limit::NOTIFIED_MARKER_TTL_SECS);
        NotifiedInvoiceMarker::new(self.cache(), ttl)
    }
} // end of impl AppSharedState

impl Clone for AppSharedState {
    fn clone(&self) -> Self {
        Self {
            _config: self._config.clone(),
            _log_ctx: self._log_ctx.clone(),
            _cache: self._cache.clone(),
            _processor: self._processor.clone(),
            _notify_sink: self._notify_sink.clone(),
        }
    }
}
