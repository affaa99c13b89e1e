use std::collections::HashMap;
use std::io::stdout;
use std::path::Path;

use tracing::dispatcher::Dispatch;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::Layer as TraceLayer;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::{Layer as LayerIntf, Registry};

use crate::config::{AppBasepathCfg, AppLogHandlerCfg, AppLoggerCfg, AppLoggingCfg};
use crate::constant::logging::{Destination as DstOption, Level as AppLogLevelInner};
use crate::AppLogAlias;

pub type AppLogLevel = AppLogLevelInner;
type DefaultHandler = (NonBlocking, tracing::Level, WorkerGuard);

pub struct AppLogContext {
    _io_guards: Vec<WorkerGuard>,
    // sorted by length of alias in descending order, so the first match
    // is always the most specific logger
    loggers: Vec<(AppLogAlias, Dispatch)>,
}

// exposed because binary executables and integration tests expand
// `app_log_event` outside this crate
#[macro_export]
macro_rules! to_3rdparty_level {
    ($lvlin:expr) => {
        match $lvlin {
            $crate::logging::AppLogLevel::FATAL | $crate::logging::AppLogLevel::ERROR => {
                tracing::Level::ERROR
            }
            $crate::logging::AppLogLevel::WARNING => tracing::Level::WARN,
            $crate::logging::AppLogLevel::INFO => tracing::Level::INFO,
            $crate::logging::AppLogLevel::DEBUG => tracing::Level::DEBUG,
            $crate::logging::AppLogLevel::TRACE => tracing::Level::TRACE,
        }
    };
}

fn _gen_localfile_writer(basepath: &str, rpath: &str) -> (NonBlocking, WorkerGuard) {
    let mut fullpath = basepath.to_string();
    if !basepath.ends_with('/') && !rpath.starts_with('/') {
        fullpath.push('/');
    }
    fullpath.push_str(rpath);
    let p = Path::new(&fullpath);
    let dir = p.parent().unwrap_or_else(|| Path::new("."));
    let fname_prefix = p.file_name().unwrap_or_else(|| "app.log".as_ref());
    let wr_dst = RollingFileAppender::new(Rotation::NEVER, dir, fname_prefix);
    tracing_appender::non_blocking(wr_dst)
}

// tracing spawns a dedicated thread for each non-blocking writer
fn _init_handler(basepath: &AppBasepathCfg, cfg: &AppLogHandlerCfg) -> DefaultHandler {
    let lvl = to_3rdparty_level!(&cfg.min_level);
    let (io_wr, guard) = match (&cfg.destination, cfg.path.as_ref()) {
        (DstOption::LOCALFS, Some(rpath)) => _gen_localfile_writer(&basepath.system, rpath),
        // configuration check rejects file handler without path, fall back
        // to console in case this context is built without the check
        (DstOption::LOCALFS, None) | (DstOption::CONSOLE, _) => {
            tracing_appender::non_blocking(stdout())
        }
    }; // callers MUST keep the guard along with the writer, for flushing
       // log messages to I/O
    (io_wr, lvl, guard)
}

fn _init_logger(cfg: &AppLoggerCfg, hdlrs: &HashMap<AppLogAlias, DefaultHandler>) -> Dispatch {
    let layers = cfg
        .handlers
        .iter()
        .filter_map(|alias| hdlrs.get(alias))
        .map(|(wr_ptr, default_lvl, _guard)| {
            let lvl = cfg
                .level
                .as_ref()
                .map(|l| to_3rdparty_level!(l))
                .unwrap_or(*default_lvl);
            TraceLayer::new()
                .with_writer(wr_ptr.clone())
                .with_file(false) // to prevent full path exposed
                .with_line_number(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(LevelFilter::from_level(lvl))
        })
        .collect::<Vec<_>>();
    let subscriber = Registry::default().with(layers);
    Dispatch::new(subscriber)
}

impl AppLogContext {
    pub fn new(basepath: &AppBasepathCfg, cfg: &AppLoggingCfg) -> Self {
        let hdlrs = cfg
            .handlers
            .iter()
            .map(|item| (item.alias.clone(), _init_handler(basepath, item)))
            .collect::<HashMap<_, _>>();
        let mut loggers = cfg
            .loggers
            .iter()
            .map(|item| (item.alias.clone(), _init_logger(item, &hdlrs)))
            .collect::<Vec<_>>();
        loggers.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self {
            loggers,
            _io_guards: hdlrs.into_values().map(|(_, _, g)| g).collect(),
        }
    }

    /// find the logger whose alias is the longest prefix of the given
    /// module path, e.g. alias `storefront_payment::usecase` serves
    /// `storefront_payment::usecase::webhook`
    pub fn get_assigner(&self, mod_path: &str) -> Option<&Dispatch> {
        self.loggers
            .iter()
            .find(|(alias, _)| {
                let alias = alias.as_str();
                mod_path == alias
                    || (mod_path.starts_with(alias) && mod_path[alias.len()..].starts_with("::"))
            })
            .map(|(_, d)| d)
    }
} // end of impl AppLogContext

#[macro_export]
macro_rules! app_log_event {
    ( $ctx:ident, $lvl:expr, $($arg:tt)+ ) => {{
        const MOD_PATH:&str = module_path!();
        if let Some(assigner) = $ctx.get_assigner(MOD_PATH) {
            const LVL_INNER: tracing::Level = $crate::logging::to_3rdparty_level!($lvl);
            tracing::dispatcher::with_default(assigner, || {
                tracing::event!(LVL_INNER, $($arg)+);
            });
        } else {
            println!("[WARN] log dispatcher not found at the module path: {}", MOD_PATH);
            println!($($arg)+);
        }
    }};
}

pub use app_log_event;
pub use to_3rdparty_level;
