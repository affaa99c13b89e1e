use std::collections::hash_map::RandomState;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use serde::de::{Error as DeserializeError, Expected};
use serde::Deserialize;

use crate::constant::{env_vars, logging as const_log};
use crate::error::{AppCfgError, AppErrorCode};
use crate::{AppLogAlias, WebApiPath};

#[derive(Deserialize)]
pub struct AppLogHandlerCfg {
    pub min_level: const_log::Level,
    pub destination: const_log::Destination,
    pub alias: AppLogAlias,
    pub path: Option<String>,
}

#[derive(Deserialize)]
pub struct AppLoggerCfg {
    // module path prefix of the source code which emits log events
    pub alias: AppLogAlias,
    pub handlers: Vec<String>,
    pub level: Option<const_log::Level>,
}

#[derive(Deserialize)]
pub struct AppLoggingCfg {
    pub handlers: Vec<AppLogHandlerCfg>,
    pub loggers: Vec<AppLoggerCfg>,
}

#[derive(Deserialize, Clone)]
pub struct WebApiRouteCfg {
    pub path: WebApiPath,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub handler: String,
}

impl std::fmt::Display for WebApiRouteCfg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "path:{}, handler:{}", self.path, self.handler)
    }
}

#[derive(Deserialize)]
pub struct WebApiListenCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub api_version: String,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub cors: String,
    // common prefix of all the routes, e.g. `/payments`
    #[serde(default)]
    pub path_prefix: String,
    pub routes: Vec<WebApiRouteCfg>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "_type")]
pub enum AppCacheCfg {
    InMemory {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        alias: String,
        max_items: u32,
    },
}

#[derive(Deserialize, Debug)]
pub struct AppMonobankCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub host: String,
    pub port: u16,
    pub timeout_secs: u16,
    // path to the API token and webhook public key in confidential source
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub confidentiality_path: String,
    pub default_webhook_url: Option<String>,
    pub default_redirect_url: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "_type")]
pub enum AppPaymentProcessorCfg {
    Monobank(AppMonobankCfg),
    // in-process fake processor, for test deployments only
    Test {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        confidentiality_path: String,
    },
}

#[derive(Deserialize, Debug)]
pub struct AppTelegramCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub host: String,
    pub port: u16,
    pub timeout_secs: u16,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub confidentiality_path: String,
    pub admin_recipients: Vec<i64>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "_type")]
pub enum AppNotificationCfg {
    Telegram(AppTelegramCfg),
    // messages are written to log only
    Test { admin_recipients: Vec<i64> },
}

impl AppNotificationCfg {
    pub fn admin_recipients(&self) -> &[i64] {
        match self {
            Self::Telegram(c) => c.admin_recipients.as_slice(),
            Self::Test { admin_recipients } => admin_recipients.as_slice(),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "source")]
pub enum AppConfidentialCfg {
    UserSpace {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        sys_path: String,
    },
}

#[derive(Deserialize)]
pub struct ApiServerCfg {
    pub logging: AppLoggingCfg,
    pub listen: WebApiListenCfg,
    pub limit_req_body_in_bytes: usize,
    pub num_workers: u8,
    pub stack_sz_kb: u16,
    pub cache: AppCacheCfg,
    pub payment_processor: Arc<AppPaymentProcessorCfg>,
    pub notification: Arc<AppNotificationCfg>,
    pub confidentiality: AppConfidentialCfg,
}

pub struct AppBasepathCfg {
    pub system: String,
    pub service: String,
}

pub struct AppConfig {
    pub basepath: AppBasepathCfg,
    pub api_server: ApiServerCfg,
}

pub struct AppCfgHardLimit {
    pub nitems_per_inmem_cache: u32,
    pub max_timeout_secs: u16,
}
pub struct AppCfgInitArgs {
    pub env_var_map: HashMap<String, String, RandomState>,
    pub limit: AppCfgHardLimit,
}

impl AppConfig {
    pub fn new(args: AppCfgInitArgs) -> DefaultResult<Self, AppCfgError> {
        let (mut env_var_map, limit) = (args.env_var_map, args.limit);
        let mut take_env = |label: &str, code: AppErrorCode| {
            env_var_map
                .remove(label)
                .ok_or(AppCfgError { detail: None, code })
        };
        let sys_basepath =
            take_env(env_vars::SYS_BASEPATH, AppErrorCode::MissingSysBasePath)? + "/";
        let app_basepath =
            take_env(env_vars::SERVICE_BASEPATH, AppErrorCode::MissingAppBasePath)? + "/";
        let cfg_path = take_env(env_vars::CFG_FILEPATH, AppErrorCode::MissingConfigPath)?;
        let fullpath = app_basepath.clone() + &cfg_path;
        let api_server = Self::parse_from_file(fullpath, limit)?;
        Ok(Self {
            api_server,
            basepath: AppBasepathCfg {
                system: sys_basepath,
                service: app_basepath,
            },
        })
    } // end of fn new

    pub fn parse_from_file(
        filepath: String,
        limit: AppCfgHardLimit,
    ) -> DefaultResult<ApiServerCfg, AppCfgError> {
        let fileobj = File::open(filepath).map_err(|e| AppCfgError {
            detail: Some(e.to_string()),
            code: AppErrorCode::IOerror(e.kind()),
        })?;
        let reader = BufReader::new(fileobj);
        let jsnobj =
            serde_json::from_reader::<BufReader<File>, ApiServerCfg>(reader).map_err(|e| {
                AppCfgError {
                    detail: Some(e.to_string()),
                    code: AppErrorCode::InvalidJsonFormat,
                }
            })?;
        Self::_check_web_listener(&jsnobj.listen)?;
        Self::_check_logging(&jsnobj.logging)?;
        Self::_check_cache(&jsnobj.cache, &limit)?;
        Self::_check_processor(jsnobj.payment_processor.as_ref(), &limit)?;
        Self::_check_notification(jsnobj.notification.as_ref(), &limit)?;
        Ok(jsnobj)
    }

    fn _check_web_listener(obj: &WebApiListenCfg) -> DefaultResult<(), AppCfgError> {
        let version_ok = obj
            .api_version
            .split('.')
            .all(|tok| tok.parse::<u16>().is_ok());
        let badroute = obj
            .routes
            .iter()
            .find(|i| i.path.is_empty() || i.handler.is_empty());
        let prefix_ok = obj.path_prefix.is_empty() || obj.path_prefix.starts_with('/');
        if obj.routes.is_empty() {
            Err(AppCfgError {
                detail: None,
                code: AppErrorCode::NoRouteApiServerCfg,
            })
        } else if !version_ok {
            Err(AppCfgError {
                detail: Some("version must be numeric".to_string()),
                code: AppErrorCode::InvalidVersion,
            })
        } else if let Some(r) = badroute {
            Err(AppCfgError {
                detail: Some(r.to_string()),
                code: AppErrorCode::InvalidRouteConfig,
            })
        } else if !prefix_ok {
            Err(AppCfgError {
                detail: Some(format!("path-prefix:{}", obj.path_prefix)),
                code: AppErrorCode::InvalidRouteConfig,
            })
        } else {
            Ok(())
        }
    } // end of fn _check_web_listener

    fn _check_logging(obj: &AppLoggingCfg) -> DefaultResult<(), AppCfgError> {
        let fail = |code: AppErrorCode, detail: Option<String>| Err(AppCfgError { code, detail });
        if obj.handlers.is_empty() {
            return fail(AppErrorCode::NoLogHandlerCfg, None);
        }
        if obj.loggers.is_empty() {
            return fail(AppErrorCode::NoLoggerCfg, None);
        }
        if let Some(l) = obj.loggers.iter().find(|l| l.handlers.is_empty()) {
            let msg = format!("the logger does not have handler: {}", l.alias);
            return fail(AppErrorCode::NoHandlerInLoggerCfg, Some(msg));
        }
        if obj.handlers.iter().any(|h| h.alias.is_empty()) {
            return fail(AppErrorCode::MissingAliasLogHdlerCfg, None);
        }
        if obj.loggers.iter().any(|l| l.alias.is_empty()) {
            return fail(AppErrorCode::MissingAliasLoggerCfg, None);
        }
        // for file-type handler, the field `path` has to be provided
        let no_path = obj.handlers.iter().find(|h| {
            matches!(h.destination, const_log::Destination::LOCALFS) && h.path.is_none()
        });
        if let Some(h) = no_path {
            let msg = format!("file-type handler does not contain path: {}", h.alias);
            return fail(AppErrorCode::InvalidHandlerLoggerCfg, Some(msg));
        }
        let hdlr_aliases: HashSet<&str> = obj.handlers.iter().map(|h| h.alias.as_str()).collect();
        let dangling = obj.loggers.iter().find(|l| {
            l.handlers
                .iter()
                .any(|a| !hdlr_aliases.contains(a.as_str()))
        });
        if let Some(l) = dangling {
            let msg = format!("the logger contains invalid handler alias: {}", l.alias);
            return fail(AppErrorCode::InvalidHandlerLoggerCfg, Some(msg));
        }
        Ok(())
    } // end of fn _check_logging

    fn _check_cache(obj: &AppCacheCfg, limit: &AppCfgHardLimit) -> DefaultResult<(), AppCfgError> {
        match obj {
            AppCacheCfg::InMemory { alias: _, max_items } => {
                let lmt = limit.nitems_per_inmem_cache;
                if *max_items == 0 || *max_items > lmt {
                    Err(AppCfgError {
                        detail: Some(format!("cache-limit:{lmt}, given:{max_items}")),
                        code: AppErrorCode::ExceedingMaxLimit,
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    fn _check_timeout(
        label: &str,
        timeout_secs: u16,
        limit: &AppCfgHardLimit,
    ) -> DefaultResult<(), AppCfgError> {
        if timeout_secs == 0 || timeout_secs > limit.max_timeout_secs {
            Err(AppCfgError {
                detail: Some(format!(
                    "{label}, limit:{}, given:{timeout_secs}",
                    limit.max_timeout_secs
                )),
                code: AppErrorCode::InvalidTimeout,
            })
        } else {
            Ok(())
        }
    }

    fn _check_processor(
        obj: &AppPaymentProcessorCfg,
        limit: &AppCfgHardLimit,
    ) -> DefaultResult<(), AppCfgError> {
        match obj {
            AppPaymentProcessorCfg::Monobank(c) => {
                Self::_check_timeout("payment-processor", c.timeout_secs, limit)
            }
            AppPaymentProcessorCfg::Test { .. } => Ok(()),
        }
    }

    fn _check_notification(
        obj: &AppNotificationCfg,
        limit: &AppCfgHardLimit,
    ) -> DefaultResult<(), AppCfgError> {
        if let AppNotificationCfg::Telegram(c) = obj {
            Self::_check_timeout("notification", c.timeout_secs, limit)?;
        }
        if obj.admin_recipients().is_empty() {
            Err(AppCfgError {
                detail: Some("notification".to_string()),
                code: AppErrorCode::NoAdminRecipient,
            })
        } else {
            Ok(())
        }
    }
} // end of impl AppConfig

struct ExpectNonEmptyString {
    min_len: u32,
}

impl Expected for ExpectNonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = format!("minimum string length >= {}", self.min_len);
        formatter.write_str(msg.as_str())
    }
}

fn jsn_deny_empty_string<'de, D>(raw: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(raw)?;
    if s.is_empty() {
        let exp = ExpectNonEmptyString { min_len: 1 };
        Err(DeserializeError::invalid_length(0, &exp))
    } else {
        Ok(s)
    }
}
