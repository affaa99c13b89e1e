use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::env;

use actix_cors::Cors;
use actix_web::http::{header, Method};
use actix_web::rt;
use actix_web::web::{Data as WebData, JsonConfig, PayloadConfig};

use storefront_common::config::{AppCfgHardLimit, AppCfgInitArgs, AppConfig, WebApiListenCfg};
use storefront_common::constant::env_vars::EXPECTED_LABELS;
use storefront_common::logging::{app_log_event, AppLogLevel};

use storefront_payment::api::web::{AppRouteTable, HEADER_WEBHOOK_SIGNATURE};
use storefront_payment::network::{app_web_service, net_server_listener};
use storefront_payment::{hard_limit, AppSharedState};

fn init_config() -> Result<AppConfig, String> {
    let iter = env::vars().filter(|(k, _v)| EXPECTED_LABELS.contains(&k.as_str()));
    let args = AppCfgInitArgs {
        env_var_map: HashMap::<String, String, RandomState>::from_iter(iter),
        limit: AppCfgHardLimit {
            nitems_per_inmem_cache: hard_limit::MAX_ITEMS_INMEM_CACHE,
            max_timeout_secs: hard_limit::MAX_TIMEOUT_SECS,
        },
    };
    AppConfig::new(args).map_err(|e| format!("{:?}", e))
}

fn cors_middleware(listener: &WebApiListenCfg) -> Cors {
    let allowed = listener.cors.as_str();
    let c = if allowed == "*" {
        Cors::default().allow_any_origin()
    } else {
        Cors::default().allowed_origin(allowed)
    };
    c.allowed_methods([Method::GET, Method::POST])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allowed_header(HEADER_WEBHOOK_SIGNATURE)
        .max_age(3600)
}

fn start_server(shr_state: AppSharedState) {
    let cfg = shr_state.config();
    let logctx = shr_state.log_context();
    let listener = &cfg.api_server.listen;
    let body_limit = cfg.api_server.limit_req_body_in_bytes;
    let shr_state_cpy = shr_state.clone();
    let app_init = move || {
        let cfg = shr_state_cpy.config();
        let listener = &cfg.api_server.listen;
        let route_table = AppRouteTable::get(listener.api_version.as_str());
        let (app, _num_applied) = app_web_service(
            route_table,
            listener.routes.clone(),
            listener.path_prefix.as_str(),
        );
        app.app_data(WebData::new(shr_state_cpy.clone()))
            .app_data(JsonConfig::default().limit(body_limit))
            .app_data(PayloadConfig::new(body_limit))
            .wrap(cors_middleware(listener))
    };
    // routes are checked once before workers start, every worker builds
    // the same route table
    let (_app, num_applied) = app_web_service(
        AppRouteTable::get(listener.api_version.as_str()),
        listener.routes.clone(),
        listener.path_prefix.as_str(),
    );
    if num_applied == 0 {
        app_log_event!(logctx, AppLogLevel::ERROR, "no route applied, server not started");
        return;
    }
    let srv = match net_server_listener(app_init, listener.host.as_str(), listener.port) {
        Ok(s) => s
            .workers(cfg.api_server.num_workers as usize)
            .max_connections(listener.max_connections as usize),
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "server failed to bind, {:?}", e);
            return;
        }
    };
    app_log_event!(
        logctx,
        AppLogLevel::INFO,
        "listening on {}:{}, routes:{num_applied}",
        listener.host.as_str(),
        listener.port
    );
    let runner = rt::System::new();
    if let Err(e) = runner.block_on(async move { srv.run().await }) {
        app_log_event!(logctx, AppLogLevel::ERROR, "server terminated, {:?}", e);
    }
} // end of fn start_server

fn main() {
    let cfg = match init_config() {
        Ok(c) => c,
        Err(detail) => {
            println!("app failed to configure, {detail}");
            return;
        }
    };
    match AppSharedState::new(cfg) {
        Ok(shr_state) => start_server(shr_state),
        Err(e) => {
            println!("app failed to init shared state, {:?}", e);
        }
    }
}
