use std::io::Result as IoResult;

use actix_http::Request;
use actix_service::IntoServiceFactory;
use actix_web::body::MessageBody;
use actix_web::dev::{AppConfig, Response, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::web;
use actix_web::{App, HttpServer};

use storefront_common::config::WebApiRouteCfg;

use crate::api::web::AppRouteTable;

/*
 * `App` is not meant to be passed around between functions, the return type
 * below follows the workaround in actix-web FAQ :
 * https://github.com/actix/actix-web/wiki/FAQ#how-can-i-return-app-from-a-function--why-is-appentry-private
 *
 * The second element of the returned tuple is number of routes bound to
 * the handlers in the route table, routes with unknown handler label are
 * skipped.
 * */
pub fn app_web_service(
    mut route_table: AppRouteTable,
    cfg: Vec<WebApiRouteCfg>,
    path_prefix: &str,
) -> (
    App<
        impl ServiceFactory<
            ServiceRequest,
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::error::Error,
            Config = (),
            InitError = (),
        >,
    >,
    usize,
) {
    let mut num_applied = 0usize;
    let num_applied_p = &mut num_applied;
    let cfg_fn = move |c: &mut web::ServiceConfig| {
        *num_applied_p = cfg
            .into_iter()
            .filter_map(|item| {
                route_table
                    .entries
                    .remove(item.handler.as_str())
                    .map(|found| (item.path, found))
            })
            .map(|(path, route_found)| {
                c.route(path.as_str(), route_found);
            })
            .count();
    };
    let scope_path = path_prefix.trim_end_matches('/');
    let scope = web::scope(scope_path).configure(cfg_fn);
    let app = App::new().service(scope);
    (app, num_applied)
}

pub fn net_server_listener<F, I, S, B>(
    app_init_cb: F,
    domain_host: &str,
    port: u16,
) -> IoResult<HttpServer<F, I, S, B>>
where
    F: Fn() -> I + Clone + Send + 'static,
    I: IntoServiceFactory<S, Request>,
    S: ServiceFactory<Request, Config = AppConfig> + 'static,
    S::Error: Into<actix_web::error::Error>,
    S::InitError: std::fmt::Debug,
    S::Response: Into<Response<B>>,
    B: MessageBody + 'static,
{
    let domain = format!("{domain_host}:{port}");
    HttpServer::new(app_init_cb).bind(domain)
}
