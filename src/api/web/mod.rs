pub mod dto;
mod invoice;

use actix_http::Method;
use actix_web::Route;
use std::collections::HashMap;

use invoice::{create_invoice, invoice_status, monobank_webhook};

/// header which carries base64-encoded signature of webhook request body
pub const HEADER_WEBHOOK_SIGNATURE: &str = "X-Sign";

pub struct AppRouteTable {
    pub version: String,
    pub entries: HashMap<String, Route>,
}

impl AppRouteTable {
    pub fn get(ver_req: &str) -> Self {
        let (version, entries) = match ver_req {
            "0.1.0" => (format!("v{ver_req}"), Self::v0_1_0_entries()),
            _others => (String::new(), HashMap::new()),
        };
        Self { version, entries }
    }
    fn v0_1_0_entries() -> HashMap<String, Route> {
        let data = [
            (
                "create_invoice".to_string(),
                Route::new().method(Method::POST).to(create_invoice),
            ),
            (
                "monobank_webhook".to_string(),
                Route::new().method(Method::POST).to(monobank_webhook),
            ),
            (
                "invoice_status".to_string(),
                Route::new().method(Method::GET).to(invoice_status),
            ),
        ];
        HashMap::from(data)
    }
} // end of impl AppRouteTable
