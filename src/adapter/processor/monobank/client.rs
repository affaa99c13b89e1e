use std::marker::{Send, Sync};
use std::result::Result;
use std::sync::Arc;

use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, ACCEPT};
use hyper::{Method, StatusCode};
use tokio_native_tls::TlsConnector;

use storefront_common::logging::AppLogContext;

use crate::adapter::base_client::BaseClient;
use crate::adapter::{BaseClientError, BaseClientErrorReason};

const HEADER_NAME_TOKEN: &str = "x-token";

pub(super) struct AppMonobankClient<B> {
    api_token: String,
    _base_client: BaseClient<B>,
}

impl<B> AppMonobankClient<B>
where
    B: BodyExt + Send + 'static,
    B::Data: Send,
    B::Error: std::error::Error + Send + Sync,
{
    pub(super) async fn try_build(
        logctx: Arc<AppLogContext>,
        secure_connector: &TlsConnector,
        host: String,
        port: u16,
        api_token: String,
    ) -> Result<Self, BaseClientError> {
        let _base_client = BaseClient::<B>::try_build(logctx, secure_connector, host, port).await?;
        Ok(Self {
            api_token,
            _base_client,
        })
    }

    fn auth_headers(&self) -> Result<Vec<(HeaderName, HeaderValue)>, BaseClientError> {
        let token = HeaderValue::from_str(self.api_token.as_str()).map_err(|_e| BaseClientError {
            reason: BaseClientErrorReason::HttpRequest("token-header-parse-fail".to_string()),
        })?;
        Ok(vec![
            (HeaderName::from_static(HEADER_NAME_TOKEN), token),
            (ACCEPT, HeaderValue::from_static("application/json")),
        ])
    }
}

impl AppMonobankClient<Full<Bytes>> {
    pub(super) async fn post_json(
        &mut self,
        resource_path: &str,
        body: Vec<u8>,
    ) -> Result<(Vec<u8>, StatusCode), BaseClientError> {
        let headers = self.auth_headers()?;
        self._base_client
            .send_json(resource_path, Method::POST, body, headers)
            .await
    }
}

impl AppMonobankClient<Empty<Bytes>> {
    pub(super) async fn get(
        &mut self,
        resource_path: &str,
    ) -> Result<(Vec<u8>, StatusCode), BaseClientError> {
        let headers = self.auth_headers()?;
        self._base_client
            .send_empty(resource_path, Method::GET, headers)
            .await
    }
}
