use std::io::{Error as IoError, ErrorKind};
use std::marker::{Send, Sync};
use std::result::Result;
use std::sync::Arc;

use http_body_util::BodyExt;
use http_body_util::{Empty, Full};
use hyper::body::Bytes;
use hyper::client::conn::http1::{handshake, SendRequest};
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE, HOST};
use hyper::{Error as HyperError, Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio_native_tls::{native_tls, TlsConnector};

use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

#[derive(Debug)]
pub enum BaseClientErrorReason {
    TcpNet(ErrorKind, String),
    SysIo(ErrorKind, String),
    Http {
        sender_closed: bool,
        parse_error: bool,
        req_cancelled: bool,
        message_corrupted: bool,
        timeout: bool,
        detail: String,
    },
    HttpRequest(String),
    Tls(String),
}

impl From<IoError> for BaseClientErrorReason {
    fn from(value: IoError) -> Self {
        let ekind = value.kind();
        match &ekind {
            ErrorKind::TimedOut
            | ErrorKind::AddrInUse
            | ErrorKind::NotConnected
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionAborted => Self::TcpNet(ekind, value.to_string()),
            _others => Self::SysIo(ekind, value.to_string()),
        }
    }
}
impl From<HyperError> for BaseClientErrorReason {
    fn from(value: HyperError) -> Self {
        Self::Http {
            sender_closed: value.is_closed(),
            parse_error: value.is_parse_status() | value.is_parse(),
            timeout: value.is_timeout(),
            message_corrupted: value.is_incomplete_message() | value.is_body_write_aborted(),
            req_cancelled: value.is_canceled(),
            detail: value.to_string(),
        }
    }
}
impl From<native_tls::Error> for BaseClientErrorReason {
    fn from(value: native_tls::Error) -> Self {
        Self::Tls(value.to_string())
    }
}

#[derive(Debug)]
pub struct BaseClientError {
    pub reason: BaseClientErrorReason,
}

pub(crate) fn secure_connector() -> Result<TlsConnector, BaseClientError> {
    let c = native_tls::TlsConnector::new().map_err(|e| BaseClientError { reason: e.into() })?;
    Ok(TlsConnector::from(c))
}

/// HTTP/1.1 client over TLS, one connection per instance, suitable for
/// a single request/response exchange with remote server
pub(crate) struct BaseClient<B> {
    req_sender: SendRequest<B>,
    logctx: Arc<AppLogContext>,
    host: String,
    port: u16,
}

impl<B> BaseClient<B>
where
    B: BodyExt + Send + 'static,
    B::Data: Send,
    B::Error: std::error::Error + Send + Sync,
{
    pub(crate) async fn try_build(
        logctx: Arc<AppLogContext>,
        secure_connector: &TlsConnector,
        host: String,
        port: u16,
    ) -> Result<Self, BaseClientError> {
        let logctx_cpy = logctx.clone();
        let tcp_stream = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|e| {
                app_log_event!(
                    logctx_cpy,
                    AppLogLevel::ERROR,
                    "tcp-conn-err, {host}:{port}, {:?}",
                    &e
                );
                BaseClientError { reason: e.into() }
            })?;
        let tls_stream = secure_connector
            .connect(host.as_str(), tcp_stream)
            .await
            .map_err(|e| BaseClientError { reason: e.into() })?;
        let io_adapter = TokioIo::new(tls_stream);
        let (req_sender, connector) = handshake(io_adapter)
            .await
            .map_err(|e| BaseClientError { reason: e.into() })?;
        let host_cpy = host.clone();
        let _handle = tokio::spawn(async move {
            if let Err(e) = connector.await {
                app_log_event!(
                    logctx_cpy,
                    AppLogLevel::WARNING,
                    "remote server: {host_cpy}:{port}, {:?}",
                    e
                );
            }
        });
        Ok(Self {
            req_sender,
            logctx,
            host,
            port,
        })
    } // end of fn try-build

    async fn _send(&mut self, req: Request<B>) -> Result<(Vec<u8>, StatusCode), BaseClientError> {
        let logctx_p = &self.logctx;
        let mut resp = self.req_sender.send_request(req).await.map_err(|e| {
            app_log_event!(logctx_p, AppLogLevel::WARNING, "{:?}", e);
            BaseClientError { reason: e.into() }
        })?;
        let mut raw_collected = Vec::<u8>::new();
        while let Some(nxt) = resp.frame().await {
            let frm = nxt.map_err(|e| BaseClientError { reason: e.into() })?;
            // trailers are irrelevant to the remote APIs in this service
            if let Ok(chunk) = frm.into_data() {
                raw_collected.extend_from_slice(chunk.as_ref());
            }
        }
        let status_code = resp.status();
        if status_code.is_server_error() {
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "server:{}:{}, status:{}",
                self.host.as_str(),
                self.port,
                status_code.as_u16()
            );
        }
        Ok((raw_collected, status_code))
    } // end of fn _send

    fn build_request(
        &self,
        path: &str,
        method: Method,
        headers: Vec<(HeaderName, HeaderValue)>,
        body: B,
    ) -> Result<Request<B>, BaseClientError> {
        let host_val = HeaderValue::from_str(self.host.as_str()).map_err(|e| BaseClientError {
            reason: BaseClientErrorReason::HttpRequest(e.to_string()),
        })?;
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .body(body)
            .map_err(|e| BaseClientError {
                reason: BaseClientErrorReason::HttpRequest(e.to_string()),
            })?;
        let dst = req.headers_mut();
        headers
            .into_iter()
            .map(|(k, v)| {
                let _old = dst.insert(k, v);
            })
            .count();
        // required when remote server sits behind reverse proxy or CDN
        let _discarded = dst.insert(HOST, host_val);
        Ok(req)
    }
} // end of impl BaseClient

impl BaseClient<Full<Bytes>> {
    pub(crate) async fn send_json(
        &mut self,
        path: &str,
        method: Method,
        body: Vec<u8>,
        mut headers: Vec<(HeaderName, HeaderValue)>,
    ) -> Result<(Vec<u8>, StatusCode), BaseClientError> {
        headers.push((CONTENT_TYPE, HeaderValue::from_static("application/json")));
        let body = Full::new(Bytes::from(body));
        let req = self.build_request(path, method, headers, body)?;
        self._send(req).await
    }
}

impl BaseClient<Empty<Bytes>> {
    pub(crate) async fn send_empty(
        &mut self,
        path: &str,
        method: Method,
        headers: Vec<(HeaderName, HeaderValue)>,
    ) -> Result<(Vec<u8>, StatusCode), BaseClientError> {
        let req = self.build_request(path, method, headers, Empty::default())?;
        self._send(req).await
    }
}
