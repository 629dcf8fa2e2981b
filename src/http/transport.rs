//! The network transport a request is handed to.
//!
//! Connection pooling, TLS and protocol negotiation all live behind
//! [`Transport::send`]; the rest of the crate only sees a request go in and a
//! response (or error) come out.

use crate::base::neterror::NetError;
use crate::http::requestbody::{BoxedBody, RequestBody};
use crate::http::responsebody::ResponseBody;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Request as handed to a [`Transport`].
pub type HttpRequest = http::Request<RequestBody>;

/// Response as returned by a [`Transport`], body still unread.
pub type HttpResponse = http::Response<ResponseBody>;

/// Alias for the `Future` returned by [`Transport::send`].
pub type Sending = Pin<Box<dyn Future<Output = Result<HttpResponse, NetError>> + Send>>;

/// Sends one request and yields its response head plus body stream.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Sending;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> Sending {
        (**self).send(request)
    }
}

/// Plain-HTTP transport on hyper-util's pooled client.
///
/// `https` URLs need a caller-supplied [`Transport`] with a TLS connector.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, BoxedBody>,
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Transport for HyperTransport {
    fn send(&self, request: HttpRequest) -> Sending {
        let client = self.client.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let request = http::Request::from_parts(parts, body.into_boxed());

            let response = client.request(request).await.map_err(|e| {
                tracing::debug!(error = %e, "transport request failed");
                NetError::Transport(error_chain(&e))
            })?;

            Ok(response.map(ResponseBody::from_incoming))
        })
    }
}

/// "outer: inner: root" for an error and its sources.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
