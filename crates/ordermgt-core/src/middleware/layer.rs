use core::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll, ready},
};
use pin_project_lite::pin_project;
use std::time::Instant;
use tonic::codegen::http;
use tower::{Layer, Service};

/// Which end of the connection a [`RpcLogLayer`] is installed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Server,
    Client,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Server => write!(f, "server"),
            Side::Client => write!(f, "client"),
        }
    }
}

/// Layer producing [`RpcLog`] services.
#[derive(Debug, Clone, Copy)]
pub struct RpcLogLayer {
    side: Side,
}

impl RpcLogLayer {
    pub const fn server() -> Self {
        Self { side: Side::Server }
    }

    pub const fn client() -> Self {
        Self { side: Side::Client }
    }
}

impl<S> Layer<S> for RpcLogLayer {
    type Service = RpcLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RpcLog {
            inner,
            side: self.side,
        }
    }
}

/// Logs the method path of every request passing through `inner`.
#[derive(Debug, Clone)]
pub struct RpcLog<S> {
    inner: S,
    side: Side,
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for RpcLog<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>>,
    S::Error: fmt::Display,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<ReqBody>) -> Self::Future {
        let method = req.uri().path().to_owned();
        tracing::info!(side = %self.side, method = %method, "RPC started");

        ResponseFuture {
            inner: self.inner.call(req),
            method,
            side: self.side,
            started: Instant::now(),
        }
    }
}

pin_project! {
    /// Response future of [`RpcLog`].
    pub struct ResponseFuture<F> {
        #[pin]
        inner: F,
        method: String,
        side: Side,
        started: Instant,
    }
}

impl<F, ResBody, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<http::Response<ResBody>, E>>,
    E: fmt::Display,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let result = ready!(this.inner.poll(cx));
        let elapsed_ms = this.started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(response) => {
                // Set only on trailers-only responses, i.e. immediate failures.
                let grpc_status = response
                    .headers()
                    .get("grpc-status")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("0");
                tracing::info!(
                    side = %this.side,
                    method = %this.method,
                    http_status = response.status().as_u16(),
                    grpc_status,
                    elapsed_ms,
                    "RPC completed"
                );
            }
            Err(err) => {
                tracing::warn!(
                    side = %this.side,
                    method = %this.method,
                    elapsed_ms,
                    "RPC failed: {err}"
                );
            }
        }

        Poll::Ready(result)
    }
}
