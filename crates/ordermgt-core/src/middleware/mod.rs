//! Logging middleware shared by the server and the client.
//!
//! - [`RpcLogLayer`] - a [`tower::Layer`] that logs every call's method path
//!   on entry and its outcome and latency on completion. It works on both a
//!   tonic `Server` and a tonic `Channel`.
//! - [`LoggedStream`] - a [`Stream`](futures::Stream) decorator that logs each
//!   message flowing through a streaming RPC, in either direction.
//!
//! Both are composed at setup time and never change the messages they see.

mod layer;
mod stream;

pub use layer::{ResponseFuture, RpcLog, RpcLogLayer, Side};
pub use stream::{Direction, LoggedStream};
