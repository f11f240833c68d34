use core::{
    any::type_name,
    fmt,
    pin::Pin,
    task::{Context, Poll, ready},
};
use futures::Stream;
use pin_project_lite::pin_project;

/// Whether a [`LoggedStream`] carries messages from or to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Messages received from the peer.
    Inbound,
    /// Messages sent to the peer.
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => write!(f, "recv"),
            Direction::Outbound => write!(f, "send"),
        }
    }
}

pin_project! {
    /// Decorates a stream of `Result<T, E>` messages with per-message logs.
    ///
    /// Items are forwarded untouched. Each `Ok` is logged at `debug` with its
    /// type and sequence number, each `Err` at `warn`, and end-of-stream once
    /// with the total count.
    pub struct LoggedStream<S> {
        #[pin]
        inner: S,
        rpc: &'static str,
        direction: Direction,
        messages: usize,
    }
}

impl<S> LoggedStream<S> {
    pub const fn new(inner: S, rpc: &'static str, direction: Direction) -> Self {
        Self {
            inner,
            rpc,
            direction,
            messages: 0,
        }
    }

    /// Wraps messages received from the peer.
    pub const fn inbound(inner: S, rpc: &'static str) -> Self {
        Self::new(inner, rpc, Direction::Inbound)
    }

    /// Wraps messages sent to the peer.
    pub const fn outbound(inner: S, rpc: &'static str) -> Self {
        Self::new(inner, rpc, Direction::Outbound)
    }

    /// Number of successful messages seen so far.
    pub const fn messages(&self) -> usize {
        self.messages
    }
}

impl<S, T, E> Stream for LoggedStream<S>
where
    S: Stream<Item = Result<T, E>>,
    E: fmt::Display,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let item = ready!(this.inner.poll_next(cx));

        match &item {
            Some(Ok(_)) => {
                *this.messages += 1;
                tracing::debug!(
                    rpc = *this.rpc,
                    direction = %this.direction,
                    message_type = type_name::<T>(),
                    seq = *this.messages,
                    "Stream message"
                );
            }
            Some(Err(err)) => {
                tracing::warn!(
                    rpc = *this.rpc,
                    direction = %this.direction,
                    "Stream error: {err}"
                );
            }
            None => {
                tracing::debug!(
                    rpc = *this.rpc,
                    direction = %this.direction,
                    total = *this.messages,
                    "Stream closed"
                );
            }
        }

        Poll::Ready(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
