use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::future::{Either, select};
use futures_timer::Delay;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TransportError {
    Rejected(String),
    TimedOut(Duration),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Rejected(reason) => write!(f, "submission rejected: {reason}"),
            TransportError::TimedOut(limit) => {
                write!(f, "submission timed out after {} ms", limit.as_millis())
            }
        }
    }
}

impl std::error::Error for TransportError {}

pub type BoxedTransportFuture =
    Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'static>>;

/// Delivers a validated payload somewhere. Completion of the returned
/// future is the only signal the form waits on.
pub trait SubmissionTransport<T>: Send + Sync + 'static {
    fn deliver(&self, payload: T) -> BoxedTransportFuture;
}

impl<T, F> SubmissionTransport<T> for F
where
    F: Fn(T) -> BoxedTransportFuture + Send + Sync + 'static,
{
    fn deliver(&self, payload: T) -> BoxedTransportFuture {
        (self)(payload)
    }
}

/// Stand-in transport that waits a fixed delay and always succeeds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SimulatedTransport {
    delay: Duration,
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(2_000),
        }
    }
}

impl SimulatedTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T> SubmissionTransport<T> for SimulatedTransport
where
    T: Send + 'static,
{
    fn deliver(&self, payload: T) -> BoxedTransportFuture {
        let delay = self.delay;
        Box::pin(async move {
            Delay::new(delay).await;
            drop(payload);
            Ok(())
        })
    }
}

/// Bounds a delivery by `limit`, failing with `TransportError::TimedOut`
/// when the transport has not finished in time.
pub fn with_timeout(delivery: BoxedTransportFuture, limit: Option<Duration>) -> BoxedTransportFuture {
    let Some(limit) = limit else {
        return delivery;
    };
    Box::pin(async move {
        match select(delivery, Delay::new(limit)).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(TransportError::TimedOut(limit)),
        }
    })
}
