use crate::error::Error;
use crate::{AnyRequest, AnyResponse, Middleware, Next};
use std::time::Duration;

/// A middleware that waits before letting a request through, simulating
/// latency or applying crude backpressure.
///
/// The wait is abandoned as soon as the dispatch is cancelled.
#[derive(Debug, Clone, Copy)]
pub struct DelayMiddleware {
    delay: Duration,
}

impl DelayMiddleware {
    /// Constructs a `DelayMiddleware` waiting `delay` before each request.
    pub fn new(delay: Duration) -> Self {
        DelayMiddleware { delay }
    }

    /// Returns the delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for DelayMiddleware {
    fn default() -> Self {
        DelayMiddleware::new(Duration::from_millis(500))
    }
}

#[async_trait::async_trait]
impl Middleware for DelayMiddleware {
    async fn invoke(&self, req: AnyRequest, next: Next) -> crate::Result<AnyResponse> {
        let cancel = req.cancellation().clone();

        log::debug!("delaying `{}` by {:?}", req.type_name(), self.delay);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::cancelled()),
            _ = tokio::time::sleep(self.delay) => {}
        }

        next.run(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DefaultMediator, ErrorKind, Mediator, Request};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Instant;
    use tokio_util::sync::CancellationToken;

    struct Echo(u32);
    impl Request<u32> for Echo {}

    #[tokio::test(flavor = "multi_thread")]
    async fn delays_request_test() {
        let mediator = DefaultMediator::builder()
            .add_middleware(DelayMiddleware::new(Duration::from_millis(50)))
            .add_handler_fn(|req: Echo, _| async move { Ok(req.0) })
            .build();

        assert_eq!(DelayMiddleware::default().delay(), Duration::from_millis(500));

        let start = Instant::now();
        assert_eq!(mediator.send(Echo(7)).await.unwrap(), 7);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancellation_interrupts_delay_test() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = reached.clone();

        let mediator = DefaultMediator::builder()
            .add_middleware(DelayMiddleware::new(Duration::from_secs(10)))
            .add_handler_fn(move |req: Echo, _| {
                let flag = flag.clone();
                async move {
                    flag.store(true, Ordering::SeqCst);
                    Ok(req.0)
                }
            })
            .build();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let err = mediator.send_with(Echo(1), cancel).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!reached.load(Ordering::SeqCst));
    }
}
