use crate::{AnyRequest, AnyResponse, Middleware, Next};
use log::Level;
use std::time::Instant;

/// A middleware that logs each request on the way in and on the way out.
///
/// Successful requests are logged at the configured level (`Info` by
/// default), failures are logged at `Warn` and passed on unchanged.
#[derive(Debug, Clone, Copy)]
pub struct LoggingMiddleware {
    level: Level,
}

impl LoggingMiddleware {
    /// Constructs a `LoggingMiddleware` logging at `Info`.
    pub fn new() -> Self {
        Self::with_level(Level::Info)
    }

    /// Constructs a `LoggingMiddleware` logging at the given level.
    pub fn with_level(level: Level) -> Self {
        LoggingMiddleware { level }
    }

    /// Returns the level successful requests are logged at.
    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Middleware for LoggingMiddleware {
    async fn invoke(&self, req: AnyRequest, next: Next) -> crate::Result<AnyResponse> {
        let name = req.type_name();
        let start = Instant::now();
        log::log!(self.level, "--> {}: before", name);

        let res = next.run(req).await;

        match &res {
            Ok(_) => log::log!(self.level, "<-- {}: after {:?}", name, start.elapsed()),
            Err(err) => log::warn!("<-- {}: failed after {:?}: {}", name, start.elapsed(), err),
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DefaultMediator, ErrorKind, Mediator, Request};

    struct Echo(u32);
    impl Request<u32> for Echo {}

    #[test]
    fn level_test() {
        assert_eq!(LoggingMiddleware::default().level(), Level::Info);
        assert_eq!(LoggingMiddleware::with_level(Level::Debug).level(), Level::Debug);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn passes_responses_and_failures_through_test() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mediator = DefaultMediator::builder()
            .add_middleware(LoggingMiddleware::with_level(Level::Debug))
            .add_handler_fn(|req: Echo, _| async move {
                if req.0 == 0 {
                    Err(crate::Error::handler("zero"))
                } else {
                    Ok(req.0)
                }
            })
            .build();

        assert_eq!(mediator.send(Echo(3)).await.unwrap(), 3);
        assert_eq!(mediator.send(Echo(0)).await.unwrap_err().kind(), ErrorKind::Handler);
    }
}
