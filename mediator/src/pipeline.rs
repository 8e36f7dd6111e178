use crate::error::Error;
use crate::{AnyRequest, AnyResponse, BoxFuture, Middleware, Next};
use std::sync::Arc;

/// The ordered list of middleware applied to every request.
#[derive(Clone, Default)]
pub(crate) struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Appends a middleware; registration order is wrap order.
    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Wraps `terminal` in every middleware.
    ///
    /// The chain is folded in reverse, so the first registered middleware
    /// ends up as the outermost layer: `A-before, B-before, terminal,
    /// B-after, A-after`. Each layer checks the cancellation token of the
    /// request before it runs.
    pub fn build_pipeline(&self, terminal: Next) -> Next {
        self.middlewares
            .iter()
            .enumerate()
            .rev()
            .fold(terminal, |next, (index, middleware)| {
                let middleware = Arc::clone(middleware);

                Next::new(move |req: AnyRequest| -> BoxFuture<'static, crate::Result<AnyResponse>> {
                    Box::pin(async move {
                        if req.cancellation().is_cancelled() {
                            return Err(Error::cancelled());
                        }

                        log::trace!("middleware #{} invoked for `{}`", index, req.type_name());
                        Middleware::invoke(&*middleware, req, next).await
                    })
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::sync::Mutex;

    type Trace = Arc<Mutex<Vec<String>>>;

    fn tracing_middleware(name: &'static str, trace: Trace) -> Arc<dyn Middleware> {
        Arc::new(move |req: AnyRequest, next: Next| {
            let trace = trace.clone();
            async move {
                trace.lock().unwrap().push(format!("before {}", name));
                let res = next.run(req).await;
                trace.lock().unwrap().push(format!("after {}", name));
                res
            }
        })
    }

    fn terminal(trace: Trace) -> Next {
        Next::new(move |req: AnyRequest| -> BoxFuture<'static, crate::Result<AnyResponse>> {
            Box::pin(async move {
                trace.lock().unwrap().push("terminal".to_owned());
                let value = *req.downcast_ref::<u32>().unwrap();
                Ok(AnyResponse::new(value + 1))
            })
        })
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn onion_order_test() {
        let trace = Trace::default();
        let mut chain = MiddlewareChain::default();
        chain.push(tracing_middleware("A", trace.clone()));
        chain.push(tracing_middleware("B", trace.clone()));
        chain.push(tracing_middleware("C", trace.clone()));

        let res = chain
            .build_pipeline(terminal(trace.clone()))
            .run(AnyRequest::new(41_u32))
            .await
            .unwrap();

        assert_eq!(res.downcast::<u32>().unwrap(), 42);
        assert_eq!(
            *trace.lock().unwrap(),
            vec![
                "before A", "before B", "before C", "terminal", "after C", "after B", "after A"
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_chain_runs_terminal_test() {
        let trace = Trace::default();
        let chain = MiddlewareChain::default();
        assert_eq!(chain.len(), 0);

        let res = chain
            .build_pipeline(terminal(trace.clone()))
            .run(AnyRequest::new(1_u32))
            .await
            .unwrap();

        assert_eq!(res.downcast::<u32>().unwrap(), 2);
        assert_eq!(*trace.lock().unwrap(), vec!["terminal"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancelled_request_skips_layers_test() {
        let trace = Trace::default();
        let mut chain = MiddlewareChain::default();
        chain.push(tracing_middleware("A", trace.clone()));

        let cancel = tokio_util::sync::CancellationToken::new();
        cancel.cancel();

        let err = chain
            .build_pipeline(terminal(trace.clone()))
            .run(AnyRequest::new(1_u32).with_cancellation(cancel))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(trace.lock().unwrap().is_empty());
    }
}
