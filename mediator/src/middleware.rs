use crate::{AnyRequest, AnyResponse};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// A boxed future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type NextFn = Box<dyn FnOnce(AnyRequest) -> BoxFuture<'static, crate::Result<AnyResponse>> + Send>;

/// The rest of the pipeline, as seen from a middleware.
///
/// `Next` is consumed by [`Next::run`], so a layer can continue at most once.
pub struct Next {
    inner: NextFn,
}

impl Next {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: FnOnce(AnyRequest) -> BoxFuture<'static, crate::Result<AnyResponse>> + Send + 'static,
    {
        Next { inner: Box::new(f) }
    }

    /// Continues the pipeline with the given request.
    pub async fn run(self, req: AnyRequest) -> crate::Result<AnyResponse> {
        (self.inner)(req).await
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Next")
    }
}

/// Intercepts every request sent through the mediator.
///
/// A middleware may run logic before and after calling `next`, or return
/// its own response without calling `next` at all. Errors returned by `next`
/// should be passed on unless the middleware means to recover from them.
///
/// ```
/// use mediator_pipeline::{AnyRequest, AnyResponse, Middleware, Next};
///
/// struct Audit;
///
/// #[mediator_pipeline::async_trait]
/// impl Middleware for Audit {
///     async fn invoke(&self, req: AnyRequest, next: Next) -> mediator_pipeline::Result<AnyResponse> {
///         println!("sending {}", req.type_name());
///         next.run(req).await
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// Handles the request, optionally delegating to `next`.
    async fn invoke(&self, req: AnyRequest, next: Next) -> crate::Result<AnyResponse>;
}

///////////////////// Implementations /////////////////////

#[async_trait::async_trait]
impl<F, Fut> Middleware for F
where
    F: Fn(AnyRequest, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::Result<AnyResponse>> + Send + 'static,
{
    async fn invoke(&self, req: AnyRequest, next: Next) -> crate::Result<AnyResponse> {
        (self)(req, next).await
    }
}
