use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Represents a request to the mediator.
///
/// `Res` is the response produced by the single handler of the request. It
/// defaults to `()`, which marks a fire-and-forget command: it still needs
/// exactly one handler, unlike a [`Notification`](crate::Notification).
pub trait Request<Res = ()>: Send + 'static {}

/// Handles a request to the mediator.
#[async_trait::async_trait]
pub trait RequestHandler<Req, Res = ()>: Send + Sync + 'static
where
    Req: Request<Res>,
    Res: Send + 'static,
{
    /// Handle a request and returns the response.
    async fn handle(&self, req: Req, cancel: CancellationToken) -> crate::Result<Res>;
}

///////////////////// Implementations /////////////////////

#[async_trait::async_trait]
impl<Req, Res, F, Fut> RequestHandler<Req, Res> for F
where
    Req: Request<Res>,
    Res: Send + 'static,
    F: Fn(Req, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::Result<Res>> + Send + 'static,
{
    async fn handle(&self, req: Req, cancel: CancellationToken) -> crate::Result<Res> {
        (self)(req, cancel).await
    }
}
