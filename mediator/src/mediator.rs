use crate::{AnyNotification, AnyRequest, AnyResponse, Notification, Request};
use tokio_util::sync::CancellationToken;

/// A mediator is a central hub for communication between components.
#[async_trait::async_trait]
pub trait Mediator: Send + Sync {
    /// Sends a request to its handler and returns the response.
    async fn send<Req, Res>(&self, req: Req) -> crate::Result<Res>
    where
        Res: Send + 'static,
        Req: Request<Res>,
    {
        self.send_with(req, CancellationToken::new()).await
    }

    /// Sends a request, threading `cancel` through every middleware and the handler.
    async fn send_with<Req, Res>(&self, req: Req, cancel: CancellationToken) -> crate::Result<Res>
    where
        Res: Send + 'static,
        Req: Request<Res>;

    /// Sends a type-erased request, routed by its runtime type.
    async fn send_any(&self, req: AnyRequest) -> crate::Result<AnyResponse>;

    /// Publish a notification to every subscriber.
    async fn publish<N>(&self, notification: N) -> crate::Result<()>
    where
        N: Notification,
    {
        self.publish_with(notification, CancellationToken::new()).await
    }

    /// Publish a notification, stopping early if `cancel` fires.
    async fn publish_with<N>(&self, notification: N, cancel: CancellationToken) -> crate::Result<()>
    where
        N: Notification;

    /// Publish a type-erased notification, routed by its runtime type.
    async fn publish_any(
        &self,
        notification: AnyNotification,
        cancel: CancellationToken,
    ) -> crate::Result<()>;
}
