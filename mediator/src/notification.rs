use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Represents an application notification, broadcast to every subscriber.
///
/// Each subscriber receives its own clone.
pub trait Notification: Clone + Send + Sync + 'static {}

/// A handler for notifications.
#[async_trait::async_trait]
pub trait NotificationHandler<N: Notification>: Send + Sync + 'static {
    /// Handles a notification.
    async fn handle(&self, notification: N, cancel: CancellationToken) -> crate::Result<()>;
}

///////////////////// Implementations /////////////////////

#[async_trait::async_trait]
impl<N, F, Fut> NotificationHandler<N> for F
where
    N: Notification,
    F: Fn(N, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::Result<()>> + Send + 'static,
{
    async fn handle(&self, notification: N, cancel: CancellationToken) -> crate::Result<()> {
        (self)(notification, cancel).await
    }
}
