use crate::error::{Error, ErrorKind};
use crate::{
    AnyNotification, AnyRequest, AnyResponse, BoxFuture, DefaultMediator, Notification,
    NotificationHandler, Request, RequestHandler,
};
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type RequestFn = dyn Fn(AnyRequest, DefaultMediator) -> BoxFuture<'static, crate::Result<AnyResponse>>
    + Send
    + Sync;

type NotificationFn = dyn Fn(AnyNotification, CancellationToken, DefaultMediator) -> BoxFuture<'static, crate::Result<()>>
    + Send
    + Sync;

fn invalid_request<T>(req: &AnyRequest) -> Error {
    Error::new(
        ErrorKind::InvalidRequest,
        format!("expected `{}` but received `{}`", type_name::<T>(), req.type_name()),
    )
}

// A wrapper around the request handler that erases the request and response types.
// The request is checked with a downcast, never assumed.
#[derive(Clone)]
pub(crate) struct RequestHandlerWrapper {
    handler: Arc<RequestFn>,
    request_type: TypeId,
    request_name: &'static str,
}

impl RequestHandlerWrapper {
    pub fn new<Req, Res, H>(handler: H) -> Self
    where
        Req: Request<Res>,
        Res: Send + 'static,
        H: RequestHandler<Req, Res>,
    {
        let handler = Arc::new(handler);

        let f = move |req: AnyRequest, _: DefaultMediator| -> BoxFuture<'static, crate::Result<AnyResponse>> {
            let handler = Arc::clone(&handler);

            Box::pin(async move {
                let (req, cancel) = req.downcast::<Req>().map_err(|req| invalid_request::<Req>(&req))?;
                let res = <H as RequestHandler<Req, Res>>::handle(&handler, req, cancel).await?;
                Ok(AnyResponse::new(res))
            })
        };

        RequestHandlerWrapper {
            handler: Arc::new(f),
            request_type: TypeId::of::<Req>(),
            request_name: type_name::<Req>(),
        }
    }

    pub fn from_deferred<Req, Res, H, F>(handler: H) -> Self
    where
        Req: Request<Res>,
        Res: Send + 'static,
        F: Future<Output = crate::Result<Res>> + Send + 'static,
        H: Fn(Req, DefaultMediator, CancellationToken) -> F + Send + Sync + 'static,
    {
        let f = move |req: AnyRequest, mediator: DefaultMediator| -> BoxFuture<'static, crate::Result<AnyResponse>> {
            let (req, cancel) = match req.downcast::<Req>() {
                Ok(parts) => parts,
                Err(req) => {
                    let err = invalid_request::<Req>(&req);
                    return Box::pin(async move { Err::<AnyResponse, _>(err) });
                }
            };

            let res = handler(req, mediator, cancel);
            Box::pin(async move { res.await.map(AnyResponse::new) })
        };

        RequestHandlerWrapper {
            handler: Arc::new(f),
            request_type: TypeId::of::<Req>(),
            request_name: type_name::<Req>(),
        }
    }

    pub fn request_type(&self) -> TypeId {
        self.request_type
    }

    pub fn request_name(&self) -> &'static str {
        self.request_name
    }

    pub fn call(
        &self,
        req: AnyRequest,
        mediator: DefaultMediator,
    ) -> BoxFuture<'static, crate::Result<AnyResponse>> {
        (self.handler)(req, mediator)
    }
}

// A wrapper around the notification handler that erases the notification type.
// Every call receives its own clone of the notification.
#[derive(Clone)]
pub(crate) struct NotificationHandlerWrapper {
    handler: Arc<NotificationFn>,
    notification_type: TypeId,
}

impl NotificationHandlerWrapper {
    pub fn new<N, H>(handler: H) -> Self
    where
        N: Notification,
        H: NotificationHandler<N>,
    {
        let handler = Arc::new(handler);

        let f = move |notification: AnyNotification,
                      cancel: CancellationToken,
                      _: DefaultMediator|
              -> BoxFuture<'static, crate::Result<()>> {
            let handler = Arc::clone(&handler);

            Box::pin(async move {
                let notification = downcast_notification::<N>(&notification)?;
                <H as NotificationHandler<N>>::handle(&handler, notification, cancel).await
            })
        };

        NotificationHandlerWrapper {
            handler: Arc::new(f),
            notification_type: TypeId::of::<N>(),
        }
    }

    pub fn from_deferred<N, H, F>(handler: H) -> Self
    where
        N: Notification,
        F: Future<Output = crate::Result<()>> + Send + 'static,
        H: Fn(N, DefaultMediator, CancellationToken) -> F + Send + Sync + 'static,
    {
        let f = move |notification: AnyNotification,
                      cancel: CancellationToken,
                      mediator: DefaultMediator|
              -> BoxFuture<'static, crate::Result<()>> {
            match downcast_notification::<N>(&notification) {
                Ok(notification) => Box::pin(handler(notification, mediator, cancel)),
                Err(err) => Box::pin(async move { Err::<(), _>(err) }),
            }
        };

        NotificationHandlerWrapper {
            handler: Arc::new(f),
            notification_type: TypeId::of::<N>(),
        }
    }

    pub fn notification_type(&self) -> TypeId {
        self.notification_type
    }

    pub fn call(
        &self,
        notification: AnyNotification,
        cancel: CancellationToken,
        mediator: DefaultMediator,
    ) -> BoxFuture<'static, crate::Result<()>> {
        (self.handler)(notification, cancel, mediator)
    }
}

fn downcast_notification<N: Notification>(notification: &AnyNotification) -> crate::Result<N> {
    notification.downcast_ref::<N>().cloned().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidRequest,
            format!(
                "expected `{}` but received `{}`",
                type_name::<N>(),
                notification.type_name()
            ),
        )
    })
}

/// Maps message types to their handlers.
///
/// A request type owns a single slot, a notification type owns a list that
/// only grows. The registry is populated by the builder and is read-only once
/// the mediator is built.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    requests: HashMap<TypeId, RequestHandlerWrapper>,
    notifications: HashMap<TypeId, Vec<NotificationHandlerWrapper>>,
}

impl HandlerRegistry {
    /// Stores the handler in the slot of its request type, returning the
    /// handler it replaced.
    pub fn insert_request(&mut self, handler: RequestHandlerWrapper) -> Option<RequestHandlerWrapper> {
        self.requests.insert(handler.request_type(), handler)
    }

    /// Appends the handler to the subscribers of its notification type.
    pub fn push_notification(&mut self, handler: NotificationHandlerWrapper) {
        self.notifications
            .entry(handler.notification_type())
            .or_insert_with(Vec::new)
            .push(handler);
    }

    pub fn contains_request(&self, type_id: TypeId) -> bool {
        self.requests.contains_key(&type_id)
    }

    pub fn lookup_request(&self, type_id: TypeId) -> Option<&RequestHandlerWrapper> {
        self.requests.get(&type_id)
    }

    /// Subscribers of a notification type in registration order; empty if none.
    pub fn lookup_notifications(&self, type_id: TypeId) -> &[NotificationHandlerWrapper] {
        self.notifications
            .get(&type_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;
    impl Request<&'static str> for Ping {}

    #[derive(Clone)]
    struct Bye;
    impl Notification for Bye {}

    async fn pong(_: Ping, _: CancellationToken) -> crate::Result<&'static str> {
        Ok("pong")
    }

    async fn wave(_: Bye, _: CancellationToken) -> crate::Result<()> {
        Ok(())
    }

    #[test]
    fn request_slot_is_replaced_test() {
        let mut registry = HandlerRegistry::default();
        assert!(!registry.contains_request(TypeId::of::<Ping>()));

        assert!(registry.insert_request(RequestHandlerWrapper::new::<Ping, &'static str, _>(pong)).is_none());
        let replaced = registry.insert_request(RequestHandlerWrapper::new::<Ping, &'static str, _>(pong));

        assert!(replaced.is_some());
        assert!(replaced.unwrap().request_name().ends_with("Ping"));
        assert!(registry.contains_request(TypeId::of::<Ping>()));
        assert!(registry.lookup_request(TypeId::of::<Bye>()).is_none());
    }

    #[test]
    fn notification_list_appends_test() {
        let mut registry = HandlerRegistry::default();
        assert!(registry.lookup_notifications(TypeId::of::<Bye>()).is_empty());

        registry.push_notification(NotificationHandlerWrapper::new::<Bye, _>(wave));
        registry.push_notification(NotificationHandlerWrapper::new::<Bye, _>(wave));

        assert_eq!(registry.lookup_notifications(TypeId::of::<Bye>()).len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn wrong_request_type_is_an_error_test() {
        let wrapper = RequestHandlerWrapper::new::<Ping, &'static str, _>(pong);
        let mediator = DefaultMediator::builder().build();

        let err = wrapper
            .call(AnyRequest::new(Bye), mediator.clone())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let res = wrapper.call(AnyRequest::new(Ping), mediator).await.unwrap();
        assert_eq!(res.downcast::<&'static str>().unwrap(), "pong");
    }
}
