use crate::error::{Error, ErrorKind};
use crate::pipeline::MiddlewareChain;
use crate::registry::{HandlerRegistry, NotificationHandlerWrapper, RequestHandlerWrapper};
use crate::scan::ComponentRepr;
use crate::{
    AnyNotification, AnyRequest, AnyResponse, BoxFuture, Component, Discover, Mediator, Middleware,
    Next, Notification, NotificationHandler, Request, RequestHandler,
};
use std::any::{type_name, TypeId};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct Inner {
    registry: HandlerRegistry,
    middlewares: MiddlewareChain,
}

/// A default implementation for the [Mediator] trait.
///
/// Cloning is cheap: all clones share the same frozen registry and
/// middleware chain, so a mediator can be handed to any number of tasks.
///
/// # Examples
///
/// ## Request handler
/// ```
/// use mediator_pipeline::{DefaultMediator, Mediator, Request, RequestHandler};
/// use tokio_util::sync::CancellationToken;
///
/// struct TwoTimes(i64);
/// impl Request<i64> for TwoTimes {}
///
/// struct TwoTimesHandler;
///
/// #[mediator_pipeline::async_trait]
/// impl RequestHandler<TwoTimes, i64> for TwoTimesHandler {
///     async fn handle(&self, req: TwoTimes, _: CancellationToken) -> mediator_pipeline::Result<i64> {
///         Ok(req.0 * 2)
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let mediator = DefaultMediator::builder()
///     .add_handler(TwoTimesHandler)
///     .build();
///
/// assert_eq!(Ok(4), mediator.send(TwoTimes(2)).await);
/// assert_eq!(Ok(-6), mediator.send(TwoTimes(-3)).await);
/// # }
/// ```
///
/// ## Notification handler
/// ```
/// use mediator_pipeline::{DefaultMediator, Mediator, Notification};
///
/// #[derive(Clone)]
/// struct ProductAdded(String);
/// impl Notification for ProductAdded {}
///
/// # #[tokio::main]
/// # async fn main() {
/// let mediator = DefaultMediator::builder()
///     .subscribe_fn(|event: ProductAdded, _| async move {
///         println!("Product added: {}", event.0);
///         Ok(())
///     })
///     .build();
///
/// mediator.publish(ProductAdded("Microwave".to_owned())).await.unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct DefaultMediator {
    inner: Arc<Inner>,
}

impl DefaultMediator {
    /// Gets a [DefaultMediator] builder.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Returns `true` if a handler is registered for `Req`.
    pub fn has_handler<Req: 'static>(&self) -> bool {
        self.inner.registry.contains_request(TypeId::of::<Req>())
    }

    /// Returns the number of subscribers of `N`.
    pub fn notification_handler_count<N: 'static>(&self) -> usize {
        self.inner
            .registry
            .lookup_notifications(TypeId::of::<N>())
            .len()
    }

    /// Returns the number of registered middleware.
    pub fn middleware_count(&self) -> usize {
        self.inner.middlewares.len()
    }
}

#[async_trait::async_trait]
impl Mediator for DefaultMediator {
    async fn send_with<Req, Res>(&self, req: Req, cancel: CancellationToken) -> crate::Result<Res>
    where
        Res: Send + 'static,
        Req: Request<Res>,
    {
        let req = AnyRequest::new(req).with_cancellation(cancel);
        let res = self.send_any(req).await?;

        res.downcast::<Res>().map_err(|res| {
            Error::new(
                ErrorKind::InvalidResponse,
                format!(
                    "expected `{}` but the pipeline produced `{}`",
                    type_name::<Res>(),
                    res.type_name()
                ),
            )
        })
    }

    async fn send_any(&self, req: AnyRequest) -> crate::Result<AnyResponse> {
        let handler = match self.inner.registry.lookup_request(req.type_id()) {
            Some(handler) => handler.clone(),
            None => {
                log::debug!("no handler registered for `{}`", req.type_name());
                return Err(Error::new(
                    ErrorKind::NotFound,
                    format!("no handler registered for `{}`", req.type_name()),
                ));
            }
        };

        let cancel = req.cancellation().clone();
        if cancel.is_cancelled() {
            return Err(Error::cancelled());
        }

        log::debug!(
            "dispatching `{}` through {} middleware",
            handler.request_name(),
            self.inner.middlewares.len()
        );

        let mediator = self.clone();
        let terminal = Next::new(move |req: AnyRequest| -> BoxFuture<'static, crate::Result<AnyResponse>> {
            if req.cancellation().is_cancelled() {
                return Box::pin(async { Err::<AnyResponse, _>(Error::cancelled()) });
            }

            handler.call(req, mediator)
        });

        let pipeline = self.inner.middlewares.build_pipeline(terminal);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::cancelled()),
            res = pipeline.run(req) => res,
        }
    }

    async fn publish_with<N>(&self, notification: N, cancel: CancellationToken) -> crate::Result<()>
    where
        N: Notification,
    {
        self.publish_any(AnyNotification::new(notification), cancel)
            .await
    }

    async fn publish_any(
        &self,
        notification: AnyNotification,
        cancel: CancellationToken,
    ) -> crate::Result<()> {
        let handlers = self
            .inner
            .registry
            .lookup_notifications(notification.type_id());

        if handlers.is_empty() {
            log::debug!("no subscribers for `{}`", notification.type_name());
            return Ok(());
        }

        let mut errors = Vec::new();

        for (index, handler) in handlers.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(Error::cancelled());
            }

            let fut = handler.call(notification.clone(), cancel.clone(), self.clone());
            let res = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(Error::cancelled()),
                res = fut => res,
            };

            match res {
                Ok(()) => {}
                Err(_) if cancel.is_cancelled() => {
                    if !errors.is_empty() {
                        log::debug!(
                            "publish of `{}` cancelled after {} failure(s)",
                            notification.type_name(),
                            errors.len()
                        );
                    }
                    return Err(Error::cancelled());
                }
                Err(err) => {
                    log::warn!(
                        "subscriber #{} of `{}` failed: {}",
                        index,
                        notification.type_name(),
                        err
                    );
                    errors.push(err);
                }
            }
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::aggregate(errors)),
        }
    }
}

/// A builder for the [DefaultMediator].
///
/// Registering a second handler for a request type replaces the first one.
/// In [strict](Builder::strict) mode the second registration is rejected
/// instead and reported by [`Builder::try_build`].
pub struct Builder {
    registry: HandlerRegistry,
    middlewares: MiddlewareChain,
    strict: bool,
    errors: Vec<Error>,
}

impl Builder {
    /// Constructs a new `Builder`.
    pub fn new() -> Self {
        Builder {
            registry: HandlerRegistry::default(),
            middlewares: MiddlewareChain::default(),
            strict: false,
            errors: Vec::new(),
        }
    }

    /// Rejects duplicate request handlers instead of replacing them.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    fn insert_request(mut self, handler: RequestHandlerWrapper) -> Self {
        let name = handler.request_name();

        if self.strict && self.registry.contains_request(handler.request_type()) {
            log::error!("rejected a second handler for `{}`", name);
            self.errors.push(Error::new(
                ErrorKind::DuplicateHandler,
                format!("a handler for `{}` is already registered", name),
            ));
            return self;
        }

        if self.registry.insert_request(handler).is_some() {
            log::warn!("replaced the handler registered for `{}`", name);
        }

        self
    }

    fn push_notification(mut self, handler: NotificationHandlerWrapper) -> Self {
        self.registry.push_notification(handler);
        self
    }

    /// Registers a request handler.
    pub fn add_handler<Req, Res, H>(self, handler: H) -> Self
    where
        Req: Request<Res>,
        Res: Send + 'static,
        H: RequestHandler<Req, Res>,
    {
        self.insert_request(RequestHandlerWrapper::new(handler))
    }

    /// Registers a request handler from a function.
    pub fn add_handler_fn<Req, Res, F, Fut>(self, handler: F) -> Self
    where
        Req: Request<Res>,
        Res: Send + 'static,
        F: Fn(Req, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = crate::Result<Res>> + Send + 'static,
    {
        self.add_handler::<Req, Res, F>(handler)
    }

    /// Registers a request handler from a function that receives a copy of
    /// the mediator on each call.
    pub fn add_handler_fn_deferred<Req, Res, F, Fut>(self, handler: F) -> Self
    where
        Req: Request<Res>,
        Res: Send + 'static,
        F: Fn(Req, DefaultMediator, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = crate::Result<Res>> + Send + 'static,
    {
        self.insert_request(RequestHandlerWrapper::from_deferred(handler))
    }

    /// Registers a notification handler.
    pub fn subscribe<N, H>(self, handler: H) -> Self
    where
        N: Notification,
        H: NotificationHandler<N>,
    {
        self.push_notification(NotificationHandlerWrapper::new(handler))
    }

    /// Registers a notification handler from a function.
    pub fn subscribe_fn<N, F, Fut>(self, handler: F) -> Self
    where
        N: Notification,
        F: Fn(N, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = crate::Result<()>> + Send + 'static,
    {
        self.subscribe::<N, F>(handler)
    }

    /// Registers a notification handler from a function that receives a
    /// copy of the mediator on each call.
    pub fn subscribe_fn_deferred<N, F, Fut>(self, handler: F) -> Self
    where
        N: Notification,
        F: Fn(N, DefaultMediator, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = crate::Result<()>> + Send + 'static,
    {
        self.push_notification(NotificationHandlerWrapper::from_deferred(handler))
    }

    /// Appends a middleware to the pipeline.
    ///
    /// The first middleware added is the outermost layer.
    pub fn add_middleware<M: Middleware>(self, middleware: M) -> Self {
        self.add_middleware_shared(Arc::new(middleware))
    }

    /// Appends a middleware from a function.
    pub fn add_middleware_fn<F, Fut>(self, middleware: F) -> Self
    where
        F: Fn(AnyRequest, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = crate::Result<AnyResponse>> + Send + 'static,
    {
        self.add_middleware(middleware)
    }

    /// Appends a shared middleware. Adding the same instance twice makes it
    /// run twice.
    pub fn add_middleware_shared(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Registers a constructed component.
    pub fn register(self, component: Component) -> Self {
        match component.repr {
            ComponentRepr::Request(handler) => self.insert_request(handler),
            ComponentRepr::Notification(handler) => self.push_notification(handler),
            ComponentRepr::Middleware(middleware) => self.add_middleware_shared(middleware),
        }
    }

    /// Constructs and registers every component of `source`, in discovery order.
    ///
    /// Fails on the first component that cannot be constructed.
    pub fn scan<D: Discover + ?Sized>(mut self, source: &D) -> crate::Result<Self> {
        for discovered in source.discover() {
            let component = discovered.construct().map_err(|err| {
                Error::with_source(
                    ErrorKind::Construction,
                    format!("`{}`", discovered.name()),
                    err,
                )
            })?;

            log::debug!("registering discovered component `{}`", discovered.name());
            self = self.register(component);
        }

        Ok(self)
    }

    /// Builds the `DefaultMediator`, failing if a registration was rejected.
    ///
    /// Several rejections are reported together as an
    /// [`ErrorKind::Aggregate`] error.
    pub fn try_build(mut self) -> crate::Result<DefaultMediator> {
        match self.errors.len() {
            0 => Ok(self.build()),
            1 => Err(self.errors.remove(0)),
            _ => Err(Error::aggregate(self.errors)),
        }
    }

    /// Builds the `DefaultMediator`.
    ///
    /// Rejected registrations are dropped; use [`Builder::try_build`] to
    /// observe them.
    pub fn build(self) -> DefaultMediator {
        DefaultMediator {
            inner: Arc::new(Inner {
                registry: self.registry,
                middlewares: self.middlewares,
            }),
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}
