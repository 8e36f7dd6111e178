use crate::error::BoxError;
use crate::registry::{NotificationHandlerWrapper, RequestHandlerWrapper};
use crate::{Middleware, Notification, NotificationHandler, Request, RequestHandler};
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

pub(crate) enum ComponentRepr {
    Request(RequestHandlerWrapper),
    Notification(NotificationHandlerWrapper),
    Middleware(Arc<dyn Middleware>),
}

/// A constructed handler or middleware, ready to be registered.
///
/// The variant decides where it lands: request handlers take the single
/// slot of their request type, notification handlers are appended to the
/// subscribers of their notification type, middleware joins the pipeline.
pub struct Component {
    pub(crate) repr: ComponentRepr,
}

impl Component {
    /// A request handler.
    pub fn handler<Req, Res, H>(handler: H) -> Self
    where
        Req: Request<Res>,
        Res: Send + 'static,
        H: RequestHandler<Req, Res>,
    {
        Component {
            repr: ComponentRepr::Request(RequestHandlerWrapper::new(handler)),
        }
    }

    /// A notification handler.
    pub fn notification_handler<N, H>(handler: H) -> Self
    where
        N: Notification,
        H: NotificationHandler<N>,
    {
        Component {
            repr: ComponentRepr::Notification(NotificationHandlerWrapper::new(handler)),
        }
    }

    /// A middleware.
    pub fn middleware<M: Middleware>(middleware: M) -> Self {
        Component {
            repr: ComponentRepr::Middleware(Arc::new(middleware)),
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.repr {
            ComponentRepr::Request(ref handler) => handler.request_name(),
            ComponentRepr::Notification(_) => "notification handler",
            ComponentRepr::Middleware(_) => "middleware",
        };
        f.debug_tuple("Component").field(&kind).finish()
    }
}

type Constructor = dyn Fn() -> Result<Component, BoxError> + Send + Sync;

/// A component found by a discovery source: its name and how to build it.
#[derive(Clone)]
pub struct Discovered {
    name: String,
    construct: Arc<Constructor>,
}

impl Discovered {
    /// A component built by a fallible constructor.
    pub fn new<S, F>(name: S, construct: F) -> Self
    where
        S: Into<String>,
        F: Fn() -> Result<Component, BoxError> + Send + Sync + 'static,
    {
        Discovered {
            name: name.into(),
            construct: Arc::new(construct),
        }
    }

    /// A request handler built with [`Default`].
    pub fn handler<Req, Res, H>() -> Self
    where
        Req: Request<Res>,
        Res: Send + 'static,
        H: RequestHandler<Req, Res> + Default,
    {
        Discovered::new(type_name::<H>(), || {
            Ok(Component::handler::<Req, Res, H>(H::default()))
        })
    }

    /// A notification handler built with [`Default`].
    pub fn notification_handler<N, H>() -> Self
    where
        N: Notification,
        H: NotificationHandler<N> + Default,
    {
        Discovered::new(type_name::<H>(), || {
            Ok(Component::notification_handler::<N, H>(H::default()))
        })
    }

    /// A middleware built with [`Default`].
    pub fn middleware<M: Middleware + Default>() -> Self {
        Discovered::new(type_name::<M>(), || Ok(Component::middleware(M::default())))
    }

    /// Returns the name of the component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the component.
    pub fn construct(&self) -> Result<Component, BoxError> {
        (self.construct)()
    }
}

impl fmt::Debug for Discovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discovered").field("name", &self.name).finish()
    }
}

/// A source of handler and middleware components, consumed by
/// [`Builder::scan`](crate::Builder::scan).
///
/// Components are registered in the order they are discovered, which is
/// also the order middleware will wrap requests in.
pub trait Discover {
    /// Returns the components known to this source.
    fn discover(&self) -> Vec<Discovered>;
}

/// An in-memory list of components.
///
/// ```
/// use mediator_pipeline::{Catalog, Discovered, LoggingMiddleware};
///
/// let catalog = Catalog::new().with(Discovered::middleware::<LoggingMiddleware>());
/// assert_eq!(catalog.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Discovered>,
}

impl Catalog {
    /// Constructs an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Adds a component to the catalog.
    pub fn with(mut self, entry: Discovered) -> Self {
        self.entries.push(entry);
        self
    }

    /// Adds a component to the catalog.
    pub fn push(&mut self, entry: Discovered) {
        self.entries.push(entry);
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Discover for Catalog {
    fn discover(&self) -> Vec<Discovered> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoggingMiddleware;

    #[test]
    fn catalog_keeps_discovery_order_test() {
        let mut catalog = Catalog::new();
        assert!(catalog.is_empty());

        catalog.push(Discovered::middleware::<LoggingMiddleware>());
        catalog.push(Discovered::new("Broken", || Err("no default".into())));

        let names = catalog
            .discover()
            .iter()
            .map(|d| d.name().to_owned())
            .collect::<Vec<_>>();

        assert_eq!(catalog.len(), 2);
        assert!(names[0].ends_with("LoggingMiddleware"));
        assert_eq!(names[1], "Broken");
        assert!(catalog.discover()[1].construct().is_err());
    }
}
