use crate::Notification;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A type-erased request travelling through the middleware pipeline.
///
/// The routing key is the [`TypeId`] of the message, fixed when the envelope
/// is created. The envelope also carries the cancellation token of the
/// dispatch so every layer can observe it.
pub struct AnyRequest {
    value: Box<dyn Any + Send>,
    type_id: TypeId,
    type_name: &'static str,
    cancel: CancellationToken,
}

impl AnyRequest {
    /// Wraps a request with a fresh cancellation token.
    pub fn new<Req: Any + Send>(req: Req) -> Self {
        AnyRequest {
            value: Box::new(req),
            type_id: TypeId::of::<Req>(),
            type_name: type_name::<Req>(),
            cancel: CancellationToken::new(),
        }
    }

    /// Wraps an already boxed request, routing it by its runtime type.
    ///
    /// The static type name is not known here, so [`AnyRequest::type_name`]
    /// reports `"<erased>"`.
    pub fn from_boxed(value: Box<dyn Any + Send>) -> Self {
        let any: &dyn Any = &*value;
        let type_id = any.type_id();
        AnyRequest {
            value,
            type_id,
            type_name: "<erased>",
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token of this request.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the routing key of the request.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name of the request.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the cancellation token of the dispatch.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns `true` if the request is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Returns a reference to the request if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Unwraps the request and its cancellation token.
    pub fn downcast<T: Any>(self) -> Result<(T, CancellationToken), Self> {
        let AnyRequest {
            value,
            type_id,
            type_name,
            cancel,
        } = self;

        match value.downcast::<T>() {
            Ok(value) => Ok((*value, cancel)),
            Err(value) => Err(AnyRequest {
                value,
                type_id,
                type_name,
                cancel,
            }),
        }
    }
}

impl fmt::Debug for AnyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyRequest")
            .field("type_name", &self.type_name)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// A type-erased response flowing back out of the middleware pipeline.
pub struct AnyResponse {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl AnyResponse {
    /// Wraps a response.
    pub fn new<Res: Any + Send>(res: Res) -> Self {
        AnyResponse {
            value: Box::new(res),
            type_name: type_name::<Res>(),
        }
    }

    /// Returns the type name of the response.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the response is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Returns a reference to the response if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Unwraps the response if it is a `T`.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|value| AnyResponse { value, type_name })
    }

    /// Consumes the response, returning the boxed value.
    pub fn into_inner(self) -> Box<dyn Any + Send> {
        self.value
    }
}

impl fmt::Debug for AnyResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyResponse")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A type-erased notification. Cloning it is cheap; subscribers receive
/// their own clone of the inner value.
#[derive(Clone)]
pub struct AnyNotification {
    value: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl AnyNotification {
    /// Wraps a notification.
    pub fn new<N: Notification>(notification: N) -> Self {
        AnyNotification {
            value: Arc::new(notification),
            type_id: TypeId::of::<N>(),
            type_name: type_name::<N>(),
        }
    }

    /// Wraps a shared notification, routing it by its runtime type.
    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        let any: &dyn Any = &*value;
        let type_id = any.type_id();
        AnyNotification {
            value,
            type_id,
            type_name: "<erased>",
        }
    }

    /// Returns the routing key of the notification.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name of the notification.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns a reference to the notification if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for AnyNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyNotification")
            .field("type_name", &self.type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ping(&'static str);

    #[test]
    fn routing_key_test() {
        let typed = AnyRequest::new(Ping("hello"));
        let erased = AnyRequest::from_boxed(Box::new(Ping("hello")));

        assert_eq!(typed.type_id(), TypeId::of::<Ping>());
        assert_eq!(typed.type_id(), erased.type_id());
        assert!(typed.type_name().ends_with("Ping"));
        assert_eq!(erased.type_name(), "<erased>");
    }

    #[test]
    fn downcast_test() {
        let req = AnyRequest::new(Ping("hello"));
        assert!(req.is::<Ping>());
        assert_eq!(req.downcast_ref::<Ping>(), Some(&Ping("hello")));

        let req = req.downcast::<String>().unwrap_err();
        let (ping, cancel) = req.downcast::<Ping>().unwrap();
        assert_eq!(ping, Ping("hello"));
        assert!(!cancel.is_cancelled());

        let res = AnyResponse::new(42_u32);
        assert_eq!(res.downcast_ref::<u32>(), Some(&42));
        let res = res.downcast::<i64>().unwrap_err();
        assert_eq!(res.type_name(), "u32");
        assert_eq!(res.downcast::<u32>().unwrap(), 42);

        let inner = AnyResponse::new("done".to_owned()).into_inner();
        assert_eq!(inner.downcast_ref::<String>().map(String::as_str), Some("done"));
    }

    #[test]
    fn notification_routing_key_test() {
        #[derive(Clone)]
        struct Bye;
        impl Notification for Bye {}

        let typed = AnyNotification::new(Bye);
        let erased = AnyNotification::from_arc(Arc::new(Bye));

        assert_eq!(typed.type_id(), erased.type_id());
        assert!(erased.downcast_ref::<Bye>().is_some());
    }
}
