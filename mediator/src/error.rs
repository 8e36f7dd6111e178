use std::fmt;

/// A boxed error that can cross task boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for mediator
pub struct Error {
    repr: ErrorRepr,
}

/// Error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Handler not found.
    NotFound,
    /// A second handler was registered for a request type in strict mode.
    DuplicateHandler,
    /// The message reaching a handler is not the type it was registered for.
    InvalidRequest,
    /// The pipeline produced a response of an unexpected type.
    InvalidResponse,
    /// The dispatch was cancelled.
    Cancelled,
    /// A handler or middleware failed.
    Handler,
    /// A discovered component could not be constructed.
    Construction,
    /// Several notification handlers failed.
    Aggregate,
    /// An unknown error.
    Unknown,
}

impl ErrorKind {
    /// Returns the description of the error kind.
    pub fn as_str(&self) -> &'static str {
        match *self {
            ErrorKind::NotFound => "handler not found",
            ErrorKind::DuplicateHandler => "duplicate handler",
            ErrorKind::InvalidRequest => "invalid request type",
            ErrorKind::InvalidResponse => "invalid response type",
            ErrorKind::Cancelled => "dispatch cancelled",
            ErrorKind::Handler => "handler failed",
            ErrorKind::Construction => "component construction failed",
            ErrorKind::Aggregate => "multiple handlers failed",
            ErrorKind::Unknown => "unknown error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum ErrorRepr {
    /// An error with a kind.
    Kind(ErrorKind),
    /// An error with a description.
    WithDescription(ErrorKind, String),
    /// An error wrapping another error.
    Custom(ErrorKind, Option<String>, BoxError),
    /// Errors collected from a fan-out.
    Aggregate(Vec<Error>),
}

impl Error {
    /// Constructs an error of the given kind with a description.
    pub fn new<S: Into<String>>(kind: ErrorKind, description: S) -> Error {
        Error {
            repr: ErrorRepr::WithDescription(kind, description.into()),
        }
    }

    /// Wraps a failure raised by a handler or middleware.
    ///
    /// ```
    /// use mediator_pipeline::{Error, ErrorKind};
    ///
    /// let err = Error::handler(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
    /// assert_eq!(err.kind(), ErrorKind::Handler);
    /// assert_eq!(err.to_string(), "handler failed: disk full");
    /// ```
    pub fn handler<E: Into<BoxError>>(error: E) -> Error {
        Error {
            repr: ErrorRepr::Custom(ErrorKind::Handler, None, error.into()),
        }
    }

    /// Constructs an error of the given kind that keeps `source` as its cause.
    pub fn with_source<S, E>(kind: ErrorKind, description: S, source: E) -> Error
    where
        S: Into<String>,
        E: Into<BoxError>,
    {
        Error {
            repr: ErrorRepr::Custom(kind, Some(description.into()), source.into()),
        }
    }

    pub(crate) fn cancelled() -> Error {
        Error::from(ErrorKind::Cancelled)
    }

    pub(crate) fn aggregate(errors: Vec<Error>) -> Error {
        Error {
            repr: ErrorRepr::Aggregate(errors),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::Kind(kind) => kind,
            ErrorRepr::WithDescription(kind, _) => kind,
            ErrorRepr::Custom(kind, _, _) => kind,
            ErrorRepr::Aggregate(_) => ErrorKind::Aggregate,
        }
    }

    /// Returns `true` if the dispatch was aborted by its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// Returns `true` if no handler was registered for the request.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// The errors collected by a notification fan-out, in handler order.
    ///
    /// Empty for every other kind of error.
    pub fn errors(&self) -> &[Error] {
        match &self.repr {
            ErrorRepr::Aggregate(errors) => errors,
            _ => &[],
        }
    }

    /// Returns a reference to the wrapped error, if any.
    pub fn get_ref(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match &self.repr {
            ErrorRepr::Custom(_, _, source) => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Consumes the error, returning the wrapped error if any.
    pub fn into_inner(self) -> Option<BoxError> {
        match self.repr {
            ErrorRepr::Custom(_, _, source) => Some(source),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            repr: ErrorRepr::Kind(kind),
        }
    }
}

/// Errors are equal when their kinds are equal.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl Eq for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.repr {
            ErrorRepr::Kind(ref kind) => {
                write!(f, "{}", kind.as_str())
            }
            ErrorRepr::WithDescription(ref kind, ref description) => match *kind {
                ErrorKind::Unknown => {
                    write!(f, "{}", description)
                }
                _ => {
                    write!(f, "{}: {}", kind.as_str(), description)
                }
            },
            ErrorRepr::Custom(ref kind, ref description, ref source) => match description {
                Some(description) => write!(f, "{}: {}: {}", kind.as_str(), description, source),
                None => write!(f, "{}: {}", kind.as_str(), source),
            },
            ErrorRepr::Aggregate(ref errors) => {
                write!(f, "{} ({})", ErrorKind::Aggregate.as_str(), errors.len())?;
                for (i, error) in errors.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { "; " };
                    write!(f, "{}{}", sep, error)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.repr {
            ErrorRepr::Custom(_, _, source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_test() {
        assert_eq!(Error::from(ErrorKind::NotFound).to_string(), "handler not found");
        assert_eq!(
            Error::new(ErrorKind::NotFound, "no handler registered for `Ping`").to_string(),
            "handler not found: no handler registered for `Ping`"
        );
        assert_eq!(Error::new(ErrorKind::Unknown, "boom").to_string(), "boom");
        assert_eq!(
            Error::with_source(ErrorKind::Construction, "`Foo`", "missing config").to_string(),
            "component construction failed: `Foo`: missing config"
        );
    }

    #[test]
    fn aggregate_test() {
        let err = Error::aggregate(vec![Error::handler("first"), Error::handler("second")]);

        assert_eq!(err.kind(), ErrorKind::Aggregate);
        assert_eq!(err.errors().len(), 2);
        assert_eq!(
            err.to_string(),
            "multiple handlers failed (2): handler failed: first; handler failed: second"
        );
        assert!(Error::cancelled().errors().is_empty());
    }

    #[test]
    fn source_test() {
        #[derive(Debug)]
        struct OutOfStock;

        impl fmt::Display for OutOfStock {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("out of stock")
            }
        }

        impl std::error::Error for OutOfStock {}

        let err = Error::handler(OutOfStock);
        assert!(err.source().is_some());
        assert!(err.get_ref().unwrap().is::<OutOfStock>());
        assert!(err.into_inner().unwrap().downcast::<OutOfStock>().is_ok());

        assert!(Error::from(ErrorKind::Cancelled).source().is_none());
    }

    #[test]
    fn eq_compares_kinds_test() {
        assert_eq!(Error::new(ErrorKind::NotFound, "a"), Error::from(ErrorKind::NotFound));
        assert_ne!(Error::cancelled(), Error::from(ErrorKind::NotFound));
        assert!(Error::cancelled().is_cancelled());
        assert!(Error::new(ErrorKind::NotFound, "x").is_not_found());
    }
}
