//! # mediator-pipeline
//! An asynchronous implementation of the Mediator pattern in Rust
//! inspired in C# [MediatR](https://github.com/jbogard/MediatR/tree/master/src/MediatR).
//!
//! Requests are routed to exactly one handler through an ordered pipeline of
//! middleware. Notifications are delivered to every subscriber, in the order
//! they subscribed, and never pass through the middleware.
//!
//! ## Mediator Pattern
//! https://en.wikipedia.org/wiki/Mediator_pattern
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use mediator_pipeline::{
//!     DefaultMediator, LoggingMiddleware, Mediator, Notification, Request, RequestHandler,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug, Clone, Eq, PartialEq)]
//! struct Product(String);
//!
//! type SharedProducts = Arc<Mutex<Vec<Product>>>;
//!
//! // Notifications
//! #[derive(Clone)]
//! struct ProductAdded(Product);
//! impl Notification for ProductAdded {}
//!
//! // Requests
//! struct AddProduct(String);
//! impl Request<Product> for AddProduct {}
//!
//! struct AddProductHandler(SharedProducts);
//!
//! #[mediator_pipeline::async_trait]
//! impl RequestHandler<AddProduct, Product> for AddProductHandler {
//!     async fn handle(&self, req: AddProduct, _: CancellationToken) -> mediator_pipeline::Result<Product> {
//!         let product = Product(req.0);
//!         self.0.lock().unwrap().push(product.clone());
//!         Ok(product)
//!     }
//! }
//!
//! struct CountProducts;
//! impl Request<usize> for CountProducts {}
//!
//! # #[tokio::main]
//! # async fn main() {
//! let products = SharedProducts::default();
//! let counter = products.clone();
//!
//! let mediator = DefaultMediator::builder()
//!     .add_middleware(LoggingMiddleware::new())
//!     .add_handler(AddProductHandler(products.clone()))
//!     .add_handler_fn(move |_: CountProducts, _| {
//!         let counter = counter.clone();
//!         async move { Ok(counter.lock().unwrap().len()) }
//!     })
//!     .subscribe_fn(|event: ProductAdded, _| async move {
//!         println!("Product added: {:?}", event.0);
//!         Ok(())
//!     })
//!     .build();
//!
//! let product = mediator.send(AddProduct("Microwave".to_owned())).await.unwrap();
//! mediator.publish(ProductAdded(product.clone())).await.unwrap();
//!
//! assert_eq!(Product("Microwave".to_owned()), product);
//! assert_eq!(Ok(1), mediator.send(CountProducts).await);
//! # }
//! ```

/// A convenient result type.
pub type Result<T> = std::result::Result<T, error::Error>;

pub use async_trait::async_trait;

/// Module for the mediator request-response.
mod request;
pub use request::*;

/// Module for the mediator notifications.
mod notification;
pub use notification::*;

/// Module for the type-erased messages.
mod message;
pub use message::*;

/// Module for the middleware contract.
mod middleware;
pub use middleware::*;

mod pipeline;
mod registry;

/// Module for component discovery.
mod scan;
pub use scan::*;

/// Built-in middleware.
mod middlewares;
pub use middlewares::*;

/// Module for the errors.
mod error;
pub use error::*;

/// Module for the mediator.
mod mediator;
pub use crate::mediator::*;

/// Provides default implementations.
mod impls;
pub use impls::*;
