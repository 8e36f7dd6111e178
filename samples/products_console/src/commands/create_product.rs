use crate::events::ProductCreatedEvent;
use crate::models::product::Product;
use crate::models::response::Response;
use crate::services::products_repository::ProductsRepository;
use mediator_pipeline::{DefaultMediator, Mediator, Request};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct CreateProductCommand {
    pub name: String,
    pub description: String,
    pub price: f32,
}

impl Request<Response<Product>> for CreateProductCommand {}

/// Stores the product, then announces it.
///
/// Registered as a deferred handler because it publishes through the
/// mediator it is registered on.
pub struct CreateProductHandler<R>(pub R);

impl<R: ProductsRepository> CreateProductHandler<R> {
    pub async fn handle(
        &self,
        command: CreateProductCommand,
        mediator: DefaultMediator,
        cancel: CancellationToken,
    ) -> mediator_pipeline::Result<Response<Product>> {
        let product = Product::new(command.name, command.description, command.price);

        self.0.insert(product.clone(), cancel.clone()).await?;
        mediator
            .publish_with(ProductCreatedEvent(product.clone()), cancel)
            .await?;

        Ok(Response::success(product, "Product created successfully"))
    }
}
