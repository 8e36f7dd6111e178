mod commands;
mod events;
mod models;
mod services;

use crate::commands::create_product::{CreateProductCommand, CreateProductHandler};
use crate::commands::join::{JoinCommand, JoinHandler};
use crate::commands::ping::{PingCommand, PingHandler};
use crate::events::{Broadcast, ProductCreatedEvent};
use crate::services::products_repository::{InMemoryProductsRepository, ProductsRepository};
use mediator_pipeline::{DefaultMediator, DelayMiddleware, LoggingMiddleware, Mediator};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let repository = InMemoryProductsRepository::new();
    let mediator = create_mediator(repository.clone());

    let response = mediator.send(PingCommand("Ping".to_owned())).await?;
    println!("{}", response);

    mediator
        .send(JoinCommand("WIOOAJSKDIIWJKASI2929J".to_owned()))
        .await?;

    let response = mediator
        .send(CreateProductCommand {
            name: "Product 1".to_owned(),
            description: "This is a product".to_owned(),
            price: 100.0,
        })
        .await?;

    if let (true, Some(product)) = (response.is_success, response.data) {
        println!(
            "{}: {}, {}, {}",
            response.message, product.name, product.description, product.price
        );
        log::debug!(
            "product {} available: {}, created at {}",
            product.id,
            product.is_available,
            product.created_at
        );
    }

    mediator.publish(Broadcast("Bye, World!".to_owned())).await?;

    log::info!("{} product(s) stored", repository.len());
    Ok(())
}

fn create_mediator(repository: InMemoryProductsRepository) -> DefaultMediator {
    let create_product = Arc::new(CreateProductHandler(repository));

    DefaultMediator::builder()
        .add_middleware(LoggingMiddleware::new())
        .add_middleware(DelayMiddleware::new(Duration::from_millis(500)))
        .add_handler(PingHandler)
        .add_handler(JoinHandler)
        .add_handler_fn_deferred(move |command: CreateProductCommand, mediator, cancel| {
            let handler = create_product.clone();
            async move { handler.handle(command, mediator, cancel).await }
        })
        .subscribe_fn(|event: ProductCreatedEvent, _| async move {
            log::info!("Product created: {} ({})", event.0.name, event.0.id);
            Ok(())
        })
        .subscribe_fn(|event: Broadcast, _| async move {
            println!();
            println!("{}", event.0);
            println!();
            Ok(())
        })
        .build()
}
