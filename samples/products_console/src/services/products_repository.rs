use crate::models::product::Product;
use mediator_pipeline::{async_trait, Error, ErrorKind};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait ProductsRepository: Send + Sync + 'static {
    async fn insert(&self, product: Product, cancel: CancellationToken) -> mediator_pipeline::Result<()>;

    fn len(&self) -> usize;
}

/// Keeps products in memory, simulating the latency of a database write.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductsRepository {
    products: Arc<Mutex<Vec<Product>>>,
}

impl InMemoryProductsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductsRepository for InMemoryProductsRepository {
    async fn insert(&self, product: Product, cancel: CancellationToken) -> mediator_pipeline::Result<()> {
        tokio::select! {
            _ = cancel.cancelled() => return Err(ErrorKind::Cancelled.into()),
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }

        let name = product.name.clone();
        self.products
            .lock()
            .map_err(|_| Error::new(ErrorKind::Unknown, "products store is poisoned"))?
            .push(product);

        log::info!("Product '{}' inserted successfully", name);
        Ok(())
    }

    fn len(&self) -> usize {
        self.products.lock().map(|p| p.len()).unwrap_or(0)
    }
}
