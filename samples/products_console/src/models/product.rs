use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: String, description: String, price: f32) -> Self {
        Product {
            id: Uuid::new_v4(),
            name,
            description,
            price,
            is_available: true,
            created_at: Utc::now(),
        }
    }
}
