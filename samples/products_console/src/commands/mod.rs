pub mod create_product;
pub mod join;
pub mod ping;
