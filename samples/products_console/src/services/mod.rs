pub mod products_repository;
