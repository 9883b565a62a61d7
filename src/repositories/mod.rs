// Repositories module - data access layer

pub mod cafe_repository;

pub use cafe_repository::{CafeRepository, DynamoDbCafeRepository};
