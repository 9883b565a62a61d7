// Services module - business logic layer

pub mod cafe_service;

pub use cafe_service::CafeService;
