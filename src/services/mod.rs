pub mod availability;
pub mod booking;
pub mod cart;
pub mod pricing;
pub mod repository;
