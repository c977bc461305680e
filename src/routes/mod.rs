pub mod account;
pub mod admin;
pub mod availability;
pub mod cart;
pub mod health;
pub mod listing;
pub mod location;
pub mod payment;
