pub mod bookings;
pub mod cart;
pub mod listing;
pub mod location;
pub mod user;
