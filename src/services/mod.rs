pub mod api;
pub mod booking;
pub mod events;
pub mod payment;
pub mod session;
pub mod slots;
