//! SurrealDB repository implementations.

mod booking;
mod business;
mod notification;
mod service;

pub use booking::SurrealBookingRepository;
pub use business::SurrealBusinessRepository;
pub use notification::SurrealNotificationRepository;
pub use service::SurrealServiceRepository;
