//! Delivery of workflow events to the in-app notification inbox.

pub mod router;

pub use router::NotificationRouter;
