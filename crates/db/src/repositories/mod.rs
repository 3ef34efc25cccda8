//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod code_repo;
pub mod customer_repo;
pub mod customer_service_repo;
pub mod lead_repo;
pub mod notification_repo;
pub mod product_repo;
pub mod project_repo;
pub mod user_repo;

pub use code_repo::{CodeKind, CodeRepo};
pub use customer_repo::CustomerRepo;
pub use customer_service_repo::CustomerServiceRepo;
pub use lead_repo::LeadRepo;
pub use notification_repo::NotificationRepo;
pub use product_repo::ProductRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
