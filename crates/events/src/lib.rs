//! netcrm event bus and workflow notification events.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the event envelope published after a change commits.
//! - [`project`]: event names and builders for the project approval
//!   workflow, plus decoding of those events into notifications.

pub mod bus;
pub mod project;

pub use bus::{DomainEvent, EventBus};
pub use project::ProjectNotice;
