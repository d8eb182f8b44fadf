#![forbid(unsafe_code)]
//! tasklist-core library.
//!
//! Holds the task model, the in-memory [`store::TaskStore`] that owns the
//! ordered task sequence, and the configuration loaded by the binary.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums with stable [`error::ErrorCode`]s.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod error;
pub mod model;
pub mod store;

pub use model::task::{Task, TaskId};
pub use store::{AddRejection, TaskStore};
