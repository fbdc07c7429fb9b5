//! Operator HTTP API for the Almanac scheduler.
//!
//! Exposes the core's [`AdminOps`](almanac_core::AdminOps) surface over
//! REST so an external command layer (a chat bot, a dashboard, `curl`)
//! can inspect and steer the seasons, weather and water cycles.
//!
//! Scheduled ticks never go through this crate. Errors from an operation
//! are returned to the caller as JSON `{ "error", "status" }` bodies.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::OperatorError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
