//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod forecast;
pub mod health;
pub mod stats;
pub mod transactions;

// Re-export all handlers for use in router
pub use forecast::*;
pub use health::*;
pub use stats::*;
pub use transactions::*;
