//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Database initialization and shared utilities (open_db)
//! - `forecast` - Next-month expense forecast
//! - `import` - CSV import
//! - `serve` - Web server command
//! - `stats` - Monthly income/expense totals
//! - `transactions` - Transaction commands (add, list)

pub mod core;
pub mod forecast;
pub mod import;
pub mod serve;
pub mod stats;
pub mod transactions;

// Re-export command functions for main.rs
pub use core::*;
pub use forecast::*;
pub use import::*;
pub use serve::*;
pub use stats::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
