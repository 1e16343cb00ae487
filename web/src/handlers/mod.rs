//! HTTP request handlers.

pub mod catalog;
pub mod chat;
pub mod health;

// Re-export common handler utilities
pub use health::health_check;
