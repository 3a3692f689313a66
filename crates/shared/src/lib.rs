//! Shared identifiers, configuration, and email transport for Leavedesk.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Layered configuration, including the leave policy thresholds
//! - SMTP email transport

pub mod config;
pub mod email;
pub mod types;


pub use config::{AppConfig, DatabaseConfig, EmailConfig, LeavePolicy};
pub use email::{EmailError, EmailService};
