//! Shared types, errors, and configuration for Central MEI.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT token handling
//! - The payment-gateway HTTP client

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use gateway::{GatewayClient, GatewayError};
pub use jwt::{JwtConfig, JwtError, JwtService};
