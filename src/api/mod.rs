//! HTTP layer: middleware, handlers and DTOs.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request logging and panic recovery middleware

pub mod dto;
pub mod handlers;
pub mod middleware;
