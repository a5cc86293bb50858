//! HTTP middleware for request logging and panic recovery.

pub mod recovery;
pub mod request_log;
