//! Helpers used by the middleware layer.
//!
//! - [`request_id`] - Request identifier generation
//! - [`client_ip`] - Client address resolution behind optional proxies

pub mod client_ip;
pub mod request_id;
