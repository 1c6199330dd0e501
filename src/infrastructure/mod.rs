//! Port implementations.

pub mod http_admin;
pub mod in_memory;
pub mod mock;
