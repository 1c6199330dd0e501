//! Domain types and the capability ports the application layer talks to.

pub mod auth;
pub mod catalog;
pub mod money;
pub mod network;
pub mod ports;
pub mod sanitize;
pub mod session;
pub mod validation;
