//! Inbound adapters: file formats the CLI reads.

pub mod csv;
