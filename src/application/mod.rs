//! Purchase flows that orchestrate the domain ports and client guards.

pub mod bulk;
pub mod dashboard;
pub mod momo;
pub mod single;
