//! haven-core
//!
//! Pure domain types and flow-state key conventions shared by the onboarding
//! controller, the screening instruments, and the host. No I/O.

pub mod error;
pub mod flow_keys;
pub mod models;
