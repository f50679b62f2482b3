//! Actor directory for ETMS.
//!
//! Every person who interacts with the system is an actor: a single identity
//! record carrying a role-specific profile (Admin, Manager, or Staff). The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
