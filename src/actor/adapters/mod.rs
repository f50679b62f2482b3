//! Adapter implementations for actor directory ports.

pub mod memory;
pub mod postgres;
