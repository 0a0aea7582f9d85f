//! # Ports Module
//!
//! Hexagonal architecture ports. Inbound entry points are the dispatcher and
//! the request pipeline themselves; this module holds the outbound
//! dependencies they are wired with.

pub mod outbound;

pub use outbound::*;
