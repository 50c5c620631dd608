//! Port traits (hexagonal boundaries) implemented by [`crate::adapters`].

pub mod broker_port;
pub mod config_port;
