//! Core domain types and logic.

pub mod bar;
pub mod indicator;
pub mod window;
pub mod risk;
pub mod order;
pub mod position;
pub mod policy;
pub mod variant;
pub mod config;
pub mod engine;
pub mod error;
