//! Core business logic layer
//!
//! This module contains the definition model, the source trait, and the
//! project/item synchronization engine.

pub mod data;
pub mod operations;
pub mod traits;
