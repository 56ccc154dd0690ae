//! Modules layer - Infrastructure components behind the feature handlers
//!
//! Contains the persistence backends the features are wired against.

pub mod storage;
