//! Data models for the mapping engine.

pub mod catalog;
pub mod config;
pub mod policy;
pub mod record;
pub mod result;
