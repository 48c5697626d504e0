//! serverless-swift core
//!
//! Shared types for the Swift build pipeline.
//!
//! This crate contains:
//! - Domain types: the service definition record the pipeline mutates
//! - Resolvers: container image and runtime layer coordinates
//! - Configuration errors raised before any build work starts

pub mod constants;
pub mod domain;
pub mod error;
pub mod image;
pub mod layer;

pub use error::ConfigError;
