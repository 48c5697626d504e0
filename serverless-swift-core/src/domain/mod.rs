//! Domain types
//!
//! The service definition record owned by the host framework. The pipeline
//! reads provider, function and custom fields from it and rewrites the
//! handler, runtime, layer and package fields of the functions it builds.
//! Keys this crate does not model are carried through untouched.

pub mod custom;
pub mod function;
pub mod service;

pub use custom::{CustomSection, LayerSettings, SwiftSettings};
pub use function::{Function, FunctionBuildOptions, Handler, PackageSpec};
pub use service::{Provider, Service};
