//! Core storage primitives for OpenLearn.
//!
//! Everything that touches the document file lives here: path resolution,
//! the directory lock, the document cache, normalization, legacy migration and
//! the `Storage` engine that ties them together.

pub mod cache;
pub mod error;
pub mod lock;
pub mod migration;
pub mod normalize;
pub mod paths;
pub mod schemas;
pub mod storage;
pub mod store;
pub mod time;
pub mod validators;
