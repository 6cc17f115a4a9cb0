//! Domain subsystems built on the storage engine.
//!
//! Each subsystem validates its inputs before touching storage, reads through
//! `Storage::snapshot` and mutates only through `Storage::with_write`.

pub mod gates;
pub mod learnings;
pub mod objectives;
pub mod stats;
pub mod topics;
