#![deny(missing_docs)]

//! txforge - Bitcoin-family transaction building for external signers.
//!
//! Re-exports all txforge components for convenient single-crate usage.

pub use txforge_core as core;
pub use txforge_primitives as primitives;
pub use txforge_script as script;
