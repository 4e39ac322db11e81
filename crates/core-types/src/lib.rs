//! # Staffing Audit Core Types
//!
//! Layer 0 of the workspace. Every other crate speaks in terms of the `Position`
//! records and the `Level` / `Classification` enums defined here.
//!
//! Text comparisons across pages go through [`normalize`], which folds case and
//! drops whitespace, hyphens and underscores, so "Raw Material", "RawMaterial"
//! and "raw-material" all refer to the same department.

pub mod enums;
pub mod error;
pub mod normalize;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Classification, Level};
pub use error::CoreError;
pub use normalize::{contains_normalized, normalize};
pub use structs::{PageData, Position};
