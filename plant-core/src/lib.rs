//! Core procedural plant growth library.
//!
//! Main components:
//! - [`tree`]: arena-backed plant tree: creation, removal, traversal, measurement.
//! - [`growth`]: stochastic branch generation and the per-trigger growth pass.
//! - [`config`]: species parameters and species files.
//! - [`sprites`]: role to asset mapping and the renderer seam.
//! - [`scene`]: session object that turns input events into tree changes.
//! - [`error`]: error types.
//! - [`types`]: shared ids and enums.

pub mod config;
pub mod error;
pub mod growth;
pub mod scene;
pub mod sprites;
pub mod tree;
pub mod types;
