//! Layered (Sugiyama) layout for directed acyclic graphs.
//!
//! The pipeline assigns every node an integer layer, inserts dummy waypoints
//! so each link spans exactly one layer, reorders layers to reduce edge
//! crossings, and assigns coordinates:
//!
//! 1. layering: [`layering::LongestPath`] or the span-minimizing
//!    [`layering::Simplex`] integer program,
//! 2. decrossing: the [`decross::TwoLayer`] sweep heuristic or the exact
//!    [`decross::DecrossOpt`] integer program,
//! 3. coordinates: [`coord::CoordCenter`], [`coord::CoordGreedy`], or the
//!    quadratic-program [`coord::CoordQuad`].
//!
//! [`Sugiyama`] runs the three stages and writes the results back onto the
//! user DAG. Operators are immutable configuration values; every `with_*`
//! builder returns a new operator and never mutates the receiver.

pub use steller_dag as dag;

pub mod accessors;
pub mod coord;
pub mod decross;
mod error;
pub mod layering;
pub mod solver;
mod sugi;
mod sugiyama;
mod util;

pub use error::{Error, Result};
pub use sugi::{SizeCache, SugiGraph, SugiLink, SugiNode, SugiNodeKind};
pub use sugiyama::Sugiyama;
