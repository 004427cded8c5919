//! # spex-core — Foundational Types for spex
//!
//! This crate defines the data that flows through every validation: the
//! native term representation, the runtime-type tags the value adapters
//! report, the paths that locate a node inside an input tree, and the error
//! model with its English rendering. Every other crate in the workspace
//! depends on `spex-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One canonical representation.** Both front doors (document tree and
//!    native term) produce [`Term`] values. Objects become positional
//!    tuples, sequences become lists.
//!
//! 2. **Fail-fast, single error.** A [`MatchError`] carries exactly one
//!    [`Path`] and one [`ErrorKind`]. There is no aggregation.
//!
//! 3. **Closed error taxonomy.** [`ErrorKind`] has one variant per failure
//!    kind; rendering is an exhaustive `match`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `spex-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod path;
pub mod term;

pub use error::{error_to_english, ErrorKind, MatchError, SpecError};
pub use path::{Path, PathSegment};
pub use term::{Kind, Term};
