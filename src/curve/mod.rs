//! Cumulative species discovery curves.
//!
//! The curve is built in observed sample order (no resampling): each point
//! records how many species were first seen at that sample and how many
//! distinct species have been seen so far.

pub mod discovery;

pub use discovery::*;
