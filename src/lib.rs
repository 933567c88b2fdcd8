//! `rarefaction-curves` library crate.
//!
//! Builds cumulative species discovery curves from ordered survey samples,
//! fits `species(x) = a·ln(x) + b` to them and projects the fit forward.
//!
//! The binary (`rare`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - dashboards and notebooks can call the same code directly

pub mod app;
pub mod cache;
pub mod cli;
pub mod curve;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
