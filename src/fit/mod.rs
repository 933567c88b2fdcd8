//! Curve fitting and projection.
//!
//! Responsibilities:
//!
//! - fit a curve model to a discovery curve (`fitter`)
//! - turn a fit into fitted/extrapolated curves with a confidence band (`projection`)

pub mod fitter;
pub mod projection;

pub use fitter::*;
pub use projection::*;
