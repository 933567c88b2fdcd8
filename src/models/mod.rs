//! Curve model implementations.
//!
//! Models are implemented as small, pure functions so that fitting and
//! projection code can stay generic over `CurveModelKind`.

pub mod model;

pub use model::*;
