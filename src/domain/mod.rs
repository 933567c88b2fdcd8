//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - survey input (`SampleOccurrence`)
//! - discovery curve outputs (`RarefactionCurve`, `RarefactionStats`)
//! - fit and projection outputs (`CurveFitResult`, `CurveProjection`)
//! - run configuration (`RunConfig`, `ProjectionConfig`)

pub mod types;

pub use types::*;
