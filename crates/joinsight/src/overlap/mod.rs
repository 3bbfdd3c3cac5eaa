//! Per-field and combined-mapping overlap analysis.

mod engine;
mod simulation;

pub use engine::{
    CombinedOverlap, FieldOverlap, FieldVerification, OverlapBasis, OverlapEngine,
    VerificationResult,
};
pub use simulation::{JoinSimulation, simulate_join};
