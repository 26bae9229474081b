//! Promotion Pipeline: tracks per-signature success counts and moves
//! strategies between tiers as they accumulate reliability.

mod log;
mod persistence;
mod pipeline;
mod signature;
mod state;

pub use pipeline::{PromotionEvent, PromotionPipeline, DEFAULT_S1_TO_S0_THRESHOLD, DEFAULT_S2_TO_S1_THRESHOLD};
pub use signature::sign;
pub use state::{PromotionCandidate, PromotionState, ResponseCache};
