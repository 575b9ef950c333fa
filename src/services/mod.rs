//! Service layer for patent review.
//!
//! This module contains domain logic separated from UI concerns.
//! Services can be used by the CLI or embedded in other front ends.

pub mod mock;
pub mod review;

pub use mock::{default_hedge_table, HedgeKeyword, MockReviewer};
pub use review::{
    BackendOutput, LlmReviewer, ReviewBackend, ReviewError, ReviewReport, ReviewService,
    EMPTY_RESULT,
};
