//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `cycle` - Evaluation cycle aggregate, schedule rules and validator

pub mod cycle;
pub mod foundation;
