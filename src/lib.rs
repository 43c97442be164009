//! Evaluation Cycles - Lifecycle and phase automation for performance reviews
//!
//! This crate decides which evaluation cycle is active and which phase it is
//! in, moving cycles forward as deadlines pass and accepting manual admin
//! overrides, while keeping at most one cycle OPEN at any time.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
