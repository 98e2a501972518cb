//! # till-core
//!
//! Core types, ID generation, and error types for Till.
//!
//! This crate provides the foundational types shared across all Till crates:
//! - Entity structs for products and stock adjustments
//! - Adjustment kinds, reason codes, and the session state machine
//! - Prefixed, time-ordered ID generation
//! - The uniform API error envelope
//! - Cross-cutting error types

pub mod entities;
pub mod envelope;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
