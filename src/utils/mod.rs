//! # Utilities Module
//!
//! Dice and other small helpers shared by the engine.

pub mod dice;

pub use dice::*;
