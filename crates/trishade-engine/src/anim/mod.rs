//! Frame-stepped animation primitives.
//!
//! Animations here advance by a fixed amount per presented frame, not per
//! unit of wall-clock time.

mod oscillator;

pub use oscillator::{AnimationConfig, Direction, Oscillator, OscillatorConfig};
