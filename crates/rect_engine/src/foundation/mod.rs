//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Geometry primitives (points, vectors, rectangles)
//! - Time units and conversion helpers
//! - Logging utilities

pub mod logging;
pub mod math;
pub mod time;
